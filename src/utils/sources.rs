use std::collections::HashSet;

use crate::types::SearchResult;

/// 粗略估算：1个token约等于4个字符（英文）
const CHARS_PER_TOKEN: usize = 4;

/// 将一轮搜索结果格式化为引用列表，每行 `* <title> : <url>`
pub fn format_sources(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|source| format!("* {} : {}", source.title, source.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 展开所有轮次的引用，按首次出现的顺序去重
pub fn unique_citation_lines(sources: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .flat_map(|entry| entry.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .collect()
}

/// 将搜索结果整理为提供给模型的上下文，按URL去重并截断全文
pub fn format_results_for_prompt(
    results: &[SearchResult],
    max_tokens_per_source: usize,
    include_raw_content: bool,
) -> String {
    let max_chars = max_tokens_per_source * CHARS_PER_TOKEN;
    let mut seen_urls = HashSet::new();
    let mut content = String::from("Sources:\n\n");

    for source in results
        .iter()
        .filter(|source| seen_urls.insert(source.url.as_str()))
    {
        content.push_str(&format!("Source {}:\n===\n", source.title));
        content.push_str(&format!("URL: {}\n===\n", source.url));
        content.push_str(&format!(
            "Most relevant content from source: {}\n===\n",
            source.content
        ));

        if include_raw_content && let Some(raw) = &source.raw_content {
            content.push_str(&format!(
                "Full source content limited to {} tokens: {}\n\n",
                max_tokens_per_source,
                truncate_chars(raw, max_chars)
            ));
        }
    }

    content.trim_end().to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}... [truncated]", &text[..byte_index]),
        None => text.to_string(),
    }
}
