//! 各阶段使用的提示词

pub const QUERY_WRITER_REQUEST: &str = "Generate a query for web search:";

pub const SUMMARIZER_INSTRUCTIONS: &str = r#"Your goal is to generate a high-quality summary of the web search results.

When writing the summary:
1. Highlight the most relevant information from each source
2. Provide a concise overview of the key points related to the research topic
3. Keep the language objective and factual
4. Do not invent facts that are not supported by the sources

Return the summary as plain markdown without a preamble or a title."#;

/// 生成搜索语句的系统指令
pub fn query_writer_instructions(research_topic: &str) -> String {
    format!(
        r#"Your goal is to generate a targeted web search query.
The query will gather information related to a specific topic.

Topic:
{research_topic}

Return your query as a JSON object with the following keys:
   - "query": The actual search query string
   - "aspect": The specific aspect of the topic being researched
   - "rationale": Brief explanation of why this query is relevant

Example output:
{{
    "query": "machine learning transformer architecture explained",
    "aspect": "technical architecture",
    "rationale": "Understanding the fundamental structure of transformer models"
}}

Respond with the JSON object only."#
    )
}

/// 总结阶段的用户消息，只携带最新一轮的搜索结果
pub fn summarize_request(formatted_results: &str, research_topic: &str) -> String {
    format!(
        "Generate a summary of these search results: {} That addresses the following topic: {}",
        formatted_results, research_topic
    )
}

/// 反思阶段的系统指令
pub fn reflection_instructions(research_topic: &str) -> String {
    format!(
        r#"You are an expert research assistant analyzing a summary about {research_topic}.

Your tasks:
1. Identify knowledge gaps or areas that need deeper exploration
2. Generate a follow-up question that would help expand your understanding
3. Focus on technical details, implementation specifics, or emerging trends that weren't fully covered

Ensure the follow-up question is self-contained and includes necessary context for web search.

Return your analysis as a JSON object with the following keys:
   - "knowledge_gap": Describe what information is missing or needs clarification
   - "follow_up_query": Write a specific question to address this gap

Example output:
{{
    "knowledge_gap": "The summary lacks information about performance metrics and benchmarks",
    "follow_up_query": "What are typical performance benchmarks and metrics used to evaluate [specific technology]?"
}}

Respond with the JSON object only."#
    )
}

pub fn reflection_request(running_summary: &str) -> String {
    format!(
        "Identify a knowledge gap and generate a follow-up web search query: {}",
        running_summary
    )
}
