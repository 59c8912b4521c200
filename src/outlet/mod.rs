use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::types::{ResearchOutcome, Stage};

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>(.*?)</think>").expect("think pattern is valid"));

/// 提取第一段 `<think>` 推理内容
pub fn extract_thought_process(text: &str) -> Option<String> {
    THINK_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 移除所有 `<think>` 推理片段
pub fn strip_thought_process(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").trim().to_string()
}

/// 面向展示的研究报告
#[derive(Debug, Clone)]
pub struct ReportView {
    pub topic: String,
    pub summary: String,
    pub thought_process: Option<String>,
    pub knowledge_gap: Option<String>,
    pub follow_up_query: Option<String>,
    pub degraded_stages: Vec<Stage>,
    pub generated_at: DateTime<Utc>,
}

impl ReportView {
    pub fn from_outcome(outcome: &ResearchOutcome) -> Self {
        let mut degraded_stages: Vec<Stage> = Vec::new();
        for fallback in &outcome.fallbacks {
            if !degraded_stages.contains(&fallback.stage) {
                degraded_stages.push(fallback.stage);
            }
        }

        Self {
            topic: outcome.topic.clone(),
            summary: strip_thought_process(&outcome.summary),
            thought_process: extract_thought_process(&outcome.summary),
            knowledge_gap: outcome.final_knowledge_gap.clone(),
            follow_up_query: outcome.final_follow_up_query.clone(),
            degraded_stages,
            generated_at: Utc::now(),
        }
    }

    /// 渲染为markdown
    pub fn to_markdown(&self) -> String {
        let mut content = format!("# 🔍 Research: {}\n\n", self.topic);
        content.push_str(&format!(
            "_Generated at {}_\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        content.push_str(&self.summary);
        content.push_str("\n\n");

        if let (Some(gap), Some(query)) = (&self.knowledge_gap, &self.follow_up_query) {
            content.push_str("## 🔄 Research Refinements\n\n");
            content.push_str(&format!("**Identified Knowledge Gap:** {}\n\n", gap));
            content.push_str(&format!("**Next Research Query:** {}\n\n", query));
        }

        if !self.degraded_stages.is_empty() {
            let stages = self
                .degraded_stages
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            content.push_str(&format!(
                "> ⚠️ The model returned malformed structured output during: {}. Generic fallback queries were used.\n\n",
                stages
            ));
        }

        if let Some(thoughts) = &self.thought_process {
            content.push_str("<details>\n<summary>🤖 Model thought process</summary>\n\n");
            content.push_str(thoughts);
            content.push_str("\n\n</details>\n");
        }

        content.trim_end().to_string() + "\n"
    }
}

#[allow(async_fn_in_trait)]
pub trait Outlet {
    async fn save(&self, report: &ReportView) -> Result<()>;
}

/// 输出到终端
pub struct StdoutOutlet;

impl Outlet for StdoutOutlet {
    async fn save(&self, report: &ReportView) -> Result<()> {
        println!("\n{}", report.to_markdown());
        Ok(())
    }
}

/// 写入markdown文件
pub struct DiskOutlet {
    output_path: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, report: &ReportView) -> Result<()> {
        if let Some(parent_dir) = self.output_path.parent()
            && !parent_dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent_dir)
                .await
                .context(format!("Failed to create output directory: {:?}", parent_dir))?;
        }

        tokio::fs::write(&self.output_path, report.to_markdown())
            .await
            .context(format!("Failed to write report: {:?}", self.output_path))?;

        println!("💾 已保存报告: {}", self.output_path.display());
        Ok(())
    }
}
