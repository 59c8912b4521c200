use async_trait::async_trait;

use crate::error::ServiceError;
use crate::research::context::ResearchContext;
use crate::research::stage::ResearchStage;
use crate::types::{ResearchState, Stage, StateUpdate};
use crate::utils::sources::unique_citation_lines;

pub const SOURCES_HEADING: &str = "### Sources:";

/// 拼接最终报告：摘要 + 去重后的引用列表
///
/// 每轮搜索各自记录一份引用；多轮命中同一页面时只保留首次出现的那一行，
/// 顺序与搜索顺序一致。
pub fn compose_report(running_summary: &str, sources_gathered: &[String]) -> String {
    let citations = unique_citation_lines(sources_gathered).join("\n");
    format!(
        "## Summary\n\n{}\n\n{}\n{}",
        running_summary, SOURCES_HEADING, citations
    )
}

/// 生成最终报告，重复调用不会再次追加来源段落
#[derive(Default)]
pub struct SummaryFinalizer;

#[async_trait]
impl ResearchStage for SummaryFinalizer {
    fn stage(&self) -> Stage {
        Stage::Finalize
    }

    async fn execute(
        &self,
        _context: &ResearchContext,
        state: &ResearchState,
    ) -> Result<StateUpdate, ServiceError> {
        if state.is_finalized() {
            tracing::debug!("报告已生成，跳过重复的 finalize");
            return Ok(StateUpdate::default());
        }

        let report = compose_report(
            state.running_summary().unwrap_or_default(),
            state.sources_gathered(),
        );
        Ok(StateUpdate {
            final_report: Some(report),
            ..Default::default()
        })
    }
}
