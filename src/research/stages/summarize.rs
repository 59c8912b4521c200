use async_trait::async_trait;

use crate::error::ServiceError;
use crate::research::context::ResearchContext;
use crate::research::prompts::{SUMMARIZER_INSTRUCTIONS, summarize_request};
use crate::research::stage::ResearchStage;
use crate::types::{ResearchState, Stage, StateUpdate};
use crate::utils::sources::format_results_for_prompt;

/// 基于最新一轮搜索结果生成全新的摘要
///
/// 之前的摘要不会回灌到提示词中，输出原样替换 `running_summary`，
/// 其中的 `<think>` 推理片段留到展示层再剥离。
#[derive(Default)]
pub struct SourceSummarizer;

#[async_trait]
impl ResearchStage for SourceSummarizer {
    fn stage(&self) -> Stage {
        Stage::Summarize
    }

    async fn execute(
        &self,
        context: &ResearchContext,
        state: &ResearchState,
    ) -> Result<StateUpdate, ServiceError> {
        let latest = state.latest_results().unwrap_or_default();
        let formatted = format_results_for_prompt(
            latest,
            context.config.max_tokens_per_source,
            context.config.include_raw_content,
        );

        let summary = context
            .generator
            .generate(
                SUMMARIZER_INSTRUCTIONS,
                &summarize_request(&formatted, state.topic()),
            )
            .await?;

        Ok(StateUpdate {
            running_summary: Some(summary),
            ..Default::default()
        })
    }
}
