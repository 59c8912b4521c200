use async_trait::async_trait;

use crate::error::ServiceError;
use crate::research::context::ResearchContext;
use crate::research::stage::ResearchStage;
use crate::types::{ResearchRound, ResearchState, Stage, StateUpdate};
use crate::utils::sources::format_sources;

/// 执行网页搜索，并记录本轮引用
#[derive(Default)]
pub struct WebResearcher;

#[async_trait]
impl ResearchStage for WebResearcher {
    fn stage(&self) -> Stage {
        Stage::WebResearch
    }

    async fn execute(
        &self,
        context: &ResearchContext,
        state: &ResearchState,
    ) -> Result<StateUpdate, ServiceError> {
        let config = &context.config;
        let results = context
            .searcher
            .search(
                state.search_query(),
                config.max_results,
                config.include_raw_content,
            )
            .await?;

        tracing::debug!(
            query = state.search_query(),
            results = results.len(),
            "🔎 搜索结果已返回"
        );

        let citations = format_sources(&results);
        Ok(StateUpdate {
            research_round: Some(ResearchRound { results, citations }),
            ..Default::default()
        })
    }
}
