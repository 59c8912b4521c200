use async_trait::async_trait;

use crate::error::ServiceError;
use crate::research::context::ResearchContext;
use crate::research::extractor::field_text;
use crate::research::prompts::{QUERY_WRITER_REQUEST, query_writer_instructions};
use crate::research::stage::{ResearchStage, fallback_update};
use crate::types::{ResearchState, Stage, StateUpdate};

/// 提取失败时使用的查询语句
pub const DEFAULT_SEARCH_QUERY: &str = "default search query";

/// 根据研究主题生成第一条搜索语句
#[derive(Default)]
pub struct QueryWriter;

#[async_trait]
impl ResearchStage for QueryWriter {
    fn stage(&self) -> Stage {
        Stage::GenerateQuery
    }

    async fn execute(
        &self,
        context: &ResearchContext,
        state: &ResearchState,
    ) -> Result<StateUpdate, ServiceError> {
        let system_prompt = query_writer_instructions(state.topic());
        let output = context
            .generator
            .generate(&system_prompt, QUERY_WRITER_REQUEST)
            .await?;

        let update = match context.extractor.extract(&output, &["query"]) {
            Ok(object) => StateUpdate {
                search_query: field_text(&object, "query"),
                ..Default::default()
            },
            Err(error) => fallback_update(self.stage(), error, DEFAULT_SEARCH_QUERY.to_string()),
        };
        Ok(update)
    }
}
