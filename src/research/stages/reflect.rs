use async_trait::async_trait;

use crate::error::ServiceError;
use crate::research::context::ResearchContext;
use crate::research::extractor::field_text;
use crate::research::prompts::{reflection_instructions, reflection_request};
use crate::research::stage::{ResearchStage, fallback_update};
use crate::types::{ReflectionUpdate, ResearchState, Stage, StateUpdate};

const KNOWLEDGE_GAP: &str = "knowledge_gap";
const FOLLOW_UP_QUERY: &str = "follow_up_query";

/// 提取失败时的后续查询
pub fn fallback_follow_up(topic: &str) -> String {
    format!("Tell me more about {}", topic)
}

/// 反思当前摘要，找出知识缺口并产出下一轮搜索语句
#[derive(Default)]
pub struct SummaryReflector;

#[async_trait]
impl ResearchStage for SummaryReflector {
    fn stage(&self) -> Stage {
        Stage::Reflect
    }

    async fn execute(
        &self,
        context: &ResearchContext,
        state: &ResearchState,
    ) -> Result<StateUpdate, ServiceError> {
        debug_assert!(
            state.running_summary().is_some(),
            "reflect runs only after a summary exists"
        );
        let summary = state.running_summary().unwrap_or_default();

        let output = context
            .generator
            .generate(
                &reflection_instructions(state.topic()),
                &reflection_request(summary),
            )
            .await?;

        let extracted = context
            .extractor
            .extract(&output, &[KNOWLEDGE_GAP, FOLLOW_UP_QUERY]);
        let update = match extracted {
            Ok(object) => {
                let knowledge_gap = field_text(&object, KNOWLEDGE_GAP).unwrap_or_default();
                let follow_up_query = field_text(&object, FOLLOW_UP_QUERY).unwrap_or_default();
                tracing::debug!(%knowledge_gap, %follow_up_query, "🧭 识别到知识缺口");

                StateUpdate {
                    search_query: Some(follow_up_query.clone()),
                    reflection: Some(ReflectionUpdate::Found {
                        knowledge_gap,
                        follow_up_query,
                    }),
                    ..Default::default()
                }
            }
            Err(error) => StateUpdate {
                reflection: Some(ReflectionUpdate::Missing),
                ..fallback_update(self.stage(), error, fallback_follow_up(state.topic()))
            },
        };
        Ok(update)
    }
}
