use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use crate::error::ResearchError;
use crate::research::context::ResearchContext;
use crate::research::stage::ResearchStage;
use crate::research::stages::{
    QueryWriter, SourceSummarizer, SummaryFinalizer, SummaryReflector, WebResearcher,
};
use crate::research::timing::TimingScope;
use crate::types::{ResearchOutcome, ResearchState, Stage};

/// 状态机的转移函数，`None` 表示运行结束
///
/// reflect 之后是唯一的分支：`loop_count <= max_loops` 时回到 web_research，
/// 由于比较的是已完成的搜索次数，一次运行共执行 `max_loops + 1` 次搜索。
pub fn next_stage(current: Stage, state: &ResearchState, max_loops: u32) -> Option<Stage> {
    match current {
        Stage::GenerateQuery => Some(Stage::WebResearch),
        Stage::WebResearch => Some(Stage::Summarize),
        Stage::Summarize => Some(Stage::Reflect),
        Stage::Reflect if state.loop_count() <= max_loops => Some(Stage::WebResearch),
        Stage::Reflect => Some(Stage::Finalize),
        Stage::Finalize => None,
    }
}

fn stage_handler(stage: Stage) -> &'static dyn ResearchStage {
    match stage {
        Stage::GenerateQuery => &QueryWriter,
        Stage::WebResearch => &WebResearcher,
        Stage::Summarize => &SourceSummarizer,
        Stage::Reflect => &SummaryReflector,
        Stage::Finalize => &SummaryFinalizer,
    }
}

/// 研究循环控制器
pub struct ResearchOrchestrator {
    context: ResearchContext,
}

impl ResearchOrchestrator {
    pub fn new(context: ResearchContext) -> Self {
        Self { context }
    }

    /// 对一个主题执行完整的研究运行
    pub async fn run_research(&self, topic: &str) -> Result<ResearchOutcome, ResearchError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::EmptyTopic);
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research_run", %run_id, topic);

        async {
            let mut state = ResearchState::new(topic);
            tracing::info!(max_loops = self.context.config.max_loops, "🚀 开始研究");

            match self.context.config.timeout_secs {
                Some(secs) => {
                    let deadline = Duration::from_secs(secs);
                    tokio::time::timeout(deadline, self.drive(&mut state))
                        .await
                        .map_err(|_| ResearchError::DeadlineExceeded(deadline))??;
                }
                None => self.drive(&mut state).await?,
            }

            tracing::info!(
                searches = state.loop_count(),
                fallbacks = state.fallbacks().len(),
                "✓ 研究完成"
            );
            Ok::<_, ResearchError>(ResearchOutcome::from(state))
        }
        .instrument(span)
        .await
    }

    /// 从 generate_query 开始驱动状态机直到结束
    ///
    /// 任一阶段的外部服务错误会立即中止运行，已合并的状态保持原样。
    pub async fn drive(&self, state: &mut ResearchState) -> Result<(), ResearchError> {
        let max_loops = self.context.config.max_loops;
        let mut timing = TimingScope::new();
        let mut current = Some(Stage::GenerateQuery);

        while let Some(stage) = current {
            timing.start_phase(stage);
            self.execute_stage(stage_handler(stage), state).await?;
            timing.end_phase(stage);

            current = next_stage(stage, state, max_loops);
        }

        tracing::debug!("⏱️ 阶段耗时\n{}", timing.generate_timing_report());
        Ok(())
    }

    /// 执行单个阶段并合并其输出
    async fn execute_stage(
        &self,
        handler: &dyn ResearchStage,
        state: &mut ResearchState,
    ) -> Result<(), ResearchError> {
        let stage = handler.stage();
        tracing::debug!(%stage, loop_count = state.loop_count(), "执行阶段");

        let update = handler.execute(&self.context, state).await.map_err(|e| {
            tracing::error!(%stage, service = %e.service(), error = %e, "❌ 外部服务调用失败，终止研究");
            e
        })?;
        state.apply(update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchConfig;
    use crate::error::{ExtractionError, ServiceError};
    use crate::research::extractor::{JsonObject, StructuredOutputExtractor};
    use crate::research::test_support::{StubGenerator, StubSearcher, two_results};
    use crate::types::{ResearchRound, StateUpdate};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    const QUERY: &str = r#"{"query": "solar flare basics"}"#;
    const REFLECTION: &str =
        r#"{"knowledge_gap": "forecasting", "follow_up_query": "how are solar flares forecast"}"#;

    fn orchestrator(
        generator: Arc<StubGenerator>,
        searcher: Arc<StubSearcher>,
        max_loops: u32,
    ) -> ResearchOrchestrator {
        ResearchOrchestrator::new(ResearchContext::new(
            generator,
            searcher,
            ResearchConfig {
                max_loops,
                max_results: 2,
                ..Default::default()
            },
        ))
    }

    fn state_with_rounds(rounds: u32) -> ResearchState {
        let mut state = ResearchState::new("t");
        for _ in 0..rounds {
            state.apply(StateUpdate {
                research_round: Some(ResearchRound {
                    results: vec![],
                    citations: String::new(),
                }),
                ..Default::default()
            });
        }
        state
    }

    #[test]
    fn test_linear_transitions() {
        let state = ResearchState::new("t");
        assert_eq!(
            next_stage(Stage::GenerateQuery, &state, 3),
            Some(Stage::WebResearch)
        );
        assert_eq!(next_stage(Stage::WebResearch, &state, 3), Some(Stage::Summarize));
        assert_eq!(next_stage(Stage::Summarize, &state, 3), Some(Stage::Reflect));
        assert_eq!(next_stage(Stage::Finalize, &state, 3), None);
    }

    #[test]
    fn test_reflect_branch_is_inclusive_of_bound() {
        assert_eq!(
            next_stage(Stage::Reflect, &state_with_rounds(3), 3),
            Some(Stage::WebResearch)
        );
        assert_eq!(
            next_stage(Stage::Reflect, &state_with_rounds(4), 3),
            Some(Stage::Finalize)
        );
        assert_eq!(
            next_stage(Stage::Reflect, &state_with_rounds(1), 0),
            Some(Stage::Finalize)
        );
    }

    #[tokio::test]
    async fn test_default_bound_runs_four_searches() {
        let generator = Arc::new(StubGenerator::routed(QUERY, "summary", REFLECTION));
        let searcher = Arc::new(StubSearcher::new(two_results()));
        let orchestrator = orchestrator(generator.clone(), searcher.clone(), 3);

        let outcome = orchestrator.run_research("solar flares").await.unwrap();

        assert_eq!(searcher.call_count(), 4);
        assert_eq!(outcome.loop_count, 4);
        assert_eq!(outcome.sources.len(), 4);
        // 1 次生成查询 + 4 组 summarize/reflect
        assert_eq!(generator.call_count(), 1 + 4 * 2);
        assert_eq!(
            outcome.final_follow_up_query.as_deref(),
            Some("how are solar flares forecast")
        );
        assert_eq!(outcome.final_knowledge_gap.as_deref(), Some("forecasting"));
        assert!(!outcome.used_fallback());
    }

    #[tokio::test]
    async fn test_queries_flow_from_generation_then_reflection() {
        let generator = Arc::new(StubGenerator::routed(QUERY, "summary", REFLECTION));
        let searcher = Arc::new(StubSearcher::new(two_results()));
        let orchestrator = orchestrator(generator, searcher.clone(), 1);

        orchestrator.run_research("solar flares").await.unwrap();

        assert_eq!(
            searcher.queries.lock().unwrap().as_slice(),
            [
                "solar flare basics".to_string(),
                "how are solar flares forecast".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_invariants_hold_after_every_stage() {
        let generator = Arc::new(StubGenerator::routed(QUERY, "summary", REFLECTION));
        let searcher = Arc::new(StubSearcher::new(two_results()));
        let orchestrator = orchestrator(generator, searcher.clone(), 2);

        let mut state = ResearchState::new("solar flares");
        let mut current = Some(Stage::GenerateQuery);
        let mut reflected = false;
        while let Some(stage) = current {
            if stage == Stage::Reflect {
                assert!(state.running_summary().is_some());
                reflected = true;
            }
            orchestrator
                .execute_stage(stage_handler(stage), &mut state)
                .await
                .unwrap();

            assert_eq!(state.loop_count() as usize, searcher.call_count());
            assert_eq!(state.sources_gathered().len(), state.loop_count() as usize);
            assert_eq!(
                state.web_research_results().len(),
                state.loop_count() as usize
            );
            current = next_stage(stage, &state, 2);
        }

        assert!(reflected);
        assert!(state.is_finalized());
        assert_eq!(state.loop_count(), 3);
    }

    #[tokio::test]
    async fn test_fallbacks_are_recorded_but_run_completes() {
        let generator = Arc::new(StubGenerator::fixed("the model ignored the format"));
        let searcher = Arc::new(StubSearcher::new(two_results()));
        let orchestrator = orchestrator(generator, searcher.clone(), 1);

        let outcome = orchestrator.run_research("solar flares").await.unwrap();

        assert_eq!(searcher.call_count(), 2);
        assert_eq!(
            searcher.queries.lock().unwrap().as_slice(),
            [
                "default search query".to_string(),
                "Tell me more about solar flares".to_string()
            ]
        );
        // generate_query 一次 + reflect 两次
        assert_eq!(outcome.fallbacks.len(), 3);
        assert!(outcome.final_knowledge_gap.is_none());
        assert!(outcome.summary.contains("### Sources:"));
    }

    #[tokio::test]
    async fn test_null_reflection_uses_fallback_query() {
        let generator = Arc::new(StubGenerator::routed(
            QUERY,
            "summary",
            r#"{"knowledge_gap": null, "follow_up_query": null}"#,
        ));
        let searcher = Arc::new(StubSearcher::new(two_results()));
        let orchestrator = orchestrator(generator, searcher.clone(), 1);

        let outcome = orchestrator.run_research("solar flares").await.unwrap();

        assert_eq!(
            searcher.queries.lock().unwrap().as_slice(),
            [
                "solar flare basics".to_string(),
                "Tell me more about solar flares".to_string()
            ]
        );
        assert!(outcome.final_knowledge_gap.is_none());
        assert!(outcome.final_follow_up_query.is_none());
        assert_eq!(outcome.fallbacks.len(), 2);
        assert!(outcome.fallbacks.iter().all(|f| f.stage == Stage::Reflect));
    }

    /// 忽略模型输出，按请求的字段名生成固定值
    #[derive(Default)]
    struct KeyEchoExtractor {
        requests: Mutex<Vec<Vec<String>>>,
    }

    impl StructuredOutputExtractor for KeyEchoExtractor {
        fn extract(
            &self,
            _text: &str,
            required_keys: &[&str],
        ) -> Result<JsonObject, ExtractionError> {
            self.requests
                .lock()
                .unwrap()
                .push(required_keys.iter().map(|key| key.to_string()).collect());
            Ok(required_keys
                .iter()
                .map(|key| (key.to_string(), Value::String(format!("custom {key}"))))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_stages_use_injected_extractor() {
        let extractor = Arc::new(KeyEchoExtractor::default());
        let searcher = Arc::new(StubSearcher::new(two_results()));
        let context = ResearchContext::new(
            Arc::new(StubGenerator::fixed("prose the default extractor would reject")),
            searcher.clone(),
            ResearchConfig {
                max_loops: 1,
                ..Default::default()
            },
        )
        .with_extractor(extractor.clone());

        let outcome = ResearchOrchestrator::new(context)
            .run_research("solar flares")
            .await
            .unwrap();

        assert_eq!(
            searcher.queries.lock().unwrap().as_slice(),
            [
                "custom query".to_string(),
                "custom follow_up_query".to_string()
            ]
        );
        assert_eq!(
            extractor.requests.lock().unwrap().as_slice(),
            [
                vec!["query".to_string()],
                vec!["knowledge_gap".to_string(), "follow_up_query".to_string()],
                vec!["knowledge_gap".to_string(), "follow_up_query".to_string()],
            ]
        );
        assert!(!outcome.used_fallback());
        assert_eq!(outcome.final_knowledge_gap.as_deref(), Some("custom knowledge_gap"));
    }

    #[tokio::test]
    async fn test_search_failure_aborts_without_counting() {
        let generator = Arc::new(StubGenerator::routed(QUERY, "summary", REFLECTION));
        let searcher = Arc::new(StubSearcher::new(two_results()).failing_on(1));
        let orchestrator = orchestrator(generator, searcher, 3);

        let mut state = ResearchState::new("solar flares");
        let result = orchestrator.drive(&mut state).await;

        assert!(matches!(
            result,
            Err(ResearchError::Service(ServiceError::Unavailable { .. }))
        ));
        assert_eq!(state.loop_count(), 0);
        assert!(state.sources_gathered().is_empty());
        assert!(!state.is_finalized());
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces() {
        let orchestrator = orchestrator(
            Arc::new(StubGenerator::failing()),
            Arc::new(StubSearcher::new(two_results())),
            3,
        );

        let result = orchestrator.run_research("solar flares").await;
        assert!(matches!(result, Err(ResearchError::Service(_))));
    }

    struct StalledGenerator;

    #[async_trait::async_trait]
    impl crate::llm::GenerationService for StalledGenerator {
        async fn generate(&self, _: &str, _: &str) -> Result<String, ServiceError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_deadline_aborts_run() {
        let orchestrator = ResearchOrchestrator::new(ResearchContext::new(
            Arc::new(StalledGenerator),
            Arc::new(StubSearcher::new(two_results())),
            ResearchConfig {
                timeout_secs: Some(1),
                ..Default::default()
            },
        ));

        let result = orchestrator.run_research("solar flares").await;
        assert!(matches!(
            result,
            Err(ResearchError::DeadlineExceeded(d)) if d == Duration::from_secs(1)
        ));
    }

    #[tokio::test]
    async fn test_empty_topic_is_rejected() {
        let searcher = Arc::new(StubSearcher::new(two_results()));
        let orchestrator = orchestrator(
            Arc::new(StubGenerator::fixed(QUERY)),
            searcher.clone(),
            3,
        );

        let result = orchestrator.run_research("   ").await;
        assert!(matches!(result, Err(ResearchError::EmptyTopic)));
        assert_eq!(searcher.call_count(), 0);
    }
}
