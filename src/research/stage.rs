use async_trait::async_trait;

use crate::error::{ExtractionError, ServiceError};
use crate::research::context::ResearchContext;
use crate::types::{FallbackEvent, ResearchState, Stage, StateUpdate};

/// 研究循环中的一个阶段
///
/// 阶段只读取当前状态，最多调用一次外部服务，返回交给控制器合并的局部更新。
/// 外部服务错误直接向上传播；结构化输出提取失败则在阶段内部以兜底值恢复。
#[async_trait]
pub trait ResearchStage: Send + Sync {
    fn stage(&self) -> Stage;

    async fn execute(
        &self,
        context: &ResearchContext,
        state: &ResearchState,
    ) -> Result<StateUpdate, ServiceError>;
}

/// 构造使用兜底查询的更新，并记录降级事件
pub(crate) fn fallback_update(stage: Stage, error: ExtractionError, substitute: String) -> StateUpdate {
    tracing::warn!(
        stage = %stage,
        error = %error,
        substitute = %substitute,
        "⚠️ 结构化输出提取失败，使用兜底查询"
    );

    StateUpdate {
        search_query: Some(substitute.clone()),
        fallback: Some(FallbackEvent {
            stage,
            error,
            substitute,
        }),
        ..Default::default()
    }
}
