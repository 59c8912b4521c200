use async_trait::async_trait;

use crate::error::ServiceError;

pub mod client;

/// 文本生成服务
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// 以系统指令 + 用户消息调用模型，返回生成文本
    async fn generate(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, ServiceError>;
}
