//! LLM客户端 - 基于 rig 的文本生成服务实现

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;

use crate::config::LLMConfig;
use crate::error::ServiceError;
use crate::llm::GenerationService;

mod providers;

use providers::ProviderClient;

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 重试暂时不可用的错误，`Failed` 直接返回
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T, ServiceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let max_retries = self.config.retry_attempts.max(1);
        let retry_delay_ms = self.config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    tracing::warn!(
                        attempt = retries,
                        max_attempts = max_retries,
                        "❌ 调用模型服务出错: {}",
                        err
                    );
                    if matches!(err, ServiceError::Failed { .. }) || retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(retry_delay_ms)).await;
                }
            }
        }
    }

    /// 单轮对话（不使用工具）
    pub async fn prompt(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ServiceError> {
        let agent = self.client.create_agent(system_prompt, &self.config);

        self.retry_with_backoff(|| async { agent.prompt(user_prompt).await })
            .await
    }
}

#[async_trait]
impl GenerationService for LLMClient {
    async fn generate(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, ServiceError> {
        self.prompt(system_instruction, user_message).await
    }
}
