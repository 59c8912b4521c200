//! 生成服务的 rig 后端
//!
//! 研究循环只需要两类后端：任意 OpenAI 兼容端点（Groq、OpenAI、DeepSeek 等，
//! 通过 `api_base_url` 区分）以及本地 Ollama。

use anyhow::Result;
use rig::{agent::Agent, client::CompletionClient, completion::Prompt};

use crate::config::{LLMConfig, LLMProvider};
use crate::error::{ServiceError, ServiceKind};

/// 被视为服务端暂时不可用的错误特征（限流、网关、过载）
const TRANSIENT_MARKERS: [&str; 9] = [
    "429",
    "too many requests",
    "rate limit",
    "502",
    "503",
    "504",
    "overloaded",
    "timed out",
    "connection",
];

#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let client = match config.provider {
            LLMProvider::OpenAI => ProviderClient::OpenAI(
                rig::providers::openai::Client::builder(&config.api_key)
                    .base_url(&config.api_base_url)
                    .build(),
            ),
            // Ollama 使用本地默认端口
            LLMProvider::Ollama => {
                ProviderClient::Ollama(rig::providers::ollama::Client::builder().build())
            }
        };
        Ok(client)
    }

    /// 以系统指令作为 preamble 构建单轮Agent
    pub fn create_agent(&self, system_instruction: &str, config: &LLMConfig) -> ProviderAgent {
        match self {
            // Groq 等兼容端点只实现了 chat completions 接口
            ProviderClient::OpenAI(client) => ProviderAgent::OpenAI(
                client
                    .completion_model(&config.model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(system_instruction)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .build(),
            ),
            ProviderClient::Ollama(client) => ProviderAgent::Ollama(
                client
                    .agent(&config.model)
                    .preamble(system_instruction)
                    .max_tokens(config.max_tokens.into())
                    .temperature(config.temperature)
                    .build(),
            ),
        }
    }
}

pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    pub fn provider(&self) -> LLMProvider {
        match self {
            ProviderAgent::OpenAI(_) => LLMProvider::OpenAI,
            ProviderAgent::Ollama(_) => LLMProvider::Ollama,
        }
    }

    /// 发送用户消息，失败时按可恢复性归类
    pub async fn prompt(&self, user_message: &str) -> Result<String, ServiceError> {
        let result = match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(user_message).await,
            ProviderAgent::Ollama(agent) => agent.prompt(user_message).await,
        };
        result.map_err(|e| classify_generation_error(&e.to_string()))
    }
}

/// 将模型服务的错误信息归类为 `Unavailable`（可重试）或 `Failed`
pub fn classify_generation_error(message: &str) -> ServiceError {
    let lowered = message.to_lowercase();
    if TRANSIENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        ServiceError::unavailable(ServiceKind::Generation, message)
    } else {
        ServiceError::failed(ServiceKind::Generation, message)
    }
}
