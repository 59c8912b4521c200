use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "researcher.toml";

/// LLM Provider类型
///
/// `openai` 覆盖所有 OpenAI 兼容端点（Groq、DeepSeek、Moonshot、OpenRouter 等），
/// 由 `api_base_url` 决定实际服务。
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai", alias = "groq")]
    #[default]
    OpenAI,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "groq" | "deepseek" | "moonshot" | "openrouter" => Ok(LLMProvider::OpenAI),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl LLMProvider {
    /// 是否需要 API KEY
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LLMProvider::Ollama)
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// 搜索服务配置
    pub search: SearchConfig,

    /// 研究循环配置
    pub research: ResearchConfig,

    /// 报告输出路径，为空时只输出到终端
    pub output_path: Option<PathBuf>,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,
}

/// 搜索服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Tavily API KEY
    pub api_key: String,

    /// Tavily API基地址
    pub api_base_url: String,

    /// basic 或 advanced
    pub search_depth: String,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 研究循环配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ResearchConfig {
    /// 循环上限，实际执行 max_loops + 1 次搜索
    pub max_loops: u32,

    /// 每次搜索返回的结果数
    pub max_results: usize,

    /// 是否请求页面全文
    pub include_raw_content: bool,

    /// 每个来源全文的token上限（按4字符/token估算）
    pub max_tokens_per_source: usize,

    /// 整个研究运行的截止时间（秒）
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 启动前检查必需的凭证与参数
    pub fn validate(&self) -> Result<()> {
        if self.llm.provider.requires_api_key() && self.llm.api_key.trim().is_empty() {
            bail!(
                "Missing LLM API key for provider `{}`. Set LLM_API_KEY (or GROQ_API_KEY) in the environment or a .env file.",
                self.llm.provider
            );
        }
        if self.llm.model.trim().is_empty() {
            bail!("LLM model name must not be empty");
        }
        if self.search.api_key.trim().is_empty() {
            bail!("Missing search API key. Set TAVILY_API_KEY in the environment or a .env file.");
        }
        if self.research.max_results == 0 {
            bail!("research.max_results must be at least 1");
        }
        Ok(())
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("GROQ_API_KEY"))
                .unwrap_or_default(),
            api_base_url: String::from("https://api.groq.com/openai/v1"),
            model: String::from("deepseek-r1-distill-llama-70b"),
            max_tokens: 8192,
            temperature: 0.0,
            retry_attempts: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TAVILY_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            search_depth: String::from("basic"),
            timeout_seconds: 60,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_loops: 3,
            max_results: 1,
            include_raw_content: true,
            max_tokens_per_source: 1000,
            timeout_secs: None,
        }
    }
}
