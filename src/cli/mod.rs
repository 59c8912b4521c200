use crate::config::{Config, DEFAULT_CONFIG_FILE, LLMProvider};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// deep-researcher - 迭代式网页研究助手
#[derive(Parser, Debug)]
#[command(name = "deep-researcher")]
#[command(
    about = "Iterative web researcher: generates a query, searches the web, summarizes, reflects on knowledge gaps and repeats before writing a cited report."
)]
#[command(version)]
pub struct Args {
    /// 研究主题
    pub topic: String,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 报告输出路径（markdown）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider（openai 兼容端点: openai, groq, deepseek, moonshot, openrouter；或 ollama）
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 模型名称
    #[arg(short, long)]
    pub model: Option<String>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 搜索服务 API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 循环上限（实际搜索次数为该值加一）
    #[arg(long)]
    pub max_loops: Option<u32>,

    /// 每次搜索返回的结果数
    #[arg(long)]
    pub max_results: Option<usize>,

    /// 整个研究运行的截止时间（秒）
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            // 显式指定的配置文件必须可读
            Some(config_path) => Config::from_file(config_path)
                .context(format!("无法读取配置文件 {:?}", config_path))?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);

                if default_config_path.exists() {
                    Config::from_file(&default_config_path).context(format!(
                        "无法读取默认配置文件 {:?}",
                        default_config_path
                    ))?
                } else {
                    Config::default()
                }
            }
        };

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            config.llm.provider = provider_str
                .parse::<LLMProvider>()
                .map_err(anyhow::Error::msg)
                .context("--llm-provider 仅支持 openai（含 groq 等兼容端点）或 ollama")?;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 搜索与研究循环配置
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(max_loops) = self.max_loops {
            config.research.max_loops = max_loops;
        }
        if let Some(max_results) = self.max_results {
            config.research.max_results = max_results;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.research.timeout_secs = Some(timeout_secs);
        }

        if let Some(output) = self.output {
            config.output_path = Some(output);
        }
        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}
