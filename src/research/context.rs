use std::sync::Arc;

use anyhow::Result;

use crate::config::{Config, ResearchConfig};
use crate::llm::GenerationService;
use crate::llm::client::LLMClient;
use crate::research::extractor::{GreedyJsonExtractor, StructuredOutputExtractor};
use crate::search::{SearchService, TavilyClient};

/// 研究运行所需的外部服务句柄与配置
#[derive(Clone)]
pub struct ResearchContext {
    /// 文本生成服务
    pub generator: Arc<dyn GenerationService>,
    /// 网页搜索服务
    pub searcher: Arc<dyn SearchService>,
    /// 结构化输出提取策略
    pub extractor: Arc<dyn StructuredOutputExtractor>,
    /// 研究循环配置
    pub config: ResearchConfig,
}

impl ResearchContext {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        searcher: Arc<dyn SearchService>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            generator,
            searcher,
            extractor: Arc::new(GreedyJsonExtractor),
            config,
        }
    }

    /// 替换默认的提取策略
    pub fn with_extractor(mut self, extractor: Arc<dyn StructuredOutputExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// 根据应用配置构建真实的LLM与搜索客户端
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = Arc::new(LLMClient::new(config.llm.clone())?);
        let searcher = Arc::new(TavilyClient::new(&config.search)?);
        Ok(Self::new(generator, searcher, config.research.clone()))
    }
}
