use async_trait::async_trait;

use crate::error::ServiceError;
use crate::types::SearchResult;

pub mod tavily;

pub use tavily::TavilyClient;

/// 网页搜索服务
#[async_trait]
pub trait SearchService: Send + Sync {
    /// 按相关度返回搜索结果
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        include_raw_content: bool,
    ) -> Result<Vec<SearchResult>, ServiceError>;
}
