//! Tavily 搜索服务客户端

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::{ServiceError, ServiceKind};
use crate::search::SearchService;
use crate::types::SearchResult;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_raw_content: bool,
    search_depth: &'a str,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResponseItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResponseItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    raw_content: Option<String>,
}

impl From<SearchResponseItem> for SearchResult {
    fn from(item: SearchResponseItem) -> Self {
        SearchResult {
            title: item
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            url: item.url.trim().to_string(),
            content: item.content,
            raw_content: item.raw_content,
        }
    }
}

/// Tavily 搜索客户端
#[derive(Clone)]
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    search_depth: String,
}

impl TavilyClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build search http client")?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/search", config.api_base_url.trim_end_matches('/')),
            search_depth: config.search_depth.clone(),
        })
    }

    fn classify_status(status: StatusCode, body: &str) -> ServiceError {
        let message = format!("status {}: {}", status, body);
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            ServiceError::unavailable(ServiceKind::Search, message)
        } else {
            ServiceError::failed(ServiceKind::Search, message)
        }
    }
}

#[async_trait]
impl SearchService for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        include_raw_content: bool,
    ) -> Result<Vec<SearchResult>, ServiceError> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
            include_raw_content,
            search_depth: &self.search_depth,
            include_answer: false,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(ServiceKind::Search, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, &body));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::failed(ServiceKind::Search, e.to_string()))?;

        let results: Vec<SearchResult> = payload
            .results
            .into_iter()
            .filter(|item| !item.url.trim().is_empty())
            .map(SearchResult::from)
            .collect();

        tracing::debug!(query, count = results.len(), "搜索完成");
        Ok(results)
    }
}
