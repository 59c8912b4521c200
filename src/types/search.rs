use serde::{Deserialize, Serialize};

/// 单条网页搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// 搜索服务给出的最相关片段
    pub content: String,
    /// 页面全文，仅在请求了 raw content 时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            raw_content: None,
        }
    }

    pub fn with_raw_content(mut self, raw_content: impl Into<String>) -> Self {
        self.raw_content = Some(raw_content.into());
        self
    }
}
