use std::time::Duration;

/// 外部服务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Generation,
    Search,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Generation => write!(f, "generation"),
            ServiceKind::Search => write!(f, "search"),
        }
    }
}

/// 外部服务调用失败，研究循环内部不做恢复
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// 传输层失败、限流或服务端暂不可用
    #[error("{service} service unavailable: {message}")]
    Unavailable { service: ServiceKind, message: String },
    /// 认证失败、请求被拒绝或响应无法解析
    #[error("{service} service error: {message}")]
    Failed { service: ServiceKind, message: String },
}

impl ServiceError {
    pub fn unavailable(service: ServiceKind, message: impl Into<String>) -> Self {
        ServiceError::Unavailable {
            service,
            message: message.into(),
        }
    }

    pub fn failed(service: ServiceKind, message: impl Into<String>) -> Self {
        ServiceError::Failed {
            service,
            message: message.into(),
        }
    }

    pub fn service(&self) -> ServiceKind {
        match self {
            ServiceError::Unavailable { service, .. } | ServiceError::Failed { service, .. } => {
                *service
            }
        }
    }
}

/// 结构化输出提取失败，属于可恢复错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no JSON object found in model output")]
    NoJsonFound,
    #[error("failed to parse JSON object: {0}")]
    ParseError(String),
    #[error("JSON object is missing required key `{0}`")]
    MissingKey(String),
}

/// 一次研究运行的失败
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("research topic must not be empty")]
    EmptyTopic,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("research run exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}
