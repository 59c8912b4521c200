//! 单元测试用的外部服务替身

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{ServiceError, ServiceKind};
use crate::llm::GenerationService;
use crate::research::prompts::SUMMARIZER_INSTRUCTIONS;
use crate::search::SearchService;
use crate::types::SearchResult;

type Responder = Box<dyn Fn(&str, &str) -> Result<String, ServiceError> + Send + Sync>;

pub struct StubGenerator {
    responder: Responder,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl StubGenerator {
    pub fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// 按系统指令区分阶段返回不同内容
    pub fn routed(query: &str, summary: &str, reflection: &str) -> Self {
        let (query, summary, reflection) =
            (query.to_string(), summary.to_string(), reflection.to_string());
        Self::new(move |system, _| {
            if system == SUMMARIZER_INSTRUCTIONS {
                Ok(summary.clone())
            } else if system.contains("knowledge_gap") {
                Ok(reflection.clone())
            } else {
                Ok(query.clone())
            }
        })
    }

    pub fn failing() -> Self {
        Self::new(|_, _| {
            Err(ServiceError::unavailable(
                ServiceKind::Generation,
                "connection refused",
            ))
        })
    }

    fn new(
        responder: impl Fn(&str, &str) -> Result<String, ServiceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationService for StubGenerator {
    async fn generate(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), user_message.to_string()));
        (self.responder)(system_instruction, user_message)
    }
}

pub struct StubSearcher {
    results: Vec<SearchResult>,
    /// 第 n 次（从1开始）调用时返回错误
    fail_on_call: Option<usize>,
    pub queries: Mutex<Vec<String>>,
}

impl StubSearcher {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            fail_on_call: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchService for StubSearcher {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        _include_raw_content: bool,
    ) -> Result<Vec<SearchResult>, ServiceError> {
        let call = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.to_string());
            queries.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(ServiceError::unavailable(ServiceKind::Search, "search backend down"));
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

pub fn two_results() -> Vec<SearchResult> {
    vec![
        SearchResult::new(
            "Solar flare - Wikipedia",
            "https://en.wikipedia.org/wiki/Solar_flare",
            "A solar flare is an intense localized eruption of electromagnetic radiation.",
        ),
        SearchResult::new(
            "Solar Flares | NASA",
            "https://science.nasa.gov/sun/solar-flares",
            "Solar flares are giant explosions on the Sun.",
        ),
    ]
}
