/// 研究循环中的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    GenerateQuery,
    WebResearch,
    Summarize,
    Reflect,
    Finalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::GenerateQuery => "generate_query",
            Stage::WebResearch => "web_research",
            Stage::Summarize => "summarize",
            Stage::Reflect => "reflect",
            Stage::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
