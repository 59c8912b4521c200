use crate::error::ExtractionError;
use crate::types::search::SearchResult;
use crate::types::stage::Stage;

/// 某个阶段因结构化输出提取失败而使用了兜底值
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackEvent {
    pub stage: Stage,
    pub error: ExtractionError,
    /// 实际替换上去的查询语句
    pub substitute: String,
}

/// 一轮网页搜索的产出，结果集与引用文本总是成对追加
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchRound {
    pub results: Vec<SearchResult>,
    pub citations: String,
}

/// reflect 阶段对知识缺口字段的写入
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectionUpdate {
    Found {
        knowledge_gap: String,
        follow_up_query: String,
    },
    /// 提取失败，清空上一轮的知识缺口与后续查询
    Missing,
}

/// 单个阶段返回的局部状态更新，由循环控制器合并进 [`ResearchState`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub search_query: Option<String>,
    pub research_round: Option<ResearchRound>,
    pub running_summary: Option<String>,
    pub reflection: Option<ReflectionUpdate>,
    pub fallback: Option<FallbackEvent>,
    pub final_report: Option<String>,
}

impl StateUpdate {
    pub fn is_empty(&self) -> bool {
        *self == StateUpdate::default()
    }
}

/// 一次研究运行的全部可变状态
///
/// 字段只能通过 [`ResearchState::apply`] 修改，从而保证：
/// - `loop_count` 等于已完成的 web-research 次数；
/// - `sources_gathered` 与 `web_research_results` 长度一致；
/// - `topic` 在创建后不可变；
/// - 最终报告只生成一次。
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchState {
    topic: String,
    search_query: String,
    loop_count: u32,
    web_research_results: Vec<Vec<SearchResult>>,
    sources_gathered: Vec<String>,
    running_summary: Option<String>,
    knowledge_gap: Option<String>,
    follow_up_query: Option<String>,
    fallbacks: Vec<FallbackEvent>,
    finalized: bool,
}

impl ResearchState {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            search_query: String::new(),
            loop_count: 0,
            web_research_results: Vec::new(),
            sources_gathered: Vec::new(),
            running_summary: None,
            knowledge_gap: None,
            follow_up_query: None,
            fallbacks: Vec::new(),
            finalized: false,
        }
    }

    /// 合并某个阶段的输出
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(query) = update.search_query {
            self.search_query = query;
        }

        if let Some(round) = update.research_round {
            self.web_research_results.push(round.results);
            self.sources_gathered.push(round.citations);
            self.loop_count += 1;
        }

        if let Some(summary) = update.running_summary {
            self.running_summary = Some(summary);
        }

        match update.reflection {
            Some(ReflectionUpdate::Found {
                knowledge_gap,
                follow_up_query,
            }) => {
                self.knowledge_gap = Some(knowledge_gap);
                self.follow_up_query = Some(follow_up_query);
            }
            Some(ReflectionUpdate::Missing) => {
                self.knowledge_gap = None;
                self.follow_up_query = None;
            }
            None => {}
        }

        if let Some(fallback) = update.fallback {
            self.fallbacks.push(fallback);
        }

        if let Some(report) = update.final_report
            && !self.finalized
        {
            self.running_summary = Some(report);
            self.finalized = true;
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn web_research_results(&self) -> &[Vec<SearchResult>] {
        &self.web_research_results
    }

    /// 最近一轮的搜索结果
    pub fn latest_results(&self) -> Option<&[SearchResult]> {
        self.web_research_results.last().map(Vec::as_slice)
    }

    pub fn sources_gathered(&self) -> &[String] {
        &self.sources_gathered
    }

    pub fn running_summary(&self) -> Option<&str> {
        self.running_summary.as_deref()
    }

    pub fn knowledge_gap(&self) -> Option<&str> {
        self.knowledge_gap.as_deref()
    }

    pub fn follow_up_query(&self) -> Option<&str> {
        self.follow_up_query.as_deref()
    }

    pub fn fallbacks(&self) -> &[FallbackEvent] {
        &self.fallbacks
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

/// 对外暴露的研究结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutcome {
    pub topic: String,
    /// 带有 `### Sources:` 段落的最终报告
    pub summary: String,
    pub sources: Vec<String>,
    pub final_knowledge_gap: Option<String>,
    pub final_follow_up_query: Option<String>,
    pub fallbacks: Vec<FallbackEvent>,
    pub loop_count: u32,
}

impl ResearchOutcome {
    pub fn used_fallback(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

impl From<ResearchState> for ResearchOutcome {
    fn from(state: ResearchState) -> Self {
        Self {
            topic: state.topic,
            summary: state.running_summary.unwrap_or_default(),
            sources: state.sources_gathered,
            final_knowledge_gap: state.knowledge_gap,
            final_follow_up_query: state.follow_up_query,
            fallbacks: state.fallbacks,
            loop_count: state.loop_count,
        }
    }
}
