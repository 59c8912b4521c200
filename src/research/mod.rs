// 迭代式网页研究
// generate_query -> web_research -> summarize -> reflect -> (web_research | finalize)
// 每个阶段只读取状态并返回局部更新，由 orchestrator 合并并决定下一阶段。

pub mod context;
pub mod extractor;
pub mod orchestrator;
pub mod prompts;
pub mod stage;
pub mod stages;
pub mod timing;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::ResearchContext;
pub use orchestrator::ResearchOrchestrator;
