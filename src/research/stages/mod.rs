pub mod finalize;
pub mod generate_query;
pub mod reflect;
pub mod summarize;
pub mod web_research;

pub use finalize::SummaryFinalizer;
pub use generate_query::QueryWriter;
pub use reflect::SummaryReflector;
pub use summarize::SourceSummarizer;
pub use web_research::WebResearcher;
