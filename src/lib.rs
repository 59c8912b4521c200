pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod outlet;
pub mod research;
pub mod search;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExtractionError, ResearchError, ServiceError};
pub use research::workflow::launch;
pub use research::{ResearchContext, ResearchOrchestrator};
pub use types::{ResearchOutcome, ResearchState};
