pub mod research_state;
pub mod search;
pub mod stage;

pub use research_state::{
    FallbackEvent, ReflectionUpdate, ResearchOutcome, ResearchRound, ResearchState, StateUpdate,
};
pub use search::SearchResult;
pub use stage::Stage;
