pub mod types;
pub mod error;
pub mod request;
pub mod catalog;
pub mod generation;
pub mod orchestrator;
pub mod prompt;
pub mod timeline;

pub use error::{BridgeError, Result};
pub use types::*;
pub use request::{
    clamp_creativity, split_paragraphs, GenerationOptions, GenerationRequest, GenerationResult,
    TargetLength, TokenBudget, DEFAULT_CREATIVITY, MAX_CREATIVITY, MIN_CREATIVITY,
};
pub use catalog::{CatalogReader, CatalogSource, SubtopicScheme};
pub use generation::{generate, GenerationService};
pub use orchestrator::{Orchestrator, Phase, SubtopicTicket};
pub use timeline::{Timeline, TimelineEntry, DEFAULT_TIMELINE_CAPACITY};
