//! ConceptBridge server: seed catalog, analogy engine and the HTTP API that
//! serves them. The `conceptbridge` binary adds the CLI on top.

pub mod config;
pub mod engine;
pub mod http;
pub mod serve;
pub mod store;

pub use config::BridgeConfig;
pub use engine::{AnalogyEngine, ChatBackend, ChatCompletion, LlmError, OpenAiChat};
pub use http::{create_router, AppState};
pub use store::SeedCatalog;
