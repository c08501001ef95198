use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BridgeError {
    /// A catalog fetch failed (transport error, non-2xx, undecodable body).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The generation call failed. The message is shown to the user verbatim.
    #[error("{0}")]
    GenerationFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Seed data error: {0}")]
    Seed(String),
}

impl BridgeError {
    /// The bare message without the category prefix, for inline display.
    pub fn message(&self) -> &str {
        match self {
            BridgeError::ServiceUnavailable(m)
            | BridgeError::GenerationFailed(m)
            | BridgeError::Validation(m)
            | BridgeError::NotFound(m)
            | BridgeError::Config(m)
            | BridgeError::Seed(m) => m,
        }
    }
}
