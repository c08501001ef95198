use crate::error::{BridgeError, Result};
use crate::request::{GenerationOptions, GenerationRequest, GenerationResult, TokenBudget};
use async_trait::async_trait;
use log::{error, info};

/// External text-generation collaborator.
///
/// Implementations issue exactly one upstream request per call; there is no
/// caching or de-duplication of identical requests.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;
}

#[async_trait]
impl<T: GenerationService + ?Sized> GenerationService for std::sync::Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        (**self).generate(request).await
    }
}

/// Validate inputs, build the request and call the service once.
///
/// Any failure from the service comes back as [`BridgeError::GenerationFailed`]
/// carrying the upstream message. No retries.
pub async fn generate<G>(
    service: &G,
    profession: &str,
    concept: &str,
    options: &GenerationOptions,
    budget: &TokenBudget,
) -> Result<GenerationResult>
where
    G: GenerationService + ?Sized,
{
    let profession = profession.trim();
    let concept = concept.trim();
    if profession.is_empty() {
        return Err(BridgeError::Validation("a profession must be selected".into()));
    }
    if concept.is_empty() {
        return Err(BridgeError::Validation("concept must not be empty".into()));
    }

    let request = GenerationRequest::new(profession, concept, options, budget);
    info!(
        "Generating analogy: {} -> {} (creativity {}, {} / {} tokens)",
        request.profession,
        request.concept,
        request.creativity_level,
        request.response_length,
        request.max_tokens
    );

    service.generate(&request).await.map_err(as_generation_failure)
}

/// Fold any error from a generation call into `GenerationFailed`.
pub(crate) fn as_generation_failure(e: BridgeError) -> BridgeError {
    error!("Analogy generation failed: {}", e);
    match e {
        BridgeError::GenerationFailed(msg) => BridgeError::GenerationFailed(msg),
        other => BridgeError::GenerationFailed(other.message().to_string()),
    }
}
