//! Rust client for the ConceptBridge catalog and analogy API.
//!
//! Thin wrapper over reqwest that implements the core's [`CatalogSource`] and
//! [`GenerationService`] seams.
//!
//! # Example
//! ```rust,no_run
//! use conceptbridge_client::BridgeClient;
//! use conceptbridge_core::{generate, CatalogReader, GenerationOptions, TokenBudget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BridgeClient::new("http://localhost:8000")?;
//!     let reader = CatalogReader::new(client.clone());
//!
//!     let topics = reader.list_topics().await?;
//!     let subtopics = reader.list_subtopics(topics[0].id).await?;
//!
//!     let result = generate(
//!         &client,
//!         "Cooking",
//!         &subtopics[0].name,
//!         &GenerationOptions::default(),
//!         &TokenBudget::default(),
//!     )
//!     .await?;
//!     println!("{}", result.analogy_title);
//!     Ok(())
//! }
//! ```
use async_trait::async_trait;
use conceptbridge_core::{
    BridgeError, CatalogSource, GenerationRequest, GenerationResult, GenerationService, HealthReport,
    Profession, Result, Subtopic, SubtopicScheme, Topic, TopicId,
};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Route prefix for versioned API endpoints.
pub const API_PREFIX: &str = "/api/v1";

/// Applied to every request unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reason phrase for a status, falling back to the numeric code.
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

/// A handle to a running ConceptBridge server. Cheap to clone.
#[derive(Clone, Debug)]
pub struct BridgeClient {
    http: Client,
    base_url: String,
}

impl BridgeClient {
    /// `base_url` is the server root, e.g. `"http://localhost:8000"`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| BridgeError::ServiceUnavailable(format!("GET {}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BridgeError::ServiceUnavailable(format!(
                "GET {}: HTTP {} {}",
                url,
                status.as_u16(),
                status_text(status)
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| BridgeError::ServiceUnavailable(format!("GET {}: invalid body: {}", url, e)))
    }

    /// Query `/health`. Use [`HealthReport::is_healthy`] to classify.
    pub async fn health(&self) -> Result<HealthReport> {
        self.get_json("/health", &[]).await
    }

    pub async fn get_profession(&self, id: i64) -> Result<Profession> {
        self.get_json(&format!("{}/professions/{}", API_PREFIX, id), &[]).await
    }

    pub async fn get_topic(&self, id: TopicId) -> Result<Topic> {
        self.get_json(&format!("{}/topics/{}", API_PREFIX, id), &[]).await
    }
}

#[async_trait]
impl CatalogSource for BridgeClient {
    async fn list_professions(&self) -> Result<Vec<Profession>> {
        self.get_json(&format!("{}/professions", API_PREFIX), &[]).await
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        self.get_json(&format!("{}/topics", API_PREFIX), &[]).await
    }

    async fn list_subtopics(&self, topic_id: TopicId, scheme: SubtopicScheme) -> Result<Vec<Subtopic>> {
        match scheme {
            SubtopicScheme::PathScoped => {
                self.get_json(&format!("{}/topics/{}/subtopics", API_PREFIX, topic_id), &[])
                    .await
            }
            SubtopicScheme::QueryScoped => {
                self.get_json(
                    &format!("{}/subtopics", API_PREFIX),
                    &[("topic_id", topic_id.to_string())],
                )
                .await
            }
        }
    }
}

#[async_trait]
impl GenerationService for BridgeClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let url = self.url(&format!("{}/analogies/quick-explain", API_PREFIX));
        debug!("POST {} ({} -> {})", url, request.profession, request.concept);

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BridgeError::GenerationFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BridgeError::GenerationFailed(status_text(status)));
        }

        resp.json::<GenerationResult>()
            .await
            .map_err(|e| BridgeError::GenerationFailed(format!("malformed response: {}", e)))
    }
}
