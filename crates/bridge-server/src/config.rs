use conceptbridge_core::{TokenBudget, DEFAULT_TIMELINE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Contents of `conceptbridge.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub generation: GenerationConfig,
    pub budget: TokenBudget,
    pub timeline: TimelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// JSON seed file; the built-in seed is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            seed_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the ConceptBridge API used by client commands.
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    /// Inline key. Prefer `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Answer with a template analogy when the model call fails.
    pub fallback: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
            fallback: true,
        }
    }
}

impl GenerationConfig {
    /// Inline key first, then the environment variable named by `api_key_env`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    pub capacity: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TIMELINE_CAPACITY,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: BridgeConfig = toml::from_str(&text)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .listen_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid [server] listen_addr '{}': {}", self.server.listen_addr, e))
    }

    /// Human-readable problems; empty when the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.listen_addr().is_err() {
            errors.push(format!("[server] listen_addr '{}' is not a socket address", self.server.listen_addr));
        }
        if let Some(seed) = &self.server.seed_path {
            if !seed.exists() {
                errors.push(format!("[server] seed_path {} does not exist", seed.display()));
            }
        }
        if !self.client.api_url.starts_with("http://") && !self.client.api_url.starts_with("https://") {
            errors.push(format!("[client] api_url '{}' must start with http:// or https://", self.client.api_url));
        }
        if self.client.timeout_secs == 0 {
            errors.push("[client] timeout_secs must be > 0".to_string());
        }
        if self.generation.model.trim().is_empty() {
            errors.push("[generation] model must not be empty".to_string());
        }
        if self.generation.timeout_secs == 0 {
            errors.push("[generation] timeout_secs must be > 0".to_string());
        }
        let b = &self.budget;
        if b.short == 0 || b.medium == 0 || b.long == 0 {
            errors.push("[budget] token budgets must be > 0".to_string());
        }
        if !(b.short <= b.medium && b.medium <= b.long) {
            errors.push(format!(
                "[budget] expected short <= medium <= long (got {}, {}, {})",
                b.short, b.medium, b.long
            ));
        }
        if self.timeline.capacity == 0 {
            errors.push("[timeline] capacity must be > 0".to_string());
        }

        errors
    }
}
