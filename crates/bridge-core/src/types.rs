use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type alias for profession identifiers
pub type ProfessionId = i64;

/// Type alias for topic identifiers
pub type TopicId = i64;

/// Type alias for subtopic identifiers
pub type SubtopicId = i64;

/// A background the user already knows, used to frame analogies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profession {
    pub id: ProfessionId,

    /// Display name, e.g. "Cooking".
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profession {
    pub fn new(id: ProfessionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A top-level area of study (Computer Science, Mathematics, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Glyph shown next to the topic name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Display color, usually a hex string such as "#3B82F6".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(id: TopicId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            icon: None,
            color: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// A concept inside a topic. Belongs to exactly one [`Topic`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtopic {
    pub id: SubtopicId,
    pub topic_id: TopicId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub difficulty_level: DifficultyLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_minutes: Option<u32>,

    /// Other subtopics worth reading first. Informational only; nothing
    /// enforces this as a dependency graph.
    #[serde(default)]
    pub prerequisites: Vec<SubtopicId>,
}

impl Subtopic {
    pub fn new(id: SubtopicId, topic_id: TopicId, name: impl Into<String>) -> Self {
        Self {
            id,
            topic_id,
            name: name.into(),
            description: None,
            difficulty_level: DifficultyLevel::default(),
            estimated_time_minutes: None,
            prerequisites: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, level: DifficultyLevel) -> Self {
        self.difficulty_level = level;
        self
    }
}

/// A topic together with its subtopics, as served by the `with-subtopics` route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicWithSubtopics {
    #[serde(flatten)]
    pub topic: Topic,
    pub subtopics: Vec<Subtopic>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = crate::BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(crate::BridgeError::Validation(format!(
                "unknown difficulty level '{}'",
                other
            ))),
        }
    }
}

/// Status token the catalog service reports when everything is up.
pub const HEALTHY: &str = "healthy";

/// Body of the catalog service health check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub database: String,
}

impl HealthReport {
    /// Anything other than the exact "healthy" token counts as degraded.
    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}
