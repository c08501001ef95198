//! In-memory seed catalog served by the HTTP API.

use conceptbridge_core::{
    BridgeError, DifficultyLevel, Profession, ProfessionId, Result, Subtopic, Topic, TopicId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_SEED: &str = include_str!("../seed/catalog.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub professions: Vec<Profession>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub subtopics: Vec<Subtopic>,
}

/// Immutable catalog. Collections keep seed-file order.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    data: SeedData,
}

impl SeedCatalog {
    /// Validates id uniqueness and every subtopic reference.
    pub fn new(data: SeedData) -> Result<Self> {
        let mut seen = HashSet::new();
        for p in &data.professions {
            if !seen.insert(p.id) {
                return Err(BridgeError::Seed(format!("duplicate profession id {}", p.id)));
            }
        }

        let mut topic_ids = HashSet::new();
        for t in &data.topics {
            if !topic_ids.insert(t.id) {
                return Err(BridgeError::Seed(format!("duplicate topic id {}", t.id)));
            }
        }

        let mut subtopic_ids = HashSet::new();
        for s in &data.subtopics {
            if !subtopic_ids.insert(s.id) {
                return Err(BridgeError::Seed(format!("duplicate subtopic id {}", s.id)));
            }
            if !topic_ids.contains(&s.topic_id) {
                return Err(BridgeError::Seed(format!(
                    "subtopic {} ('{}') references unknown topic {}",
                    s.id, s.name, s.topic_id
                )));
            }
        }

        for s in &data.subtopics {
            if let Some(missing) = s.prerequisites.iter().find(|p| !subtopic_ids.contains(p)) {
                return Err(BridgeError::Seed(format!(
                    "subtopic {} lists unknown prerequisite {}",
                    s.id, missing
                )));
            }
        }

        Ok(Self { data })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data: SeedData = serde_json::from_str(json)
            .map_err(|e| BridgeError::Seed(format!("invalid seed JSON: {}", e)))?;
        Self::new(data)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Seed(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// The seed compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SEED)
    }

    pub fn professions(&self) -> &[Profession] {
        &self.data.professions
    }

    pub fn profession(&self, id: ProfessionId) -> Option<&Profession> {
        self.data.professions.iter().find(|p| p.id == id)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.data.topics
    }

    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.data.topics.iter().find(|t| t.id == id)
    }

    /// Subtopics of `topic_id`, optionally filtered by difficulty and capped.
    pub fn subtopics_of(
        &self,
        topic_id: TopicId,
        difficulty: Option<DifficultyLevel>,
        limit: Option<usize>,
    ) -> Vec<Subtopic> {
        self.data
            .subtopics
            .iter()
            .filter(|s| s.topic_id == topic_id)
            .filter(|s| difficulty.map_or(true, |d| s.difficulty_level == d))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.data.professions.len(),
            self.data.topics.len(),
            self.data.subtopics.len(),
        )
    }
}
