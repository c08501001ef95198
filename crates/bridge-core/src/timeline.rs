use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_TIMELINE_CAPACITY: usize = 50;

/// One past generation, as remembered by the view layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub profession: String,
    pub concept: String,
    pub title: Option<String>,
    /// Set when the generation failed.
    pub error: Option<String>,
}

impl TimelineEntry {
    pub fn succeeded(profession: impl Into<String>, concept: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            profession: profession.into(),
            concept: concept.into(),
            title: Some(title.into()),
            error: None,
        }
    }

    pub fn failed(profession: impl Into<String>, concept: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            profession: profession.into(),
            concept: concept.into(),
            title: None,
            error: Some(error.into()),
        }
    }
}

/// Append-only, bounded, newest-first log of generations.
#[derive(Debug, Clone)]
pub struct Timeline {
    entries: VecDeque<TimelineEntry>,
    capacity: usize,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(DEFAULT_TIMELINE_CAPACITY)
    }
}

impl Timeline {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, entry: TimelineEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }
}
