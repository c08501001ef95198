//! Read-only access to the seed catalog: professions, topics, subtopics.

use crate::error::Result;
use crate::types::{Profession, Subtopic, Topic, TopicId};
use async_trait::async_trait;
use log::{debug, warn};
use std::fmt;

/// How a subtopic listing is addressed on the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubtopicScheme {
    /// `/topics/{id}/subtopics`. Canonical.
    PathScoped,
    /// `/subtopics?topic_id={id}`. Deprecated; only used as a fallback.
    QueryScoped,
}

impl SubtopicScheme {
    pub fn alternate(self) -> Self {
        match self {
            SubtopicScheme::PathScoped => SubtopicScheme::QueryScoped,
            SubtopicScheme::QueryScoped => SubtopicScheme::PathScoped,
        }
    }
}

impl fmt::Display for SubtopicScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtopicScheme::PathScoped => f.write_str("path-scoped"),
            SubtopicScheme::QueryScoped => f.write_str("query-scoped"),
        }
    }
}

/// Backend holding the catalog. Failures surface as
/// [`BridgeError::ServiceUnavailable`](crate::BridgeError::ServiceUnavailable).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_professions(&self) -> Result<Vec<Profession>>;

    async fn list_topics(&self) -> Result<Vec<Topic>>;

    /// Subtopics whose owning topic is `topic_id`, addressed with `scheme`.
    async fn list_subtopics(&self, topic_id: TopicId, scheme: SubtopicScheme) -> Result<Vec<Subtopic>>;
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for std::sync::Arc<T> {
    async fn list_professions(&self) -> Result<Vec<Profession>> {
        (**self).list_professions().await
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        (**self).list_topics().await
    }

    async fn list_subtopics(&self, topic_id: TopicId, scheme: SubtopicScheme) -> Result<Vec<Subtopic>> {
        (**self).list_subtopics(topic_id, scheme).await
    }
}

/// Catalog front door with the subtopic scheme fallback.
///
/// A failed subtopic lookup is retried exactly once with the alternate
/// scheme; if that also fails the second error is returned.
pub struct CatalogReader<S> {
    source: S,
    primary: SubtopicScheme,
}

impl<S: CatalogSource> CatalogReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            primary: SubtopicScheme::PathScoped,
        }
    }

    pub fn with_primary_scheme(mut self, scheme: SubtopicScheme) -> Self {
        self.primary = scheme;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn list_professions(&self) -> Result<Vec<Profession>> {
        self.source.list_professions().await
    }

    pub async fn list_topics(&self) -> Result<Vec<Topic>> {
        self.source.list_topics().await
    }

    pub async fn list_subtopics(&self, topic_id: TopicId) -> Result<Vec<Subtopic>> {
        match self.source.list_subtopics(topic_id, self.primary).await {
            Ok(subtopics) => Ok(retain_topic(subtopics, topic_id)),
            Err(e) => {
                let fallback = self.primary.alternate();
                warn!(
                    "Subtopic lookup for topic {} via {} scheme failed ({}), retrying via {}",
                    topic_id, self.primary, e, fallback
                );
                let subtopics = self.source.list_subtopics(topic_id, fallback).await?;
                debug!("Fallback {} lookup for topic {} succeeded", fallback, topic_id);
                Ok(retain_topic(subtopics, topic_id))
            }
        }
    }
}

// Guards against backends that ignore the topic filter.
fn retain_topic(mut subtopics: Vec<Subtopic>, topic_id: TopicId) -> Vec<Subtopic> {
    subtopics.retain(|s| s.topic_id == topic_id);
    subtopics
}
