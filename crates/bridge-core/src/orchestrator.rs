//! Selection state and the generate cycle for one user session.
//!
//! ```text
//!  Idle ──select_profession──▶ Selecting ──begin_generation──▶ Generating
//!                                 ▲                               │
//!                                 │ any edit             finish_generation
//!                                 │                               ▼
//!                                 └──────────────────────  Result | Failed
//! ```
//!
//! The orchestrator is owned by a single writer (`&mut self` everywhere), so
//! there is never more than one generation in flight. Subtopic loads are
//! tagged with a [`SubtopicTicket`]; an outcome carrying a superseded ticket
//! is dropped, and so is a generation outcome that arrives after the
//! selection was edited.

use crate::catalog::{CatalogReader, CatalogSource};
use crate::error::{BridgeError, Result};
use crate::generation::{as_generation_failure, GenerationService};
use crate::request::{clamp_creativity, GenerationOptions, GenerationRequest, GenerationResult, TokenBudget};
use crate::types::{Profession, Subtopic, SubtopicId, Topic, TopicId};
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// No profession chosen yet.
    Idle,
    /// Profession chosen; topic / subtopic / custom concept being edited.
    Selecting,
    /// One request is in flight.
    Generating,
    /// Last generation succeeded.
    Result(GenerationResult),
    /// Last generation failed; holds the message shown to the user.
    Failed(String),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Selecting => "selecting",
            Phase::Generating => "generating",
            Phase::Result(_) => "result",
            Phase::Failed(_) => "failed",
        }
    }
}

/// Identifies one topic selection. Only the newest ticket may populate the
/// subtopic list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtopicTicket {
    pub topic_id: TopicId,
    epoch: u64,
}

pub struct Orchestrator {
    budget: TokenBudget,
    phase: Phase,
    profession: Option<Profession>,
    topic: Option<Topic>,
    subtopics: Vec<Subtopic>,
    selected_subtopic: Option<Subtopic>,
    custom_concept: String,
    options: GenerationOptions,
    topic_epoch: u64,
    subtopics_loading: bool,
    catalog_error: Option<String>,
    // Bumped by every edit; an in-flight outcome is kept only if it still matches.
    edit_epoch: u64,
    in_flight_epoch: u64,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(TokenBudget::default())
    }
}

impl Orchestrator {
    pub fn new(budget: TokenBudget) -> Self {
        Self {
            budget,
            phase: Phase::Idle,
            profession: None,
            topic: None,
            subtopics: Vec::new(),
            selected_subtopic: None,
            custom_concept: String::new(),
            options: GenerationOptions::default(),
            topic_epoch: 0,
            subtopics_loading: false,
            catalog_error: None,
            edit_epoch: 0,
            in_flight_epoch: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn profession(&self) -> Option<&Profession> {
        self.profession.as_ref()
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn subtopics(&self) -> &[Subtopic] {
        &self.subtopics
    }

    pub fn selected_subtopic(&self) -> Option<&Subtopic> {
        self.selected_subtopic.as_ref()
    }

    pub fn custom_concept(&self) -> &str {
        &self.custom_concept
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn budget(&self) -> &TokenBudget {
        &self.budget
    }

    pub fn subtopics_loading(&self) -> bool {
        self.subtopics_loading
    }

    /// Message from the last failed subtopic load for the current topic.
    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match &self.phase {
            Phase::Result(r) => Some(r),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.phase, Phase::Generating)
    }

    // Any edit drops a shown result or error. An in-flight request keeps
    // the Generating phase until it finishes, but its outcome goes stale.
    fn touch(&mut self) {
        self.edit_epoch += 1;
        if self.is_generating() {
            return;
        }
        self.phase = if self.profession.is_some() {
            Phase::Selecting
        } else {
            Phase::Idle
        };
    }

    pub fn select_profession(&mut self, profession: Profession) {
        debug!("Profession selected: {}", profession.name);
        self.profession = Some(profession);
        self.touch();
    }

    /// Select a topic. Clears the subtopic list, the selected subtopic and
    /// any result, and returns the ticket the subtopic load must present.
    pub fn select_topic(&mut self, topic: Topic) -> SubtopicTicket {
        self.topic_epoch += 1;
        debug!("Topic selected: {} (epoch {})", topic.name, self.topic_epoch);
        let ticket = SubtopicTicket {
            topic_id: topic.id,
            epoch: self.topic_epoch,
        };
        self.topic = Some(topic);
        self.subtopics.clear();
        self.selected_subtopic = None;
        self.catalog_error = None;
        self.subtopics_loading = true;
        self.touch();
        ticket
    }

    /// Apply a subtopic load outcome. Returns `false` when the ticket was
    /// superseded by a newer topic selection and the outcome was dropped.
    pub fn apply_subtopics(&mut self, ticket: SubtopicTicket, outcome: Result<Vec<Subtopic>>) -> bool {
        if ticket.epoch != self.topic_epoch {
            debug!(
                "Discarding stale subtopic load for topic {} (epoch {}, current {})",
                ticket.topic_id, ticket.epoch, self.topic_epoch
            );
            return false;
        }

        self.subtopics_loading = false;
        match outcome {
            Ok(mut subtopics) => {
                subtopics.retain(|s| s.topic_id == ticket.topic_id);
                self.subtopics = subtopics;
                self.catalog_error = None;
            }
            Err(e) => {
                warn!("Subtopic load for topic {} failed: {}", ticket.topic_id, e);
                self.subtopics.clear();
                self.catalog_error = Some(e.message().to_string());
            }
        }
        true
    }

    /// Select `topic` and load its subtopics through `reader`.
    pub async fn load_subtopics<S: CatalogSource>(
        &mut self,
        reader: &CatalogReader<S>,
        topic: Topic,
    ) -> Result<()> {
        let topic_id = topic.id;
        let ticket = self.select_topic(topic);
        let outcome = reader.list_subtopics(topic_id).await;
        let err = outcome.as_ref().err().cloned();
        self.apply_subtopics(ticket, outcome);
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn select_subtopic(&mut self, id: SubtopicId) -> Result<()> {
        let subtopic = self
            .subtopics
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(format!("subtopic {} is not in the current list", id)))?;
        self.selected_subtopic = Some(subtopic);
        self.touch();
        Ok(())
    }

    pub fn clear_subtopic(&mut self) {
        self.selected_subtopic = None;
        self.touch();
    }

    /// Free-text concept. A non-blank value overrides the subtopic.
    pub fn set_custom_concept(&mut self, concept: impl Into<String>) {
        self.custom_concept = concept.into();
        self.touch();
    }

    pub fn set_options(&mut self, mut options: GenerationOptions) {
        options.creativity_level = clamp_creativity(options.creativity_level as i64);
        self.options = options;
        self.touch();
    }

    /// Leave a Result or Failed phase without changing the selection.
    pub fn reopen(&mut self) {
        self.touch();
    }

    /// Custom concept if non-blank, else the selected subtopic's name.
    pub fn resolved_concept(&self) -> Option<&str> {
        let custom = self.custom_concept.trim();
        if !custom.is_empty() {
            return Some(custom);
        }
        self.selected_subtopic.as_ref().map(|s| s.name.as_str())
    }

    pub fn is_ready(&self) -> bool {
        self.profession.is_some() && self.resolved_concept().is_some() && !self.is_generating()
    }

    /// Enter `Generating` and return the request to send, or `None` (and
    /// change nothing) when the selection is not ready.
    pub fn begin_generation(&mut self) -> Option<GenerationRequest> {
        if !self.is_ready() {
            debug!("Generate ignored: selection not ready (phase {})", self.phase.name());
            return None;
        }
        let profession = self.profession.as_ref()?.name.clone();
        let concept = self.resolved_concept()?.to_string();
        let request = GenerationRequest::new(profession, concept, &self.options, &self.budget);
        self.in_flight_epoch = self.edit_epoch;
        self.phase = Phase::Generating;
        Some(request)
    }

    /// Record the outcome of the in-flight request. Returns `false` when the
    /// outcome was dropped because the selection changed after it was sent.
    pub fn finish_generation(&mut self, outcome: Result<GenerationResult>) -> bool {
        if !self.is_generating() {
            warn!("Generation outcome arrived while {}; ignoring", self.phase.name());
            return false;
        }
        if self.in_flight_epoch != self.edit_epoch {
            debug!("Discarding generation outcome for a superseded selection");
            self.phase = Phase::Idle;
            self.touch();
            return false;
        }
        self.phase = match outcome {
            Ok(result) => {
                info!("Analogy ready: {}", result.analogy_title);
                Phase::Result(result)
            }
            Err(e) => Phase::Failed(e.message().to_string()),
        };
        true
    }

    /// Begin, call `service`, finish. Returns `false` if nothing was sent.
    pub async fn generate_with<G>(&mut self, service: &G) -> bool
    where
        G: GenerationService + ?Sized,
    {
        let Some(request) = self.begin_generation() else {
            return false;
        };
        let outcome = service.generate(&request).await.map_err(as_generation_failure);
        self.finish_generation(outcome);
        true
    }
}
