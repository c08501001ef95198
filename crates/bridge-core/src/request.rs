//! Generation request/response model and the token budget policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_CREATIVITY: u8 = 1;
pub const MAX_CREATIVITY: u8 = 5;
pub const DEFAULT_CREATIVITY: u8 = 3;

/// Coarse response size selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl TargetLength {
    pub const ALL: [TargetLength; 3] = [TargetLength::Short, TargetLength::Medium, TargetLength::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLength::Short => "short",
            TargetLength::Medium => "medium",
            TargetLength::Long => "long",
        }
    }
}

impl fmt::Display for TargetLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetLength {
    type Err = crate::BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(TargetLength::Short),
            "medium" => Ok(TargetLength::Medium),
            "long" => Ok(TargetLength::Long),
            other => Err(crate::BridgeError::Validation(format!(
                "target length must be short, medium or long (got '{}')",
                other
            ))),
        }
    }
}

/// Maps a [`TargetLength`] to the `max_tokens` sent upstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenBudget {
    pub short: u32,
    pub medium: u32,
    pub long: u32,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            short: 600,
            medium: 1200,
            long: 2000,
        }
    }
}

impl TokenBudget {
    pub fn for_length(&self, length: TargetLength) -> u32 {
        match length {
            TargetLength::Short => self.short,
            TargetLength::Medium => self.medium,
            TargetLength::Long => self.long,
        }
    }
}

/// Clamp any integer into the accepted creativity range.
pub fn clamp_creativity(level: i64) -> u8 {
    level.clamp(MIN_CREATIVITY as i64, MAX_CREATIVITY as i64) as u8
}

/// User-tunable knobs for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub creativity_level: u8,
    pub target_length: TargetLength,
    /// Free-text context forwarded with the concept.
    pub context: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            creativity_level: DEFAULT_CREATIVITY,
            target_length: TargetLength::default(),
            context: None,
        }
    }
}

impl GenerationOptions {
    pub fn with_creativity(mut self, level: i64) -> Self {
        self.creativity_level = clamp_creativity(level);
        self
    }

    pub fn with_length(mut self, length: TargetLength) -> Self {
        self.target_length = length;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.trim().is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }
}

fn default_creativity() -> u8 {
    DEFAULT_CREATIVITY
}

fn default_max_tokens() -> u32 {
    TokenBudget::default().medium
}

/// Body of a quick-explain call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub profession: String,
    pub concept: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default = "default_creativity")]
    pub creativity_level: u8,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub response_length: TargetLength,
}

impl GenerationRequest {
    /// Build a request, clamping creativity and deriving the token budget.
    pub fn new(
        profession: impl Into<String>,
        concept: impl Into<String>,
        options: &GenerationOptions,
        budget: &TokenBudget,
    ) -> Self {
        Self {
            profession: profession.into(),
            concept: concept.into(),
            context: options.context.clone(),
            creativity_level: clamp_creativity(options.creativity_level as i64),
            max_tokens: budget.for_length(options.target_length),
            response_length: options.target_length,
        }
    }
}

/// Structured analogy returned by the generation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub concept: String,
    pub profession_context: String,
    pub analogy_title: String,
    pub explanation: String,
    #[serde(default)]
    pub practical_examples: Vec<String>,
    #[serde(default)]
    pub key_connections: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    /// Seconds spent generating.
    pub generation_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_allocated: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_length: Option<TargetLength>,
}

impl GenerationResult {
    /// Explanation split on blank lines, trimmed, empties dropped, order kept.
    pub fn paragraphs(&self) -> Vec<&str> {
        split_paragraphs(&self.explanation)
    }
}

pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut blank_run = false;

    for line in text.split_inclusive('\n') {
        let is_blank = line.trim().is_empty();
        if is_blank && !blank_run {
            let para = text[start..offset].trim();
            if !para.is_empty() {
                out.push(para);
            }
        }
        if !is_blank && blank_run {
            start = offset;
        }
        blank_run = is_blank;
        offset += line.len();
    }

    if !blank_run {
        let para = text[start..].trim();
        if !para.is_empty() {
            out.push(para);
        }
    }
    out
}
