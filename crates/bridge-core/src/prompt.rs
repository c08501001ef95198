//! Prompt composition for analogy generation and parsing of the model's reply.
//!
//! Used by the server-side analogy engine. The model is asked for a JSON
//! object; replies that are not JSON are still accepted as a plain
//! explanation.

use crate::request::{GenerationRequest, GenerationResult, TargetLength};
use serde::Deserialize;
use serde_json::Value;

pub const SYSTEM_PROMPT: &str = "You are an expert at creating clear, concise analogies that explain \
technical concepts through a learner's professional background. Always respond in JSON format.";

/// Vocabulary a profession brings to an analogy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfessionHints {
    pub keywords: &'static [&'static str],
    pub metaphors: &'static [&'static str],
    pub examples: &'static [&'static str],
}

const GENERIC_HINTS: ProfessionHints = ProfessionHints {
    keywords: &["processes", "systems", "organization"],
    metaphors: &["structured approaches", "systematic thinking"],
    examples: &["workflow optimization", "systematic problem solving"],
};

const KNOWN_HINTS: &[(&str, ProfessionHints)] = &[
    (
        "cooking",
        ProfessionHints {
            keywords: &["recipe", "ingredients", "cooking process", "kitchen tools", "preparation", "seasoning", "timing"],
            metaphors: &["mixing ingredients", "following recipes", "kitchen workflow", "taste testing", "meal planning"],
            examples: &["preparing a multi-course meal", "organizing a kitchen", "scaling recipes", "ingredient substitution"],
        },
    ),
    (
        "gaming",
        ProfessionHints {
            keywords: &["levels", "progression", "stats", "inventory", "quests", "NPCs", "skill trees", "gameplay"],
            metaphors: &["character builds", "quest completion", "resource management", "level progression", "guild systems"],
            examples: &["RPG character development", "strategy game tactics", "puzzle-solving mechanics", "multiplayer coordination"],
        },
    ),
    (
        "sports",
        ProfessionHints {
            keywords: &["team strategy", "training", "performance", "competition", "tactics", "coaching", "practice"],
            metaphors: &["team formations", "training regimens", "game strategy", "performance metrics", "tournament brackets"],
            examples: &["building a winning team", "developing game strategy", "analyzing player statistics", "tournament preparation"],
        },
    ),
    (
        "music",
        ProfessionHints {
            keywords: &["harmony", "rhythm", "composition", "instruments", "scales", "tempo", "arrangement"],
            metaphors: &["musical composition", "orchestra coordination", "rhythm patterns", "harmonic progressions", "song structure"],
            examples: &["composing a symphony", "arranging instruments", "creating rhythm patterns", "musical improvisation"],
        },
    ),
    (
        "business",
        ProfessionHints {
            keywords: &["organization", "processes", "management", "efficiency", "workflow", "teams", "projects"],
            metaphors: &["company structure", "project management", "resource allocation", "team coordination", "business strategy"],
            examples: &["organizational hierarchy", "project planning", "resource optimization", "team management"],
        },
    ),
];

/// Professions with dedicated hints, lowercase.
pub fn supported_professions() -> Vec<&'static str> {
    KNOWN_HINTS.iter().map(|(name, _)| *name).collect()
}

pub fn hints_for(profession: &str) -> ProfessionHints {
    let key = profession.trim().to_lowercase();
    KNOWN_HINTS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, hints)| *hints)
        .unwrap_or(GENERIC_HINTS)
}

/// Sampling temperature: 0.3 plus 0.1 per creativity step, capped at 1.0.
pub fn temperature(creativity_level: u8) -> f32 {
    (0.3 + creativity_level as f32 * 0.1).min(1.0)
}

fn creativity_guidance(level: u8) -> &'static str {
    match level {
        0..=2 => "Use straightforward, clear analogies.",
        3 => "Balance creativity with clarity.",
        _ => "Be highly creative and use unexpected connections.",
    }
}

fn length_guidance(length: TargetLength) -> &'static str {
    match length {
        TargetLength::Short => "Keep it brief: one or two short paragraphs and two examples.",
        TargetLength::Medium => "Aim for two or three paragraphs and two or three examples.",
        TargetLength::Long => "Go in depth: four or more paragraphs with detailed examples and connections.",
    }
}

pub fn build_user_prompt(request: &GenerationRequest) -> String {
    let hints = hints_for(&request.profession);
    let mut prompt = format!(
        "Explain \"{}\" to someone with a {} background.\n",
        request.concept, request.profession
    );
    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("Context: {}\n", context.trim()));
    }
    prompt.push_str(&format!(
        "\nRelevant keywords: {}\nCommon metaphors: {}\nFamiliar examples: {}\n",
        hints.keywords.join(", "),
        hints.metaphors.join(", "),
        hints.examples.join(", ")
    ));
    prompt.push_str(&format!(
        "\nCreativity level: {}/5. {}\n{}\n",
        request.creativity_level,
        creativity_guidance(request.creativity_level),
        length_guidance(request.response_length)
    ));
    prompt.push_str(&format!(
        "\nMake it memorable. Use {} terminology and examples. Separate paragraphs with a blank line.\n\
         Format as JSON with: title, explanation, practical_examples, key_connections, next_steps",
        request.profession
    ));
    prompt
}

/// Parsed content of one analogy, before timing metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogyContent {
    pub title: String,
    pub explanation: String,
    pub practical_examples: Vec<String>,
    pub key_connections: Vec<String>,
    pub next_steps: Vec<String>,
}

impl AnalogyContent {
    pub fn into_result(self, request: &GenerationRequest, generation_time: f64) -> GenerationResult {
        GenerationResult {
            concept: request.concept.clone(),
            profession_context: request.profession.clone(),
            analogy_title: self.title,
            explanation: self.explanation,
            practical_examples: self.practical_examples,
            key_connections: self.key_connections,
            next_steps: self.next_steps,
            generation_time,
            tokens_allocated: Some(request.max_tokens),
            response_length: Some(request.response_length),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalogy {
    title: Option<String>,
    explanation: Option<String>,
    practical_examples: Vec<Value>,
    examples: Vec<Value>,
    key_connections: Vec<Value>,
    next_steps: Vec<Value>,
}

// Lists may hold plain strings or `{title, description}` objects.
fn flatten_items(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(map) => {
                let title = map.get("title").and_then(Value::as_str);
                let desc = map.get("description").and_then(Value::as_str);
                match (title, desc) {
                    (Some(t), Some(d)) => Some(format!("{}: {}", t, d)),
                    (Some(t), None) => Some(t.to_string()),
                    (None, Some(d)) => Some(d.to_string()),
                    (None, None) => None,
                }
            }
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Turn the model's reply into an [`AnalogyContent`].
pub fn parse_model_output(content: &str, concept: &str) -> AnalogyContent {
    let body = strip_code_fence(content);
    if body.starts_with('{') {
        if let Ok(raw) = serde_json::from_str::<RawAnalogy>(body) {
            let mut practical = flatten_items(raw.practical_examples);
            if practical.is_empty() {
                practical = flatten_items(raw.examples);
            }
            return AnalogyContent {
                title: raw
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| format!("Understanding {}", concept)),
                explanation: raw.explanation.unwrap_or_default(),
                practical_examples: practical,
                key_connections: flatten_items(raw.key_connections),
                next_steps: flatten_items(raw.next_steps),
            };
        }
        log::warn!("Model reply looked like JSON but did not parse; using it as plain text");
    }

    AnalogyContent {
        title: "Quick Explanation".to_string(),
        explanation: content.trim().to_string(),
        practical_examples: Vec::new(),
        key_connections: Vec::new(),
        next_steps: Vec::new(),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Template analogy used when the model cannot be reached.
pub fn fallback_content(request: &GenerationRequest) -> AnalogyContent {
    let hints = hints_for(&request.profession);
    let profession = request.profession.trim();
    let concept = request.concept.trim();
    let keywords = hints.keywords.iter().take(3).copied().collect::<Vec<_>>().join(", ");
    let example = hints.examples.first().copied().unwrap_or("a structured process");

    let explanation = format!(
        "Let me explain {concept} using concepts from {profession} that you're familiar with.\n\n\
         In {profession}, you probably work with {keywords}. {concept} works in a similar way: \
         it's about organizing and managing information systematically.\n\n\
         Think of it like {example}, where you need to understand the components involved, \
         follow a systematic approach, and reach a specific outcome efficiently."
    );

    AnalogyContent {
        title: format!("Understanding {} Through {}", concept, title_case(profession)),
        explanation,
        practical_examples: vec![format!("Example from {}", profession)],
        key_connections: vec![format!("Connection to {}", profession)],
        next_steps: vec!["Practice with examples".to_string(), "Apply to real scenarios".to_string()],
    }
}
