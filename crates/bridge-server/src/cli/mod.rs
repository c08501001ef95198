pub mod catalog;
pub mod config_cmd;
pub mod explain;
pub mod wizard;

use clap::{Args, Parser, Subcommand};
use conceptbridge_core::{TargetLength, TopicId, DEFAULT_CREATIVITY};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "conceptbridge")]
#[command(version, about = "Learn new concepts through analogies from your own profession")]
pub struct Cli {
    /// Path to conceptbridge.toml
    #[arg(
        long,
        global = true,
        env = "CONCEPTBRIDGE_CONFIG",
        default_value = "conceptbridge.toml"
    )]
    pub config: PathBuf,

    /// ConceptBridge API root for client commands (overrides [client] api_url)
    #[arg(long, global = true, env = "CONCEPTBRIDGE_API")]
    pub api: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Check the server's health endpoint
    Health,
    /// List professions
    Professions(ListArgs),
    /// List topics
    Topics(ListArgs),
    /// List the subtopics of a topic
    Subtopics(SubtopicsArgs),
    /// Generate one analogy
    Explain(ExplainArgs),
    /// Interactive profession → topic → subtopic → analogy flow
    Wizard,
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format: table (default) | json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct SubtopicsArgs {
    pub topic_id: TopicId,
    /// Output format: table (default) | json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Profession to draw the analogy from, e.g. "Cooking"
    #[arg(long)]
    pub profession: String,
    /// Free-text concept. Takes precedence over --topic/--subtopic.
    #[arg(long)]
    pub concept: Option<String>,
    /// Topic id, used with --subtopic
    #[arg(long, requires = "subtopic")]
    pub topic: Option<TopicId>,
    /// Subtopic id or name within --topic
    #[arg(long, requires = "topic")]
    pub subtopic: Option<String>,
    /// Extra context for the explanation
    #[arg(long)]
    pub context: Option<String>,
    /// Creativity level 1-5 (out-of-range values are clamped)
    #[arg(long, default_value_t = DEFAULT_CREATIVITY as i64, allow_negative_numbers = true)]
    pub creativity: i64,
    /// Response length: short | medium | long
    #[arg(long, default_value = "medium")]
    pub length: TargetLength,
    /// Output format: text (default) | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate conceptbridge.toml
    Validate,
    /// Print the effective configuration
    Show,
}

/// Truncate to `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
