use crate::cli::ExplainArgs;
use crate::config::BridgeConfig;
use anyhow::Result;
use conceptbridge_client::BridgeClient;
use conceptbridge_core::{generate, CatalogReader, GenerationOptions, GenerationResult, Subtopic, TopicId};

pub async fn run(args: ExplainArgs, reader: &CatalogReader<BridgeClient>, config: &BridgeConfig) -> Result<()> {
    let concept = match (&args.concept, args.topic, &args.subtopic) {
        (Some(concept), _, _) if !concept.trim().is_empty() => concept.trim().to_string(),
        (_, Some(topic_id), Some(subtopic)) => resolve_subtopic(reader, topic_id, subtopic).await?.name,
        _ => anyhow::bail!("Pass --concept, or --topic together with --subtopic"),
    };

    let mut options = GenerationOptions::default()
        .with_creativity(args.creativity)
        .with_length(args.length);
    if let Some(context) = &args.context {
        options = options.with_context(context.as_str());
    }

    println!(
        "Generating a {} explanation of \"{}\" for {}...",
        options.target_length, concept, args.profession
    );
    let result = generate(reader.source(), &args.profession, &concept, &options, &config.budget).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render(&result));
    }
    Ok(())
}

/// Look a subtopic up by id or (case-insensitive) name.
async fn resolve_subtopic(
    reader: &CatalogReader<BridgeClient>,
    topic_id: TopicId,
    wanted: &str,
) -> Result<Subtopic> {
    let subtopics = reader.list_subtopics(topic_id).await?;
    let wanted = wanted.trim();
    let by_id = wanted.parse::<i64>().ok();
    subtopics
        .into_iter()
        .find(|s| Some(s.id) == by_id || s.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| anyhow::anyhow!("No subtopic '{}' under topic {}", wanted, topic_id))
}

/// Plain-text rendering: title, paragraphs in order, then the numbered lists.
pub fn render(result: &GenerationResult) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("💡 {}\n", result.analogy_title));
    out.push_str(&format!("{}\n\n", "═".repeat(result.analogy_title.chars().count() + 3)));

    for paragraph in result.paragraphs() {
        out.push_str(paragraph);
        out.push_str("\n\n");
    }

    push_list(&mut out, "Practical examples", &result.practical_examples);
    push_list(&mut out, "Key connections", &result.key_connections);
    push_list(&mut out, "Next steps", &result.next_steps);

    let mut footer = format!("{} · {:.2}s", result.profession_context, result.generation_time);
    if let Some(tokens) = result.tokens_allocated {
        footer.push_str(&format!(" · {} tokens", tokens));
    }
    if let Some(length) = result.response_length {
        footer.push_str(&format!(" · {}", length));
    }
    out.push_str(&footer);
    out.push('\n');
    out
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push_str(":\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, item));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use conceptbridge_core::TargetLength;

    fn result() -> GenerationResult {
        GenerationResult {
            concept: "Binary Trees".into(),
            profession_context: "Chef".into(),
            analogy_title: "Trees in the Kitchen".into(),
            explanation: "Para1\n\nPara2".into(),
            practical_examples: vec!["Prep stations".into(), "Recipe cards".into()],
            key_connections: vec![],
            next_steps: vec!["Try a BST".into()],
            generation_time: 1.5,
            tokens_allocated: Some(1200),
            response_length: Some(TargetLength::Medium),
        }
    }

    #[test]
    fn renders_paragraphs_in_order_and_numbers_lists() {
        let text = render(&result());
        let p1 = text.find("Para1").unwrap();
        let p2 = text.find("Para2").unwrap();
        assert!(p1 < p2);
        assert!(text.contains("  1. Prep stations\n  2. Recipe cards\n"));
        assert!(text.contains("Next steps:\n  1. Try a BST"));
        assert!(!text.contains("Key connections"));
        assert!(text.contains("Chef · 1.50s · 1200 tokens · medium"));
    }
}
