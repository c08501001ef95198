use crate::cli::{truncate, ListArgs, SubtopicsArgs};
use anyhow::Result;
use conceptbridge_client::BridgeClient;
use conceptbridge_core::{CatalogReader, Profession, Subtopic, Topic};

pub async fn health(client: &BridgeClient) -> Result<()> {
    match client.health().await {
        Ok(report) if report.is_healthy() => {
            println!("✅ {} is healthy: {}", client.base_url(), report.message);
            Ok(())
        }
        Ok(report) => {
            println!(
                "⚠️  {} is degraded (status: {}): {}",
                client.base_url(),
                report.status,
                report.message
            );
            std::process::exit(1);
        }
        Err(e) => {
            println!("❌ {} is unreachable: {}", client.base_url(), e);
            std::process::exit(1);
        }
    }
}

pub async fn professions(reader: &CatalogReader<BridgeClient>, args: ListArgs) -> Result<()> {
    let professions = reader.list_professions().await?;
    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&professions)?);
    } else {
        print_professions(&professions);
    }
    Ok(())
}

pub async fn topics(reader: &CatalogReader<BridgeClient>, args: ListArgs) -> Result<()> {
    let topics = reader.list_topics().await?;
    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&topics)?);
    } else {
        print_topics(&topics);
    }
    Ok(())
}

pub async fn subtopics(reader: &CatalogReader<BridgeClient>, args: SubtopicsArgs) -> Result<()> {
    let subtopics = reader.list_subtopics(args.topic_id).await?;
    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&subtopics)?);
    } else if subtopics.is_empty() {
        println!("No subtopics for topic {}.", args.topic_id);
    } else {
        print_subtopics(&subtopics);
    }
    Ok(())
}

fn print_professions(professions: &[Profession]) {
    println!("{:>4}  {:<16}  {}", "ID", "NAME", "DESCRIPTION");
    println!("{}", "─".repeat(80));
    for p in professions {
        println!(
            "{:>4}  {:<16}  {}",
            p.id,
            truncate(&p.name, 16),
            truncate(p.description.as_deref().unwrap_or(""), 56)
        );
    }
}

fn print_topics(topics: &[Topic]) {
    println!("{:>4}  {:<2}  {:<24}  {}", "ID", "", "NAME", "DESCRIPTION");
    println!("{}", "─".repeat(80));
    for t in topics {
        println!(
            "{:>4}  {:<2}  {:<24}  {}",
            t.id,
            t.icon.as_deref().unwrap_or(""),
            truncate(&t.name, 24),
            truncate(t.description.as_deref().unwrap_or(""), 44)
        );
    }
}

fn print_subtopics(subtopics: &[Subtopic]) {
    println!("{:>4}  {:<28}  {:<12}  {:>6}", "ID", "NAME", "DIFFICULTY", "MIN");
    println!("{}", "─".repeat(60));
    for s in subtopics {
        let minutes = s
            .estimated_time_minutes
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4}  {:<28}  {:<12}  {:>6}",
            s.id,
            truncate(&s.name, 28),
            s.difficulty_level.as_str(),
            minutes
        );
    }
}
