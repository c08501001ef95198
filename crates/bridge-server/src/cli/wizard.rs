use crate::cli::explain::render;
use crate::config::BridgeConfig;
use anyhow::Result;
use conceptbridge_client::BridgeClient;
use conceptbridge_core::{
    CatalogReader, GenerationOptions, Orchestrator, Phase, Profession, TargetLength, Timeline,
    TimelineEntry, Topic, MAX_CREATIVITY, MIN_CREATIVITY,
};
use inquire::{CustomType, InquireError, Select, Text};

const GENERATE: &str = "✨ Generate analogy";
const PROFESSION: &str = "Change profession";
const TOPIC: &str = "Change topic";
const SUBTOPIC: &str = "Choose subtopic";
const CONCEPT: &str = "Type a custom concept";
const OPTIONS: &str = "Adjust creativity / length / context";
const TIMELINE: &str = "View timeline";
const QUIT: &str = "Quit";

/// Esc and Ctrl-C both back out of the current prompt.
fn cancelled(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

pub async fn run(reader: &CatalogReader<BridgeClient>, config: &BridgeConfig) -> Result<()> {
    println!("\nWelcome to ConceptBridge. Learn anything through the lens of what you already know.\n");

    let (professions, topics) =
        futures::try_join!(reader.list_professions(), reader.list_topics()).map_err(|e| {
            anyhow::anyhow!("Could not load the catalog from {}: {}", reader.source().base_url(), e)
        })?;
    if professions.is_empty() {
        anyhow::bail!("The server has no professions to choose from");
    }

    let mut session = Orchestrator::new(config.budget);
    let mut timeline = Timeline::new(config.timeline.capacity);

    choose_profession(&mut session, &professions)?;
    if !topics.is_empty() {
        choose_topic(&mut session, reader, &topics).await?;
    }

    loop {
        print_summary(&session);

        let mut actions = Vec::new();
        if session.is_ready() {
            actions.push(GENERATE);
        }
        actions.extend([PROFESSION, TOPIC]);
        if !session.subtopics().is_empty() {
            actions.push(SUBTOPIC);
        }
        actions.extend([CONCEPT, OPTIONS, TIMELINE, QUIT]);

        let action = match Select::new("What next?", actions).prompt() {
            Ok(action) => action,
            Err(e) if cancelled(&e) => QUIT,
            Err(e) => return Err(e.into()),
        };

        match action {
            GENERATE => generate(&mut session, reader, &mut timeline).await,
            PROFESSION => choose_profession(&mut session, &professions)?,
            TOPIC => choose_topic(&mut session, reader, &topics).await?,
            SUBTOPIC => choose_subtopic(&mut session)?,
            CONCEPT => enter_concept(&mut session)?,
            OPTIONS => adjust_options(&mut session)?,
            TIMELINE => print_timeline(&timeline),
            _ => break,
        }
    }

    println!("Goodbye! {} analogies this session.", timeline.len());
    Ok(())
}

fn profession_label(profession: &Profession) -> String {
    match &profession.description {
        Some(d) => format!("{}: {}", profession.name, d),
        None => profession.name.clone(),
    }
}

fn choose_profession(session: &mut Orchestrator, professions: &[Profession]) -> Result<()> {
    let labels: Vec<String> = professions.iter().map(profession_label).collect();

    match Select::new("Which profession do you know best?", labels).raw_prompt() {
        Ok(choice) => {
            session.select_profession(professions[choice.index].clone());
            Ok(())
        }
        Err(e) if cancelled(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn choose_topic(
    session: &mut Orchestrator,
    reader: &CatalogReader<BridgeClient>,
    topics: &[Topic],
) -> Result<()> {
    if topics.is_empty() {
        println!("No topics available.");
        return Ok(());
    }
    let labels: Vec<String> = topics
        .iter()
        .map(|t| format!("{} {}", t.icon.as_deref().unwrap_or("•"), t.name))
        .collect();

    let choice = match Select::new("What do you want to learn about?", labels).raw_prompt() {
        Ok(choice) => choice,
        Err(e) if cancelled(&e) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let topic = topics[choice.index].clone();
    println!("Loading subtopics of {}...", topic.name);
    if let Err(e) = session.load_subtopics(reader, topic).await {
        println!("⚠️  Couldn't load subtopics: {}", e);
        println!("   You can still type a custom concept.");
        return Ok(());
    }
    if session.subtopics().is_empty() {
        println!("This topic has no subtopics yet; type a custom concept instead.");
        return Ok(());
    }
    choose_subtopic(session)
}

fn choose_subtopic(session: &mut Orchestrator) -> Result<()> {
    let subtopics = session.subtopics().to_vec();
    let mut labels: Vec<String> = subtopics
        .iter()
        .map(|s| match s.estimated_time_minutes {
            Some(minutes) => format!("{} ({}, ~{} min)", s.name, s.difficulty_level, minutes),
            None => format!("{} ({})", s.name, s.difficulty_level),
        })
        .collect();
    labels.push("(none)".to_string());

    match Select::new("Pick a subtopic:", labels).raw_prompt() {
        Ok(choice) => match subtopics.get(choice.index) {
            Some(subtopic) => session.select_subtopic(subtopic.id)?,
            None => session.clear_subtopic(),
        },
        Err(e) if cancelled(&e) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn enter_concept(session: &mut Orchestrator) -> Result<()> {
    let current = session.custom_concept().to_string();
    match Text::new("Concept (leave empty to use the subtopic):")
        .with_initial_value(&current)
        .prompt()
    {
        Ok(concept) => session.set_custom_concept(concept.trim()),
        Err(e) if cancelled(&e) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn adjust_options(session: &mut Orchestrator) -> Result<()> {
    let current = session.options().clone();

    let creativity = match CustomType::<i64>::new(&format!(
        "Creativity ({}-{}, higher is more playful):",
        MIN_CREATIVITY, MAX_CREATIVITY
    ))
    .with_default(current.creativity_level as i64)
    .with_error_message("Please type a whole number")
    .prompt()
    {
        Ok(level) => level,
        Err(e) if cancelled(&e) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let start = TargetLength::ALL
        .iter()
        .position(|l| *l == current.target_length)
        .unwrap_or(1);
    let length = match Select::new("Response length:", TargetLength::ALL.to_vec())
        .with_starting_cursor(start)
        .prompt()
    {
        Ok(length) => length,
        Err(e) if cancelled(&e) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let context = match Text::new("Extra context (optional):")
        .with_initial_value(current.context.as_deref().unwrap_or(""))
        .prompt()
    {
        Ok(context) => context,
        Err(e) if cancelled(&e) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    session.set_options(
        GenerationOptions::default()
            .with_creativity(creativity)
            .with_length(length)
            .with_context(context),
    );
    Ok(())
}

async fn generate(
    session: &mut Orchestrator,
    reader: &CatalogReader<BridgeClient>,
    timeline: &mut Timeline,
) {
    let (Some(profession), Some(concept)) = (
        session.profession().map(|p| p.name.clone()),
        session.resolved_concept().map(str::to_string),
    ) else {
        println!("Pick a profession and a subtopic (or type a concept) first.");
        return;
    };

    println!("Thinking about {} like a {}...", concept, profession);
    if !session.generate_with(reader.source()).await {
        println!("Nothing to generate yet.");
        return;
    }

    match session.phase() {
        Phase::Result(result) => {
            print!("{}", render(result));
            timeline.record(TimelineEntry::succeeded(&profession, &concept, &result.analogy_title));
        }
        Phase::Failed(message) => {
            println!("❌ Generation failed: {}", message);
            println!("   Adjust anything, or pick Generate to try again.");
            timeline.record(TimelineEntry::failed(&profession, &concept, message));
        }
        _ => {}
    }
}

fn print_summary(session: &Orchestrator) {
    let options = session.options();
    println!();
    println!(
        "  Profession: {}",
        session.profession().map(|p| p.name.as_str()).unwrap_or("-")
    );
    println!(
        "  Topic:      {}",
        session.topic().map(|t| t.name.as_str()).unwrap_or("-")
    );
    let concept = match (session.custom_concept().trim(), session.selected_subtopic()) {
        ("", Some(subtopic)) => subtopic.name.clone(),
        ("", None) => "-".to_string(),
        (custom, _) => format!("{} (custom)", custom),
    };
    println!("  Concept:    {}", concept);
    println!(
        "  Options:    creativity {}, {} ({} tokens)",
        options.creativity_level,
        options.target_length,
        session.budget().for_length(options.target_length)
    );
    if let Some(error) = session.catalog_error() {
        println!("  ⚠️  {}", error);
    }
    println!();
}

fn print_timeline(timeline: &Timeline) {
    if timeline.is_empty() {
        println!("No analogies yet this session.");
        return;
    }
    println!("{:<8}  {:<12}  {:<24}  {}", "TIME", "PROFESSION", "CONCEPT", "RESULT");
    println!("{}", "─".repeat(80));
    for entry in timeline.iter() {
        let outcome = match (&entry.title, &entry.error) {
            (Some(title), _) => title.clone(),
            (None, Some(error)) => format!("❌ {}", error),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:<8}  {:<12}  {:<24}  {}",
            entry.at.with_timezone(&chrono::Local).format("%H:%M:%S"),
            super::truncate(&entry.profession, 12),
            super::truncate(&entry.concept, 24),
            super::truncate(&outcome, 30)
        );
    }
}
