use crate::cli::ConfigCommands;
use crate::config::BridgeConfig;
use anyhow::Result;
use std::path::Path;

pub async fn run(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(config_path),
        ConfigCommands::Show => show(config_path),
    }
}

fn validate(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        println!("ℹ️  {} not found; checking built-in defaults.", config_path.display());
    }
    let config = BridgeConfig::resolve(config_path)
        .map_err(|e| anyhow::anyhow!("{} does not parse: {}", config_path.display(), e))?;

    let problems = config.validate();
    if !problems.is_empty() {
        eprintln!("❌ {} has {} problem(s):", config_path.display(), problems.len());
        for problem in &problems {
            eprintln!("  - {}", problem);
        }
        anyhow::bail!("invalid configuration");
    }
    println!("✅ {} is valid.", config_path.display());
    Ok(())
}

fn show(config_path: &Path) -> Result<()> {
    let mut config = BridgeConfig::resolve(config_path)?;
    if config.generation.api_key.is_some() {
        config.generation.api_key = Some("********".to_string());
    }
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
    println!("{}", rendered);
    Ok(())
}
