mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use conceptbridge::{config, serve, BridgeConfig};
use conceptbridge_client::BridgeClient;
use conceptbridge_core::CatalogReader;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn catalog_reader(config: &BridgeConfig) -> Result<CatalogReader<BridgeClient>> {
    let client = BridgeClient::with_timeout(&config.client.api_url, config.client.timeout())?;
    Ok(CatalogReader::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config: config_path,
        api,
        command,
    } = Cli::parse();

    // Client commands print their own output; keep library logs quiet there.
    init_tracing(match command {
        Commands::Serve => "info",
        _ => "warn",
    });

    if let Commands::Config(cmd) = command {
        return cli::config_cmd::run(cmd, &config_path).await;
    }

    let mut config = BridgeConfig::resolve(&config_path)?;
    if let Some(api) = api {
        config.client.api_url = api;
    }

    match command {
        Commands::Serve => serve::run(config).await,
        Commands::Health => cli::catalog::health(catalog_reader(&config)?.source()).await,
        Commands::Professions(args) => cli::catalog::professions(&catalog_reader(&config)?, args).await,
        Commands::Topics(args) => cli::catalog::topics(&catalog_reader(&config)?, args).await,
        Commands::Subtopics(args) => cli::catalog::subtopics(&catalog_reader(&config)?, args).await,
        Commands::Explain(args) => cli::explain::run(args, &catalog_reader(&config)?, &config).await,
        Commands::Wizard => cli::wizard::run(&catalog_reader(&config)?, &config).await,
        Commands::Config(_) => Ok(()),
    }
}
