use crate::config::BridgeConfig;
use crate::engine::{AnalogyEngine, OpenAiChat};
use crate::http::{create_router, AppState};
use crate::store::SeedCatalog;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the application state described by `config`.
pub fn build_state(config: &BridgeConfig) -> anyhow::Result<AppState> {
    let catalog = match &config.server.seed_path {
        Some(path) => {
            info!("Loading seed catalog from {}", path.display());
            SeedCatalog::from_path(path)?
        }
        None => SeedCatalog::builtin()?,
    };
    let (professions, topics, subtopics) = catalog.counts();
    info!(
        "Catalog loaded: {} professions, {} topics, {} subtopics",
        professions, topics, subtopics
    );

    let generation = &config.generation;
    let api_key = generation.resolved_api_key();
    if api_key.is_none() {
        warn!(
            "No API key found (set {} or [generation] api_key); upstream calls may be rejected",
            generation.api_key_env
        );
    }
    let backend = OpenAiChat::new(
        &generation.base_url,
        &generation.model,
        api_key,
        generation.timeout(),
    )?;
    info!("Analogy model: {} via {}", generation.model, generation.base_url);
    if generation.fallback {
        info!("Template fallback: enabled");
    }
    let engine = AnalogyEngine::new(Arc::new(backend)).with_fallback(generation.fallback);

    Ok(AppState::new(catalog, engine))
}

pub async fn run(config: BridgeConfig) -> anyhow::Result<()> {
    info!("Starting ConceptBridge server v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.listen_addr()?;
    let app = create_router(build_state(&config)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, terminating...");
}
