//! Image lookup service binary.
//!
//! Loads configuration (see [`scenery::SceneryConfig::load`]), starts the
//! HTTP service and runs until Ctrl-C.

use scenery::{SceneryConfig, SceneryServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = SceneryConfig::load().map_err(|e| {
        tracing::error!(error = %e, "failed to load config");
        anyhow::anyhow!("scenery-server config: {e}")
    })?;

    tracing::info!(
        max_concurrent_requests = config.search.max_concurrent_requests,
        cache_ttl_seconds = config.search.cache_ttl_seconds,
        cache_capacity = config.search.cache_capacity,
        "scenery-server starting"
    );

    let mut server = SceneryServer::start(&config).await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("shutdown requested");
        }
        result = server.wait() => {
            result?;
            tracing::warn!("server task ended");
        }
    }

    server.shutdown();
    Ok(())
}
