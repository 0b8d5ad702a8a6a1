use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use matchbook::api::Api;
use matchbook::config::Config;
use matchbook::{ExpirySweeper, MatchingEngine, TracingListener};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    info!(addr = %config.listen_addr, "starting matchbook server");

    let engine = Arc::new(MatchingEngine::with_listener(Arc::new(TracingListener)));
    let sweeper = ExpirySweeper::start(engine.clone(), config.sweep_interval)?;

    let api = Api::new(config.listen_addr, engine, &config.allowed_origins);
    if let Err(err) = api.serve().await {
        anyhow::bail!("server error: {}", err);
    }

    sweeper.stop();
    info!("server stopped");
    Ok(())
}
