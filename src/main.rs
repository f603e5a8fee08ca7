use dashboard::{config, demo, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing .env is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let config = config::ServerConfig::from_env()?;

    let default_level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = demo::app()?;
    let engine = app.engine();
    tracing::info!(
        nodes = app.tree().node_count(),
        bindings = engine.registry().len(),
        callbacks = engine.graph().len(),
        "dashboard built"
    );
    if engine.graph().is_empty() || engine.registry().is_empty() {
        tracing::warn!("dashboard has nothing to react to");
    }

    server::start(app, &config).await?;
    Ok(())
}
