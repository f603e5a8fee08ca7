//! Process boundary — bind a listener and serve the dashboard.

use tracing::info;

use crate::app::App;
use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(#[from] std::io::Error),
}

/// Serve `app` until the process is stopped.
///
/// The app is moved in; its tree and callbacks are fixed from here on.
///
/// # Errors
///
/// Returns `Bind` if the address is unavailable and `Serve` if the accept
/// loop fails.
pub async fn start(app: App, config: &ServerConfig) -> Result<(), ServerError> {
    let state = AppState::new(app, config.debug);
    let router = routes::app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;

    info!(%addr, debug = config.debug, "dashboard listening");
    axum::serve(listener, router).await?;
    Ok(())
}
