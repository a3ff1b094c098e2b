use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use docs_assistant::core::config::Settings;
use docs_assistant::core::logging;
use docs_assistant::server;
use docs_assistant::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    logging::init(settings.log_dir.as_deref());

    if let Err(err) = settings.credentials() {
        tracing::warn!("{}; queries will fail until it is set", err);
    }

    let bind_addr = settings.bind_addr();
    let state = AppState::initialize(settings)?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
