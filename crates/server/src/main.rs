use anyhow::Context;
use lektion_server::{AppState, ServerConfig, app};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "lektion_server=info,lektion_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    let state = AppState::new(&config).context("Failed to build lesson service")?;

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, model = %config.service.lesson.model, "listening");

    axum::serve(listener, app(state)).await.context("Server error")?;
    Ok(())
}
