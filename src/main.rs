use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::{config::ServerConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting chat relay...");

    let config = ServerConfig::from_env();
    let addr = config.socket_addr();
    let state = Arc::new(AppState::with_config(config));
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server has been started on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
