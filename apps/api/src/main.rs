mod config;
mod directory;
mod draw;
mod errors;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::directory::UserDirectory;
use crate::draw::{AssignmentEngine, DrawService, DrawStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting giftdraw v{}", env!("CARGO_PKG_VERSION"));

    // Draw record: created on first load, so a bad path fails here rather than mid-request
    let store = Arc::new(DrawStore::new(&config.draw_state_file));
    let record = store.load()?;
    info!(
        "Draw record at {} (drawn: {})",
        store.path().display(),
        record.done
    );

    let engine = AssignmentEngine::new(config.draw_max_attempts);
    info!("Assignment engine: up to {} attempts", engine.max_attempts());

    let users = UserDirectory::new(&config.users_file);
    info!("Participant directory: {}", users.path().display());

    let state = AppState {
        draws: DrawService::new(store, engine),
        users,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
