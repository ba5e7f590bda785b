use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod session;
mod state;
mod store;
mod web;

use crate::config::load_settings;
use crate::error::Result as AppResult;
use crate::state::AppState;
use crate::store::QuestionStore;
use crate::web::run_server;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,tower_http=debug", env!("CARGO_PKG_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load Configuration
    let app_settings = load_settings()?;
    tracing::info!(
        server.port = app_settings.server.port,
        store.table = %app_settings.store.question_table,
        storage.bucket = %app_settings.storage.bucket,
        "Configuration loaded"
    );

    // Initialize the question store client
    let store = Arc::new(QuestionStore::new(
        app_settings.store.clone(),
        app_settings.storage.clone(),
    )?);
    tracing::info!("Question store client initialized");

    // Create AppState
    let app_state = AppState { store };

    // Run the web server
    run_server(app_state, app_settings.server).await?;

    Ok(())
}
