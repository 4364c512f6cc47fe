//! Stardust Stories API server entry point.

use std::sync::Arc;

use stardust_api::config::{AppConfig, SpeechBackendKind};
use stardust_api::error::AppError;
use stardust_api::state::AppState;
use stardust_core::clock::SystemClock;
use stardust_narration::domain::backend::SpeechBackend;
use stardust_playback::application::registry::SessionRegistry;
use stardust_speech::{EspeakBackend, SilentBackend};
use stardust_story::application::catalog::StoryCatalog;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Stardust Stories API server");

    let config = AppConfig::from_env()?;

    let mut catalog = StoryCatalog::with_demo();
    if let Some(dir) = &config.story_dir {
        let loaded = catalog.load_dir(dir).await?;
        tracing::info!(dir = %dir.display(), loaded, "story directory loaded");
    }

    let backend: Arc<dyn SpeechBackend> = match config.speech_backend {
        SpeechBackendKind::Espeak => Arc::new(EspeakBackend::new(config.espeak_program.clone())),
        SpeechBackendKind::Silent => Arc::new(SilentBackend),
    };
    let sessions = SessionRegistry::new(backend, Arc::new(SystemClock), config.playback());
    let app_state = AppState::new(catalog, sessions);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = stardust_api::build_router(app_state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.addr()?;
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app_state.sessions.shutdown_all().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
