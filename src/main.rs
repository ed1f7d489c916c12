//! Student stress survey server

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stress_survey::{classifier, config, create_router, db, service, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stress_survey=debug,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Stress survey server starting...");

    // The model is required; there is no degraded mode without it
    let (model, model_info) = match classifier::load_model(&config.model_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Cannot start without a model: {}", e);
            return Err(e).with_context(|| {
                format!("failed to load model artifact '{}'", config.model_path.display())
            });
        }
    };

    // Schema problems only disable saving and history
    let store = db::RecordStore::new(config.database_path.clone());
    match store.ensure_schema().await {
        Ok(()) => tracing::info!("Database: {}", store.path().display()),
        Err(e) => tracing::error!("Database unavailable, predictions will not be saved: {}", e),
    }

    let state = AppState {
        service: service::PredictionService::new(model, store),
        config: config.clone(),
        model_info,
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
