//! Visual Anomaly Detection Gateway
//!
//! HTTP front end for a hosted visual-anomaly-detection model. Uploaded
//! images are normalized to a canonical resolution, submitted for
//! inference, and - when the model returns a pixel anomaly mask - the
//! mask is blended over the original and published to object storage as
//! a viewable overlay artifact.
//!
//! ```text
//! upload ──▶ normalize ──▶ detect ──▶ composite ──▶ publish ──▶ response
//!              (resize)    (remote)    (overlay)      (S3)       (JSON)
//! ```

mod clients;
mod config;
mod error;
mod handlers;
mod models;
mod pipeline;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use clients::{DetectionClient, StorageClient};

/// Uploads can be full-resolution photographs; allow up to 32 MiB.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "anomaly_gateway=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Anomaly gateway starting...");
    tracing::info!(
        "Region: {} | artifact bucket: {} | canonical resolution: {}x{}",
        config.region,
        config.artifact_bucket,
        config.canonical_width,
        config.canonical_height,
    );

    // One pooled transport shared by both outbound clients, created once
    // and injected into every handler.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let state = AppState {
        detection: DetectionClient::new(&config, http.clone()),
        storage: StorageClient::new(&config, http),
        config,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub detection: DetectionClient,
    pub storage: StorageClient,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/start-model", post(handlers::model::start_model))
        .route("/stop-model", post(handlers::model::stop_model))
        .route("/detect-anomalies", post(handlers::detect::detect_anomalies))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
