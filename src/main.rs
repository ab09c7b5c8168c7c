mod app_state;
mod config;
mod models;
mod routes;
mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::response::Html;
use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::lookup::{CarrierLookup, TwilioLookupClient};
use services::store::{InMemoryJobStore, JobStore};
use services::verifier::BatchVerifier;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing line-verify server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "verification_batches_submitted",
        "Total verification batches submitted"
    );
    metrics::describe_counter!(
        "verification_batches_completed",
        "Total verification batches that reached completion"
    );
    metrics::describe_counter!(
        "line_checks_total",
        "Total line checks by terminal status"
    );

    // Initialize the in-memory job store
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());

    // Initialize the carrier lookup client when credentials are configured
    let lookup: Option<Arc<dyn CarrierLookup>> = match config.twilio_credentials() {
        Some((sid, token)) => {
            tracing::info!("Initializing Twilio Lookup client");
            let client =
                TwilioLookupClient::new(sid, token, Duration::from_secs(config.lookup_timeout_secs))
                    .expect("Failed to initialize Twilio Lookup client");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("Twilio credentials not set; carrier lookup disabled");
            None
        }
    };
    let provider_enabled = lookup.is_some();

    let verifier = BatchVerifier::new(store, lookup, Duration::from_millis(config.dispatch_delay_ms));

    // Create shared application state
    let state = AppState::new(verifier, provider_enabled);

    // Build API routes
    let app = Router::new()
        // Static UI (embedded at compile time)
        .route("/", get(|| async { Html(include_str!("../static/index.html")) }))
        // API endpoints
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/batches", post(routes::batches::submit_batch))
        .route(
            "/api/v1/batches/upload",
            post(routes::batches::upload_batch),
        )
        .route(
            "/api/v1/batches/{job_id}",
            get(routes::batches::get_batch_status),
        )
        .route(
            "/api/v1/batches/{job_id}/report.csv",
            get(routes::batches::download_csv),
        )
        .route(
            "/api/v1/batches/{job_id}/report.pdf",
            get(routes::batches::download_pdf),
        )
        .route("/api/v1/sample", get(routes::batches::download_sample))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    tracing::info!("Starting line-verify on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
