//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without a broker connection.
//!
//! ## Intended use
//! Useful for development and for dashboards that only read the sample files. `/process` still
//! runs the full pipeline, with publication reported as "no broker channel". The workspace's main
//! `care-run` binary adds the AMQP publisher and the risk-score consumer.

use api_rest::{core_config_from_env, router, AppState, DEFAULT_REST_ADDR};
use care_core::{CareOrchestrator, DisconnectedPublisher};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the care orchestration REST API server
///
/// # Environment Variables
/// - `CARE_REST_ADDR`: Server address (default: "0.0.0.0:8003")
/// - `CARE_SAMPLES_DIR`, `CARE_FINANCIAL_MODEL`, `FHIR_BASE_URL`: see [`core_config_from_env`]
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("care_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CARE_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("-- Starting care orchestration REST API on {}", addr);

    let cfg = Arc::new(core_config_from_env()?);
    let orchestrator = CareOrchestrator::new(Arc::new(DisconnectedPublisher));
    let app = router(AppState::new(cfg, orchestrator));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
