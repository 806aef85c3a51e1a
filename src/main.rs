use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, DEFAULT_REST_ADDR, core_config_from_env, router};
use api_shared::HealthService;
use care_broker::{BrokerConfig, connect_or_disconnected};
use care_core::CareOrchestrator;

/// Main entry point for the care orchestration service
///
/// Connects to the broker (optional), then runs concurrently:
/// - the REST server (configurable via CARE_REST_ADDR)
/// - the risk-score consumer, when the broker is connected
///
/// Without a broker the service still answers every endpoint; publication is logged as skipped.
///
/// # Environment Variables
/// - `CARE_REST_ADDR`: REST server address (default: "0.0.0.0:8003")
/// - `CARE_SAMPLES_DIR`: Directory holding the sample data files (default: "samples")
/// - `CARE_FINANCIAL_MODEL`: Financial impact model path (default: "financial_impact_model.json")
/// - `FHIR_BASE_URL`: FHIR server reported by /health (empty disables)
/// - `AMQP_URL`: Broker URL (unset runs without a broker)
/// - `AMQP_CONNECT_TIMEOUT_SECS`: Broker connect timeout (default: 10)
///
/// # Returns
/// * `Ok(())` - After a graceful shutdown on Ctrl-C or SIGTERM
/// * `Err(anyhow::Error)` - If configuration, bind or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("care_run=info".parse()?)
                .add_directive("care_core=info".parse()?)
                .add_directive("care_broker=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CARE_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = Arc::new(core_config_from_env()?);
    let broker_cfg = BrokerConfig::from_env_values(
        std::env::var("AMQP_URL").ok(),
        std::env::var("AMQP_CONNECT_TIMEOUT_SECS").ok(),
    )?;

    let (publisher, broker) = connect_or_disconnected(broker_cfg).await;
    let orchestrator = CareOrchestrator::new(publisher);

    let status = HealthService::check_health(
        orchestrator.publisher_connected(),
        cfg.fhir_configured(),
        chrono::Utc::now(),
    );
    tracing::info!(
        rabbitmq_connected = status.rabbitmq_connected,
        fhir_configured = status.fhir_configured,
        fhir_base_url = cfg.fhir_base_url().unwrap_or("none"),
        "Service status"
    );

    let consumer_task = match &broker {
        Some(broker) => match broker.consumer(orchestrator.clone()).await {
            Ok(consumer) => Some(tokio::spawn(async move {
                if let Err(e) = consumer.run().await {
                    tracing::error!("Risk score consumer failed: {}", e);
                }
            })),
            Err(e) => {
                tracing::warn!("Could not start risk score consumer: {}", e);
                None
            }
        },
        None => None,
    };

    tracing::info!("++ Starting care orchestration REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(AppState::new(cfg, orchestrator)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = consumer_task {
        task.abort();
    }
    if let Some(broker) = broker {
        if let Err(e) = broker.close().await {
            tracing::warn!("Error closing broker connection: {}", e);
        }
    }

    tracing::info!("-- Care orchestration service stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
///
/// The SIGTERM handler is installed when this is called, before the future is first polled.
fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate());

    async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            match terminate {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::error!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let signal = tokio::select! {
            () = ctrl_c => "SIGINT",
            () = terminate => "SIGTERM",
        };
        tracing::info!(signal, "Shutdown signal received");
    }
}
