//! API server entry point.

use std::error::Error;

use api::{Config, LogFormat};
use event_store::{EventStore, InMemoryEventStore, PostgresEventStore};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type BoxError = Box<dyn Error + Send + Sync>;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Serves the API over `store` until a shutdown signal arrives, with event
/// reactions polling the log in the background.
async fn serve<S: EventStore + Clone + 'static>(
    store: S,
    config: Config,
    metrics_handle: PrometheusHandle,
) -> Result<(), BoxError> {
    let state = api::create_default_state(store, &config).await?;

    // Replay the log into the read models before taking traffic.
    let replayed = state.processor.run_catch_up().await?;
    tracing::info!(replayed, "read models caught up");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let processor = state.processor.clone();
    let interval = config.reaction_poll_interval;
    let reactions = tokio::spawn(async move { processor.run(interval, shutdown_rx).await });

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // A send error means the reaction loop already exited.
    let _ = shutdown_tx.send(true);
    if let Err(err) = reactions.await {
        tracing::error!(error = %err, "event reaction task panicked");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Config::from_env();

    // 1. Initialize tracing
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 3. Pick the event store and serve
    match config.database_url.clone() {
        Some(url) => {
            tracing::info!("using Postgres event store");
            let store = PostgresEventStore::connect(&url).await?;
            serve(store, config, metrics_handle).await?;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, events are kept in memory");
            serve(InMemoryEventStore::new(), config, metrics_handle).await?;
        }
    }

    tracing::info!("server shut down gracefully");
    Ok(())
}
