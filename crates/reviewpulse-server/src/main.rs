//! ReviewPulse Server
//!
//! Serves sentiment predictions for free-text reviews from a pre-trained
//! vectorizer/classifier pair loaded from disk.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{info, warn};

use reviewpulse_classifiers::{ArtifactStore, SentimentService};
use reviewpulse_server::cli::{Cli, Command, LogFormat};
use reviewpulse_server::{create_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    let config = ServerConfig::load(&cli.config, &cli.artifacts, &cli.listen)?;
    info!(config = %cli.config.display(), "configuration loaded");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Check => check(config).await,
        Command::Predict { text } => predict_once(config, text).await,
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!("Starting ReviewPulse server");

    let metrics_handle = init_metrics()?;
    let addr = config.socket_addr()?;
    info!(base_dir = %config.artifacts.base_dir.display(), "artifact directory");

    // Initial load reads the artifact files
    let state =
        tokio::task::spawn_blocking(move || AppState::new(config, Some(metrics_handle))).await?;
    info!(state = ?state.service.state(), "application state initialized");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Load both artifacts once and print the health report
async fn check(config: ServerConfig) -> Result<()> {
    let service = load_service(config).await?;
    let report = service.health();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.models_loaded {
        let reason = report
            .store
            .last_attempt
            .and_then(|attempt| attempt.error)
            .unwrap_or_else(|| "no load attempted".to_string());
        anyhow::bail!("artifacts failed to load: {reason}");
    }
    Ok(())
}

/// Classify one review without starting the server
async fn predict_once(config: ServerConfig, text: String) -> Result<()> {
    let service = load_service(config).await?;
    let result = tokio::task::spawn_blocking(move || service.predict(&text)).await??;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn load_service(config: ServerConfig) -> Result<SentimentService> {
    let paths = config.artifact_paths();
    let service =
        tokio::task::spawn_blocking(move || SentimentService::start(ArtifactStore::new(paths)))
            .await?;
    Ok(service)
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("reviewpulse=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reviewpulse=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "reviewpulse_requests_total",
        "Total number of requests by endpoint"
    );
    metrics::describe_counter!(
        "reviewpulse_predictions_total",
        "Total number of predictions by sentiment"
    );
    metrics::describe_counter!("reviewpulse_errors_total", "Total number of errors by kind");
    metrics::describe_counter!(
        "reviewpulse_reloads_total",
        "Total number of reload attempts by outcome"
    );
    metrics::describe_histogram!(
        "reviewpulse_inference_latency_us",
        metrics::Unit::Microseconds,
        "Inference latency in microseconds"
    );
    metrics::describe_gauge!(
        "reviewpulse_models_loaded",
        "1 when a complete artifact pair is loaded"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
