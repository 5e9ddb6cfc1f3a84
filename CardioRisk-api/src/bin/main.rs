use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use cardio_risk_api::api::{create_application, handlers::health};
use cardio_risk_api::config::ServerConfig;
use cardio_risk_domain::model::load_pipeline;
use cardio_risk_domain::services::{
    create_assessment_service, create_default_explainer, GeminiConfig, RiskClassifier,
};

/// The main entry point for the CardioRisk server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Loads the model artifact; failure is fatal
/// 4. Selects the explanation provider
/// 5. Creates and starts the Axum web application
/// 6. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(true)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    info!("Starting CardioRisk server");

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    let pipeline = load_pipeline(&config.model_path).with_context(|| {
        format!("Failed to load model artifact from {}", config.model_path.display())
    })?;
    let classifier: Arc<dyn RiskClassifier> = Arc::new(pipeline);

    // Warns once if GEMINI_API_KEY is missing
    let gemini_config = GeminiConfig::from_env();
    let explainer = create_default_explainer(gemini_config);

    let health_service = health::create_health_service(
        Some(classifier.name().to_string()),
        explainer.is_configured(),
        config.environment.clone(),
    );
    let assessment_service = Arc::new(create_assessment_service(classifier, explainer));

    // Initialize server start time for uptime reporting in health checks
    health::initialize_server_start_time();

    // Create the Axum application with all routes and middleware
    let app = create_application(assessment_service, health_service);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {} ({} environment)", addr, config.environment);

    // Create a TCP listener and bind to the address
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve the application with graceful shutdown support
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Sets up a signal handler for graceful shutdown
///
/// Waits for either CTRL+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutting down server...");
}
