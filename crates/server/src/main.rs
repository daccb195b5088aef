use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rallypoint_core::{
    load_config, validate_config, Config, FunctionDispatch, FunctionResolver, MatchOrchestrator,
    MemoryTicketStore, ScoreEvaluator, SyncBarrier, TicketStore,
};

use rallypoint_server::api::create_router;
use rallypoint_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("RALLYPOINT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; every section has defaults, so a missing file
    // just means a default deployment.
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}; using defaults", config_path);
        Config::default()
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!(version = VERSION, "Configuration loaded");
    info!(
        min_window_ms = config.barrier.min_window_ms,
        max_window_ms = config.barrier.max_window_ms,
        "Barrier windows"
    );

    // Wire components leaves-first: store, evaluator, barrier, functions,
    // orchestrator.
    let store: Arc<dyn TicketStore> = Arc::new(MemoryTicketStore::new());
    info!("Ticket store initialized");

    let barrier = Arc::new(SyncBarrier::new(
        config.barrier.clone(),
        Arc::clone(&store),
        Arc::new(ScoreEvaluator::new()),
    ));
    barrier.start();
    info!("Barrier driver started");

    let functions: Arc<dyn FunctionDispatch> = Arc::new(FunctionResolver::new(
        Duration::from_millis(config.orchestrator.proposal_deadline_ms),
    ));
    let orchestrator = Arc::new(MatchOrchestrator::new(
        config.orchestrator.clone(),
        Arc::clone(&barrier),
        functions,
    ));
    info!("Match orchestrator initialized");

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&store),
        orchestrator,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    barrier.stop();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
