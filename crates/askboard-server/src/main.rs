//! Askboard server binary.
//!
//! This is the main entry point that wires the shared question board to
//! the live `WebSocket` server. It loads configuration, initializes
//! logging, optionally starts the demo script, and serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `askboard-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the question board and application state
//! 4. Start the demo script if enabled
//! 5. Serve HTTP and `WebSocket` clients until shutdown

mod error;

use std::path::Path;
use std::sync::Arc;

use askboard_core::{AskboardConfig, LoggingConfig, spawn_demo};
use askboard_live::{AppState, ServerConfig, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const CONFIG_PATH: &str = "askboard-config.yaml";

/// Application entry point for the Askboard server.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot
/// bind its address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("askboard-server starting");
    info!(
        host = config.server.host,
        port = config.server.port,
        first_question_id = config.board.first_question_id,
        report_grace_ms = config.board.report_grace_ms,
        subscriber_queue_capacity = config.board.subscriber_queue_capacity,
        demo = config.demo.enabled,
        "Configuration loaded"
    );

    // 3. Create board and shared state.
    let state = Arc::new(AppState::from_config(&config.board));

    // 4. Start the demo script.
    if config.demo.enabled {
        let _demo = spawn_demo(Arc::clone(&state.board), config.demo.steps.clone());
        info!(steps = config.demo.steps.steps().len(), "Demo script enabled");
    }

    // 5. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config.server);
    start_server(&server_config, state, shutdown_signal())
        .await
        .map_err(AppError::from)?;

    info!("askboard-server stopped");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults.
///
/// Environment overrides apply in both cases.
fn load_config() -> Result<AskboardConfig, AppError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(AskboardConfig::from_file(config_path)?)
    } else {
        Ok(AskboardConfig::parse("")?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level` when set.
fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| AppError::Logging {
            message: format!("invalid level {:?}: {e}", config.level),
        })?,
    };

    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
    Ok(())
}

/// Resolve when the process receives `Ctrl-C`.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
