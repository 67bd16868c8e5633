//! Server startup helper for embedding the live server in a larger process.
//!
//! [`spawn_server`] binds eagerly, so address and port conflicts surface
//! to the caller, then serves on a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use askboard_live::startup::spawn_server;
//! use askboard_live::{AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::default());
//! let (addr, handle) = spawn_server(&ServerConfig::default(), state, shutdown).await?;
//! // The server is now running on `addr`.
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind_listener, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the live server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),

    /// The bound listener could not report its address.
    #[error("listener address unavailable: {0}")]
    LocalAddr(#[from] std::io::Error),
}

/// Spawn the live server on a background Tokio task.
///
/// Returns the bound address (useful with port `0`) and a
/// [`JoinHandle`] that resolves once `shutdown` has fired and the
/// server has drained.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_server<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(SocketAddr, JoinHandle<()>), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind_listener(config).await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "live server exited with error");
        }
    });

    tracing::info!(%addr, "live server spawned on background task");

    Ok((addr, handle))
}
