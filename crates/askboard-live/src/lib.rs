//! Live transport for the Askboard question board.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) where each connection becomes a
//!   [`ConnectionSession`]: it receives the current board, then every
//!   change, and may send `ask` and `report` messages
//! - **REST endpoints** for reading the board (`/api/questions`) and
//!   checking health (`/health`)
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! All connections share one [`QuestionBoard`](askboard_core::QuestionBoard)
//! held in [`AppState`]. A session owns its socket's send half outright
//! and serves both directions from a single task, so frames to one
//! client never interleave. Board events reach each session through its
//! own bounded queue; a session that cannot keep up is closed instead of
//! silently skipping changes.

pub mod codec;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod session;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use codec::CodecError;
pub use error::LiveError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind_listener, serve, start_server};
pub use session::{CloseReason, ConnectionSession, SessionSettings, SessionState, SessionSummary};
pub use startup::{StartupError, spawn_server};
pub use state::{AppState, SessionGuard};
