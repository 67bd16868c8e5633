//! Shared type definitions for the Askboard live question service.
//!
//! Types defined here are used by the board, the session layer, and the
//! binary. Wire types flow downstream to `TypeScript` via `ts-rs` so the
//! browser client stays in sync with the server.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers for questions and sessions
//! - [`question`] -- The [`Question`] record
//! - [`messages`] -- Inbound and outbound wire messages

pub mod ids;
pub mod messages;
pub mod question;

// Re-export all public types at crate root for convenience.
pub use ids::{QuestionId, SessionId};
pub use messages::{ClientMessage, ServerMessage};
pub use question::Question;
