//! Shared application state for the live server.
//!
//! [`AppState`] carries the process-wide [`QuestionBoard`], the settings
//! every new session is created with, and a count of open sessions for
//! the status endpoints.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use askboard_core::{BoardConfig, QuestionBoard};

use crate::session::SessionSettings;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// The shared question board.
    pub board: Arc<QuestionBoard>,
    /// Settings applied to every new session.
    pub settings: SessionSettings,
    active_sessions: AtomicUsize,
}

impl AppState {
    /// Create state around an existing board.
    pub const fn new(board: Arc<QuestionBoard>, settings: SessionSettings) -> Self {
        Self {
            board,
            settings,
            active_sessions: AtomicUsize::new(0),
        }
    }

    /// Create state with a fresh board built from `config`.
    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(
            Arc::new(QuestionBoard::new(config)),
            SessionSettings::from(config),
        )
    }

    /// Number of sessions currently open.
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Acquire)
    }

    /// Count a session as open until the returned guard is dropped.
    pub fn track_session(self: &Arc<Self>) -> SessionGuard {
        self.active_sessions.fetch_add(1, Ordering::AcqRel);
        SessionGuard {
            state: Arc::clone(self),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

/// Keeps a session counted in [`AppState::active_sessions`].
#[derive(Debug)]
pub struct SessionGuard {
    state: Arc<AppState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.active_sessions.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_guard_counts_open_sessions() {
        let state = Arc::new(AppState::default());
        assert_eq!(state.active_sessions(), 0);

        let first = state.track_session();
        let second = state.track_session();
        assert_eq!(state.active_sessions(), 2);

        drop(first);
        assert_eq!(state.active_sessions(), 1);
        drop(second);
        assert_eq!(state.active_sessions(), 0);
    }
}
