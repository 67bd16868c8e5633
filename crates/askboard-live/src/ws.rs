//! `WebSocket` entry point into the live question board.
//!
//! Clients connect to `GET /ws`. Once the upgrade completes,
//! [`on_connection_established`] splits the socket and hands both halves
//! to a [`ConnectionSession`], which runs until the client goes away.

use std::sync::Arc;

use axum::extract::ws::WebSocket;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::StreamExt;
use tracing::debug;

use crate::session::{ConnectionSession, SessionSummary};
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and start a
/// session on it.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_live(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        on_connection_established(socket, state).await;
    })
}

/// Run a [`ConnectionSession`] over an upgraded socket.
///
/// This is the only way a connection enters the board protocol. Returns
/// the session's summary once the connection has closed and the session
/// has released its subscription.
pub async fn on_connection_established(socket: WebSocket, state: Arc<AppState>) -> SessionSummary {
    let session = ConnectionSession::new(Arc::clone(&state.board), state.settings.clone());
    let _guard = state.track_session();
    debug!(session_id = %session.id(), "WebSocket client connected");

    let (outbound, inbound) = socket.split();
    session.run(inbound, outbound).await
}
