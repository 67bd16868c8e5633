//! Axum router construction for the live server.
//!
//! Assembles the `WebSocket` endpoint and the read-only REST routes into a
//! single [`Router`] with CORS and HTTP tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /health` -- health check
/// - `GET /ws` -- live question stream
/// - `GET /api/questions` -- current board
/// - `GET /api/questions/{id}` -- single question
///
/// CORS allows any origin so a page served elsewhere can open the socket.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/ws", get(ws::ws_live))
        .route("/api/questions", get(handlers::list_questions))
        .route("/api/questions/{id}", get(handlers::get_question))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
