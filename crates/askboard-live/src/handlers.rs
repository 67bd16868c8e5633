//! REST endpoint handlers for the live server.
//!
//! All handlers read the shared [`QuestionBoard`](askboard_core::QuestionBoard)
//! through [`AppState`]. They never mutate it; mutation only happens over
//! the `WebSocket` protocol or through in-process collaborators.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness plus board and session counts |
//! | `GET` | `/api/questions` | Current board contents |
//! | `GET` | `/api/questions/{id}` | Single question |

use std::sync::Arc;

use askboard_types::{Question, QuestionId};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};

use crate::error::LiveError;
use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Questions currently on the board.
    pub questions: usize,
    /// Open `WebSocket` sessions.
    pub sessions: usize,
    /// Board subscriptions, which should track `sessions`.
    pub subscribers: usize,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let question_count = state.board.len();
    let session_count = state.active_sessions();
    let grace_ms = state.settings.report_grace.as_millis();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Askboard</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Askboard</h1>
    <p class="subtitle">Live questions, pushed to every connected client</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <div>
        <div class="metric">
            <div class="label">Questions</div>
            <div class="value">{question_count}</div>
        </div>
        <div class="metric">
            <div class="label">Sessions</div>
            <div class="value">{session_count}</div>
        </div>
        <div class="metric">
            <div class="label">Report grace</div>
            <div class="value">{grace_ms} ms</div>
        </div>
    </div>

    <h2>Endpoints</h2>
    <ul>
        <li><a href="/api/questions">/api/questions</a> -- Current board</li>
        <li><a href="/health">/health</a> -- Health check</li>
        <li><code>ws://host:port/ws</code> -- Live stream (send <code>{{"ask":"..."}}</code> or <code>{{"report":id}}</code>)</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness with board and session counts.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        questions: state.board.len(),
        sessions: state.active_sessions(),
        subscribers: state.board.subscriber_count(),
    })
}

// ---------------------------------------------------------------------------
// GET /api/questions
// ---------------------------------------------------------------------------

/// Return the board contents in insertion order.
pub async fn list_questions(State(state): State<Arc<AppState>>) -> Json<Vec<Question>> {
    Json(state.board.snapshot())
}

/// Return one question by id.
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<Question>, LiveError> {
    let id = id_str
        .parse::<u32>()
        .map(QuestionId::from)
        .map_err(|e| LiveError::InvalidId(format!("{id_str}: {e}")))?;

    state
        .board
        .snapshot()
        .into_iter()
        .find(|q| q.id == id)
        .map(Json)
        .ok_or_else(|| LiveError::NotFound(format!("question {id} not found")))
}
