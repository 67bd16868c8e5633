//! Integration tests for the live server's REST endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use askboard_live::router::build_router;
use askboard_live::state::AppState;
use askboard_types::{Question, QuestionId};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    let state = Arc::new(AppState::default());
    state
        .board
        .insert(Question::new(QuestionId(1), "Which resources would you recommend?"))
        .unwrap();
    state.board.add("How do I close a socket cleanly?");
    state
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, path: &str) -> axum::response::Response {
    build_router(state)
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_index_returns_html() {
    let response = get(make_test_state(), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/api/questions"));
    assert!(html.contains("/ws"));
}

#[tokio::test]
async fn test_health() {
    let response = get(make_test_state(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["questions"], 2);
    assert_eq!(json["sessions"], 0);
    assert_eq!(json["subscribers"], 0);
}

#[tokio::test]
async fn test_list_questions_in_insertion_order() {
    let response = get(make_test_state(), "/api/questions").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json,
        serde_json::json!([
            {"id": 1, "text": "Which resources would you recommend?"},
            {"id": 1001, "text": "How do I close a socket cleanly?"},
        ])
    );
}

#[tokio::test]
async fn test_list_questions_empty_board() {
    let response = get(Arc::new(AppState::default()), "/api/questions").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_reflects_removal() {
    let state = make_test_state();
    assert!(state.board.remove(QuestionId(1)));

    let json = body_to_json(get(state, "/api/questions").await.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], 1001);
}

#[tokio::test]
async fn test_get_question_by_id() {
    let response = get(make_test_state(), "/api/questions/1001").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["text"], "How do I close a socket cleanly?");
}

#[tokio::test]
async fn test_get_question_not_found() {
    let response = get(make_test_state(), "/api/questions/77").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_get_question_invalid_id() {
    let response = get(make_test_state(), "/api/questions/not-a-number").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = get(make_test_state(), "/api/nothing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ws_route_requires_upgrade() {
    let response = get(make_test_state(), "/ws").await;
    assert!(response.status().is_client_error());
}
