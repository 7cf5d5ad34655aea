// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde_json::{Value, json};

/// What the fake backend has received.
#[derive(Debug, Default)]
pub struct Recorded {
    pub responses: Vec<Value>,
    pub ended: Vec<String>,
    pub auto_submits: Vec<String>,
    pub fraud: Vec<Value>,
    pub security: Vec<Value>,
    pub authorization: Vec<String>,
}

#[derive(Clone, Default)]
pub struct Backend {
    pub recorded: Arc<Mutex<Recorded>>,
    pub reject_sessions: bool,
    pub no_exams: bool,
}

impl Backend {
    pub fn snapshot<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.recorded.lock().unwrap())
    }
}

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

fn session_body(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "exam_id": 3,
        "user_id": 9,
        "start_time": "2024-05-01T10:00:00",
        "end_time": null,
        "score": null,
        "status": status,
        "duration": 30,
        "responses": []
    })
}

async fn list_exams(State(backend): State<Backend>) -> Json<Value> {
    if backend.no_exams {
        return Json(json!([]));
    }
    Json(json!([{
        "id": 3,
        "title": "Rust basics",
        "description": "Ownership and borrowing",
        "owner_id": 1,
        "created_at": "2024-05-01T09:00:00",
        "updated_at": "2024-05-01T09:00:00",
        "questions": [
            { "id": "q1", "exam_id": 3, "text": "Who owns a moved value?", "type": "single_choice",
              "options": ["caller", "callee"] },
            { "id": "q2", "exam_id": 3, "text": "Pick the Copy types", "type": "multiple_selection",
              "options": ["u8", "String", "bool"] },
            { "id": "q3", "exam_id": 3, "text": "Explain lifetimes", "type": "text_input",
              "options": [] }
        ]
    }]))
}

async fn start_session(
    State(backend): State<Backend>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        backend
            .recorded
            .lock()
            .unwrap()
            .authorization
            .push(auth.to_string());
    }
    if backend.reject_sessions {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            "User already has an active session for this exam",
        ));
    }
    if body["exam_id"] != "3" {
        return Err(detail(StatusCode::NOT_FOUND, "Exam not found"));
    }
    Ok((StatusCode::CREATED, Json(session_body(41, "in_progress"))))
}

async fn submit_response(State(backend): State<Backend>, Json(body): Json<Value>) -> ApiResult {
    if body["answer"] == "boom" {
        return Err(detail(StatusCode::BAD_REQUEST, "Exam session is not in progress"));
    }
    backend.recorded.lock().unwrap().responses.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn end_session(State(backend): State<Backend>, Path(id): Path<String>) -> Json<Value> {
    backend.recorded.lock().unwrap().ended.push(id);
    Json(session_body(41, "completed"))
}

async fn list_sessions() -> Json<Value> {
    Json(json!([session_body(41, "completed"), session_body(42, "in_progress")]))
}

async fn auto_submit(State(backend): State<Backend>, Path(id): Path<String>) -> Json<Value> {
    backend.recorded.lock().unwrap().auto_submits.push(id);
    Json(session_body(41, "submitted"))
}

async fn fraud(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    backend.recorded.lock().unwrap().fraud.push(body.clone());
    Json(body)
}

async fn security_event(State(backend): State<Backend>, Json(body): Json<Value>) -> StatusCode {
    backend.recorded.lock().unwrap().security.push(body);
    StatusCode::NO_CONTENT
}

/// Spawns the fake backend on a random port and returns its base URL
/// (e.g., "http://127.0.0.1:12345").
pub async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/exams", get(list_exams))
        .route("/exam-sessions", post(start_session).get(list_sessions))
        .route("/exam-sessions/{id}/end", patch(end_session))
        .route("/exam-sessions/{id}/auto-submit/", post(auto_submit))
        .route("/exam-responses", post(submit_response))
        .route("/fraud", post(fraud))
        .route("/api/v1/security/event", post(security_event))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

pub fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("exam-client-it-{}", uuid::Uuid::new_v4()))
}
