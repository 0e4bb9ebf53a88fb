//! Shared test fixtures: an in-process stub of the admin backend.
//!
//! The stub listens on an ephemeral localhost port and records the
//! `Authorization` header of every request it sees, so tests can assert on
//! exactly what the real `reqwest` pipeline sent.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use serde_json::{Value, json};

pub(crate) const STUB_USERNAME: &str = "admin";
pub(crate) const STUB_PASSWORD: &str = "secret";
pub(crate) const STUB_TOKEN: &str = "tok-123";

pub(crate) struct StubState {
    /// `(path, Authorization header)` per request, in arrival order.
    pub seen: Mutex<Vec<(String, Option<String>)>>,
    /// JSON bodies posted to the login endpoint, in arrival order.
    pub login_bodies: Mutex<Vec<Value>>,
}

impl StubState {
    pub(crate) fn seen(&self) -> Vec<(String, Option<String>)> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn login_bodies(&self) -> Vec<Value> {
        self.login_bodies.lock().unwrap().clone()
    }

    fn record(&self, path: &str, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.seen.lock().unwrap().push((path.to_owned(), auth));
    }
}

pub(crate) struct StubBackend {
    pub base_url: String,
    pub state: Arc<StubState>,
}

pub(crate) async fn spawn_stub_backend() -> StubBackend {
    let state = Arc::new(StubState { seen: Mutex::new(Vec::new()), login_bodies: Mutex::new(Vec::new()) });
    let app = Router::new()
        .route("/admin/admin-login", post(login))
        .route("/admin/me", get(me))
        .route("/admin/destination/{kind}", get(destinations))
        .route("/admin/tnc", post(echo).patch(echo))
        .route("/admin/blog/{id}", delete(remove_blog))
        .route("/admin/fail", get(fail))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubBackend { base_url: format!("http://{addr}"), state }
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {STUB_TOKEN}"))
}

async fn login(State(state): State<Arc<StubState>>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.record("/admin/admin-login", &headers);
    state.login_bodies.lock().unwrap().push(body.clone());
    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if username == Some(STUB_USERNAME) && password == Some(STUB_PASSWORD) {
        (
            StatusCode::OK,
            Json(json!({ "role": "admin", "username": STUB_USERNAME, "token": STUB_TOKEN, "msg": "Welcome back" })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" })))
    }
}

async fn me(State(state): State<Arc<StubState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.record("/admin/me", &headers);
    if bearer_ok(&headers) {
        (StatusCode::OK, Json(json!({ "role": "admin", "userId": "u1", "msg": "Session is valid" })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "Token expired" })))
    }
}

async fn destinations(
    State(state): State<Arc<StubState>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("/admin/destination", &headers);
    (StatusCode::OK, Json(json!({ "places": [{ "destination_name": "Goa", "type": kind }] })))
}

async fn echo(State(state): State<Arc<StubState>>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    state.record("/admin/tnc", &headers);
    Json(json!({ "data": body }))
}

async fn remove_blog(State(state): State<Arc<StubState>>, Path(_id): Path<String>, headers: HeaderMap) -> StatusCode {
    state.record("/admin/blog", &headers);
    StatusCode::NO_CONTENT
}

async fn fail(State(state): State<Arc<StubState>>, headers: HeaderMap) -> (StatusCode, &'static str) {
    state.record("/admin/fail", &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded")
}
