use axum::body::Body;
use axum::http::Request;
use axum::Router;
use server::core::clock::ManualClock;
use server::core::store::InMemoryStore;
use server::core::{AppState, ChatServerConfig};
use std::sync::Arc;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::default());
    let state = AppState::new(
        ChatServerConfig::default(),
        store.clone(),
        store,
        clock.clone(),
    );
    TestApp {
        app: server::core::router(state.clone()),
        state,
        clock,
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("User", user);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

/// Request with a raw body, for bodies that are not valid JSON
pub fn raw_request(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("User", user);
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
