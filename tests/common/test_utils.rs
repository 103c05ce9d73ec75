use super::mocks::MockToolkit;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
};
use chem_translator::{
    auth::BasicCredentials,
    config::AuthConfig,
    server::{self, AppState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub const SECRET: &str = "test-secret";
pub const DOCS_USER: &str = "user";
pub const DOCS_PASSWORD: &str = "docs-password";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        api_secret: SECRET.to_string(),
        allow_unauthenticated_inchi_key_plain: false,
    }
}

/// Router over `toolkit` with the docs pages disabled.
pub fn create_test_app(toolkit: Arc<MockToolkit>) -> Router {
    create_test_app_with(toolkit, auth_config(), None)
}

pub fn create_test_app_with(
    toolkit: Arc<MockToolkit>,
    auth: AuthConfig,
    docs: Option<BasicCredentials>,
) -> Router {
    let state = AppState::new(toolkit, &auth);
    server::router(state, docs)
}

pub fn docs_credentials() -> BasicCredentials {
    BasicCredentials::new(DOCS_USER, DOCS_PASSWORD)
}

/// Percent-encodes a structure string for use as trailing path segments.
/// `/` is kept so it splits into segments like a client would send it.
pub fn encode_path(structure: &str) -> String {
    structure
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is not UTF-8")
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}
