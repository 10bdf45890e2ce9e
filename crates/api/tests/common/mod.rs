#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use yarning_api::config::ServerConfig;
use yarning_api::router::build_app_router;
use yarning_api::state::AppState;
use yarning_core::advisor::Advisor;
use yarning_core::memory::{MemoryAdvisorDirectory, MemoryConsultationStore, MemoryWorkflowStore};
use yarning_core::protocols::{ProtocolConfig, ValidationEngine};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        protocols_path: None,
    }
}

/// Handles to the in-memory stores behind a test app.
pub struct TestApp {
    pub router: Router,
    pub consultations: Arc<MemoryConsultationStore>,
    pub advisors: Arc<MemoryAdvisorDirectory>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

pub fn advisor(id: i64, name: &str, specialties: &[&str]) -> Advisor {
    Advisor {
        id,
        name: name.to_string(),
        community: Some("Arrernte".to_string()),
        specialties: specialties.iter().map(|s| (*s).to_string()).collect(),
        is_active: true,
    }
}

/// Build the full application router over in-memory stores seeded with
/// `advisors`, using the same middleware stack as the binary.
pub fn build_test_app_with(advisors: Vec<Advisor>) -> TestApp {
    let config = test_config();
    let consultations = Arc::new(MemoryConsultationStore::new());
    let directory = Arc::new(MemoryAdvisorDirectory::with_advisors(advisors));
    let engine = ValidationEngine::new(ProtocolConfig::default()).unwrap();

    let state = AppState::new(
        config.clone(),
        engine,
        consultations.clone(),
        directory.clone(),
        Arc::new(MemoryWorkflowStore::new()),
    );

    TestApp {
        router: build_app_router(state, &config),
        consultations,
        advisors: directory,
    }
}

/// Test app seeded with a small advisor directory.
pub fn build_test_app() -> TestApp {
    build_test_app_with(vec![
        advisor(1, "Aunty May", &["Women's Business", "Traditional Healing"]),
        advisor(2, "Uncle Jim", &["Dreamtime Stories"]),
        advisor(3, "Aunty Rose", &["Language"]),
    ])
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
