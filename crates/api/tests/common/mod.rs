#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use upkeep_api::config::{ServerConfig, StorageBackend};
use upkeep_api::router::build_app_router;
use upkeep_api::state::AppState;
use upkeep_core::checklist::ChecklistItem;
use upkeep_core::types::DbId;
use upkeep_db::models::equipment::CreateEquipment;
use upkeep_db::models::technician::CreateTechnician;
use upkeep_db::models::template::CreatePmTemplate;
use upkeep_db::Store;
use upkeep_events::EventBus;

/// Build a test `ServerConfig` with safe defaults and the in-memory backend.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        overdue_sweep_interval_secs: 3600,
        notification_sweep_interval_secs: 3600,
        storage: StorageBackend::Memory,
    }
}

/// A test application: the full router plus handles for seeding and event
/// inspection.
pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub events: Arc<EventBus>,
}

/// Build the full application router over a fresh in-memory store.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Store::memory();
    let events = Arc::new(EventBus::default());

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        events: Arc::clone(&events),
    };
    TestApp {
        router: build_app_router(state, &config),
        store,
        events,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, "POST", uri, body).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, "PUT", uri, body).await
}

pub async fn patch_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, "PATCH", uri, body).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the response is an error with the given status and `code` field.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert a piece of equipment directly into the store.
pub async fn seed_equipment(store: &Store, name: &str) -> DbId {
    store
        .equipment
        .create(&CreateEquipment {
            name: name.into(),
            equipment_type_id: None,
            location: None,
        })
        .await
        .unwrap()
        .id
}

/// Insert a technician directly into the store.
pub async fn seed_technician(store: &Store, name: &str) -> DbId {
    store
        .technicians
        .create(&CreateTechnician {
            name: name.into(),
            email: None,
        })
        .await
        .unwrap()
        .id
}

/// Insert a monthly template with two required and one optional checklist
/// item (ids 1, 2 required; 3 optional).
pub async fn seed_template(store: &Store) -> DbId {
    store
        .templates
        .create(&CreatePmTemplate {
            name: "Monthly inspection".into(),
            description: Some("Standard monthly PM".into()),
            interval_type: "monthly".into(),
            interval_value: 1,
            checklist_items: vec![
                ChecklistItem {
                    id: 1,
                    order: 1,
                    description: "Check oil level".into(),
                    is_required: true,
                },
                ChecklistItem {
                    id: 2,
                    order: 2,
                    description: "Inspect belts".into(),
                    is_required: true,
                },
                ChecklistItem {
                    id: 3,
                    order: 3,
                    description: "Wipe down panel".into(),
                    is_required: false,
                },
            ],
            required_parts: vec![],
            estimated_duration_minutes: Some(30),
            is_active: true,
        })
        .await
        .unwrap()
        .id
}
