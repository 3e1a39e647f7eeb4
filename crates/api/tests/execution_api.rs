//! Integration tests for the execution workflow: start, progress saves,
//! and the gated completion.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    assert_error, body_json, build_test_app, get, patch_json, post_json, seed_equipment,
    seed_technician, seed_template, TestApp,
};
use serde_json::json;

struct Workbench {
    app: TestApp,
    schedule_id: i64,
    technician_id: i64,
}

async fn workbench() -> Workbench {
    let app = build_test_app();
    let template_id = seed_template(&app.store).await;
    let equipment_id = seed_equipment(&app.store, "Forklift").await;
    let technician_id = seed_technician(&app.store, "Dana").await;

    let report = body_json(
        post_json(
            &app.router,
            "/api/v1/pm/schedules/generate",
            json!({
                "template_id": template_id,
                "equipment_ids": [equipment_id],
                "start_date": "2024-01-15",
                "months_ahead": 1
            }),
        )
        .await,
    )
    .await;
    let schedule_id = report["data"]["created"][0]["id"].as_i64().unwrap();

    Workbench {
        app,
        schedule_id,
        technician_id,
    }
}

async fn start(router: &Router, schedule_id: i64, technician_id: i64) -> serde_json::Value {
    let response = post_json(
        router,
        &format!("/api/v1/pm/schedules/{schedule_id}/start"),
        json!({ "technician_id": technician_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn results(checked: &[i64]) -> serde_json::Value {
    json!((1..=3)
        .map(|id| json!({
            "item_id": id,
            "is_checked": checked.contains(&id),
            "has_issue": false
        }))
        .collect::<Vec<_>>())
}

#[tokio::test]
async fn start_claims_schedule_and_seeds_checklist() {
    let w = workbench().await;
    let started = start(&w.app.router, w.schedule_id, w.technician_id).await;

    assert_eq!(started["data"]["schedule"]["status"], "in_progress");
    assert_eq!(
        started["data"]["schedule"]["technician_id"],
        w.technician_id
    );
    let execution = &started["data"]["execution"];
    assert_eq!(execution["status"], "in_progress");
    assert_eq!(execution["checklist_results"].as_array().unwrap().len(), 3);
    assert_eq!(execution["duration_minutes"], serde_json::Value::Null);
}

#[tokio::test]
async fn start_twice_conflicts() {
    let w = workbench().await;
    start(&w.app.router, w.schedule_id, w.technician_id).await;

    let response = post_json(
        &w.app.router,
        &format!("/api/v1/pm/schedules/{}/start", w.schedule_id),
        json!({ "technician_id": w.technician_id }),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "ALREADY_IN_PROGRESS").await;
}

#[tokio::test]
async fn start_with_unknown_technician_is_404() {
    let w = workbench().await;
    let response = post_json(
        &w.app.router,
        &format!("/api/v1/pm/schedules/{}/start", w.schedule_id),
        json!({ "technician_id": 999 }),
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn progress_saves_accumulate() {
    let w = workbench().await;
    let started = start(&w.app.router, w.schedule_id, w.technician_id).await;
    let execution_id = started["data"]["execution"]["id"].as_i64().unwrap();

    let response = patch_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}"),
        json!({ "findings": "Hydraulic leak near valve", "findings_severity": "major" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}"),
        json!({ "checklist_results": results(&[1]) }),
    )
    .await;
    let saved = body_json(response).await;
    // Both saves visible.
    assert_eq!(saved["data"]["findings"], "Hydraulic leak near valve");
    assert_eq!(saved["data"]["checklist_results"][0]["is_checked"], true);
}

#[tokio::test]
async fn completion_gate_names_missing_required_items() {
    let w = workbench().await;
    let started = start(&w.app.router, w.schedule_id, w.technician_id).await;
    let execution_id = started["data"]["execution"]["id"].as_i64().unwrap();

    // Required item 2 unchecked.
    let response = post_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}/complete"),
        json!({ "checklist_results": results(&[1, 3]) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err = body_json(response).await;
    assert_eq!(err["code"], "REQUIRED_ITEMS_INCOMPLETE");
    assert!(err["error"].as_str().unwrap().contains('2'));

    // Checking both required items succeeds and closes the schedule.
    let response = post_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}/complete"),
        json!({
            "checklist_results": results(&[1, 2]),
            "rating": 9,
            "findings_severity": "minor"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await;
    assert_eq!(completed["data"]["execution"]["status"], "completed");
    assert_eq!(completed["data"]["execution"]["rating"], 9);
    assert!(completed["data"]["execution"]["duration_minutes"].is_i64());
    assert_eq!(completed["data"]["schedule"]["status"], "completed");
}

#[tokio::test]
async fn complete_twice_conflicts() {
    let w = workbench().await;
    let started = start(&w.app.router, w.schedule_id, w.technician_id).await;
    let execution_id = started["data"]["execution"]["id"].as_i64().unwrap();

    post_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}/complete"),
        json!({ "checklist_results": results(&[1, 2]) }),
    )
    .await;

    let response = post_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}/complete"),
        json!({ "checklist_results": results(&[1, 2]) }),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "ALREADY_COMPLETED").await;
}

#[tokio::test]
async fn update_after_completion_conflicts() {
    let w = workbench().await;
    let started = start(&w.app.router, w.schedule_id, w.technician_id).await;
    let execution_id = started["data"]["execution"]["id"].as_i64().unwrap();
    post_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}/complete"),
        json!({ "checklist_results": results(&[1, 2]) }),
    )
    .await;

    let response = patch_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}"),
        json!({ "notes": "late note" }),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "ALREADY_COMPLETED").await;
}

#[tokio::test]
async fn complete_rejects_bad_rating() {
    let w = workbench().await;
    let started = start(&w.app.router, w.schedule_id, w.technician_id).await;
    let execution_id = started["data"]["execution"]["id"].as_i64().unwrap();

    let response = post_json(
        &w.app.router,
        &format!("/api/v1/pm/executions/{execution_id}/complete"),
        json!({ "checklist_results": results(&[1, 2]), "rating": 0 }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn get_execution_returns_payload() {
    let w = workbench().await;
    let started = start(&w.app.router, w.schedule_id, w.technician_id).await;
    let execution_id = started["data"]["execution"]["id"].as_i64().unwrap();

    let fetched = body_json(
        get(&w.app.router, &format!("/api/v1/pm/executions/{execution_id}")).await,
    )
    .await;
    assert_eq!(fetched["data"]["schedule_id"], w.schedule_id);
    assert_eq!(fetched["data"]["technician_id"], w.technician_id);
}

#[tokio::test]
async fn get_missing_execution_is_404() {
    let app = build_test_app();
    let response = get(&app.router, "/api/v1/pm/executions/31337").await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}
