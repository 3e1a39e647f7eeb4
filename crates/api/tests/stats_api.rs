//! Integration tests for the dashboard and compliance endpoints.
//!
//! The handlers compute against the real UTC calendar day, so fixtures are
//! seeded relative to `Utc::now()`.

mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{
    assert_error, body_json, build_test_app, get, post_json, seed_equipment, seed_technician,
    seed_template,
};
use serde_json::json;
use upkeep_db::models::schedule::CreatePmSchedule;

#[tokio::test]
async fn dashboard_counts_open_and_upcoming_work() {
    let app = build_test_app();
    let template_id = seed_template(&app.store).await;
    let today = Utc::now().date_naive();

    // One due in two days (upcoming week), one far out, one overdue.
    for (name, offset_days, past) in
        [("Press", 2i64, false), ("Lathe", 30, false), ("Mill", 5, true)]
    {
        let equipment_id = seed_equipment(&app.store, name).await;
        let date = if past {
            today.checked_sub_days(Days::new(offset_days as u64)).unwrap()
        } else {
            today.checked_add_days(Days::new(offset_days as u64)).unwrap()
        };
        app.store
            .schedules
            .create(&CreatePmSchedule {
                template_id,
                equipment_id,
                scheduled_date: date,
                technician_id: None,
                priority: "medium".into(),
            })
            .await
            .unwrap();
    }
    post_json(&app.router, "/api/v1/pm/sweeps/overdue", json!({})).await;

    let stats = body_json(get(&app.router, "/api/v1/pm/stats/dashboard").await).await;
    assert_eq!(stats["data"]["total_scheduled"], 2);
    assert_eq!(stats["data"]["upcoming_week"], 1);
    assert_eq!(stats["data"]["overdue_count"], 1);
}

#[tokio::test]
async fn compliance_reflects_completed_versus_overdue() {
    let app = build_test_app();
    let template_id = seed_template(&app.store).await;
    let technician_id = seed_technician(&app.store, "Sam").await;
    let today = Utc::now().date_naive();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

    // Two past occurrences this month (assuming the 1st at worst, both
    // clamped into the current month window by using yesterday/today).
    let first = seed_equipment(&app.store, "Press").await;
    let done = app
        .store
        .schedules
        .create(&CreatePmSchedule {
            template_id,
            equipment_id: first,
            scheduled_date: today,
            technician_id: None,
            priority: "medium".into(),
        })
        .await
        .unwrap();
    let second = seed_equipment(&app.store, "Lathe").await;
    app.store
        .schedules
        .create(&CreatePmSchedule {
            template_id,
            equipment_id: second,
            scheduled_date: yesterday,
            technician_id: None,
            priority: "medium".into(),
        })
        .await
        .unwrap();

    // Complete one via the API, let the other go overdue.
    let started = body_json(
        post_json(
            &app.router,
            &format!("/api/v1/pm/schedules/{}/start", done.id),
            json!({ "technician_id": technician_id }),
        )
        .await,
    )
    .await;
    let execution_id = started["data"]["execution"]["id"].as_i64().unwrap();
    let checked: Vec<_> = (1..=3)
        .map(|id| json!({ "item_id": id, "is_checked": true, "has_issue": false }))
        .collect();
    post_json(
        &app.router,
        &format!("/api/v1/pm/executions/{execution_id}/complete"),
        json!({ "checklist_results": checked }),
    )
    .await;
    post_json(&app.router, "/api/v1/pm/sweeps/overdue", json!({})).await;

    let stats = body_json(get(&app.router, "/api/v1/pm/stats/compliance?periods=2").await).await;
    let periods = stats["data"].as_array().unwrap();
    assert_eq!(periods.len(), 2);

    // The completed and overdue rows both fall in the last two months; sum
    // across periods to stay independent of month boundaries.
    let completed: i64 = periods.iter().map(|p| p["completed_count"].as_i64().unwrap()).sum();
    let overdue: i64 = periods.iter().map(|p| p["overdue_count"].as_i64().unwrap()).sum();
    assert_eq!(completed, 1);
    assert_eq!(overdue, 1);
}

#[tokio::test]
async fn compliance_defaults_to_six_periods() {
    let app = build_test_app();
    let stats = body_json(get(&app.router, "/api/v1/pm/stats/compliance").await).await;
    let periods = stats["data"].as_array().unwrap();
    assert_eq!(periods.len(), 6);
    // Empty months report the optimistic default.
    assert!(periods.iter().all(|p| p["compliance_rate"] == 100));
}

#[tokio::test]
async fn compliance_rejects_out_of_range_periods() {
    let app = build_test_app();
    let response = get(&app.router, "/api/v1/pm/stats/compliance?periods=0").await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let response = get(&app.router, "/api/v1/pm/stats/compliance?periods=99").await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}
