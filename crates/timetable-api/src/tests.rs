//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use timetable_scheduler::Scheduler;
use timetable_store_sqlite::SqliteStore;
use tower::ServiceExt;
use uuid::Uuid;

use crate::api_router;

async fn app() -> (Router, String) {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let router = api_router(Scheduler::new(Arc::new(store)));
  let base = format!("/schools/SCH01/classes/{}/days/2025-03-14", Uuid::new_v4());
  (router, base)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      req = req.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };

  let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

fn period(start: &str, end: &str) -> Value {
  json!({
    "slot_type":  "period",
    "subject_id": Uuid::new_v4(),
    "teacher_id": Uuid::new_v4(),
    "start_time": start,
    "end_time":   end,
  })
}

async fn create(app: &Router, base: &str, body: Value) -> Value {
  let (status, slot) = send(app, Method::POST, &format!("{base}/slots"), Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{slot}");
  slot
}

fn times(view: &Value) -> Vec<(u64, String, String)> {
  view["slots"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| {
      (
        s["period_number"].as_u64().unwrap(),
        s["start_time"].as_str().unwrap().to_owned(),
        s["end_time"].as_str().unwrap().to_owned(),
      )
    })
    .collect()
}

fn t3(n: u64, start: &str, end: &str) -> (u64, String, String) { (n, start.into(), end.into()) }

// ─── Slots ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_view_day() {
  let (app, base) = app().await;

  let slot = create(&app, &base, period("09:00", "09:45")).await;
  assert_eq!(slot["period_number"], 1);
  assert_eq!(slot["slot_type"], "period");
  assert_eq!(slot["status"], "planned");

  create(
    &app,
    &base,
    json!({ "slot_type": "break", "name": "Assembly", "start_time": "08:30", "end_time": "09:00" }),
  )
  .await;

  let (status, view) = send(&app, Method::GET, &base, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    times(&view),
    vec![t3(1, "08:30", "09:00"), t3(2, "09:00", "09:45")]
  );
  assert_eq!(view["slots"][0]["name"], "Assembly");
}

#[tokio::test]
async fn overlap_is_a_conflict() {
  let (app, base) = app().await;
  create(&app, &base, period("08:00", "09:00")).await;

  let (status, body) = send(&app, Method::POST, &format!("{base}/slots"), Some(period("08:30", "09:00"))).await;

  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("overlaps"));
}

#[tokio::test]
async fn invalid_input_is_a_bad_request() {
  let (app, base) = app().await;

  let missing_teacher = json!({
    "slot_type": "period",
    "subject_id": Uuid::new_v4(),
    "start_time": "08:00",
    "end_time": "08:45",
  });
  let (status, body) = send(&app, Method::POST, &format!("{base}/slots"), Some(missing_teacher)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("teacher"));

  let (status, _) = send(&app, Method::POST, &format!("{base}/slots"), Some(period("09:00", "08:00"))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_cascades_to_the_next_slot() {
  let (app, base) = app().await;
  create(&app, &base, period("08:00", "08:45")).await;
  let b = create(&app, &base, period("08:45", "09:30")).await;
  create(&app, &base, period("09:30", "10:15")).await;

  let uri = format!("{base}/slots/{}", b["slot_id"].as_str().unwrap());
  let (status, outcome) = send(&app, Method::PATCH, &uri, Some(json!({ "end_time": "09:00" }))).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(outcome["value"]["end_time"], "09:00");
  assert_eq!(outcome["warnings"], json!([]));

  let (_, view) = send(&app, Method::GET, &base, None).await;
  assert_eq!(
    times(&view),
    vec![
      t3(1, "08:00", "08:45"),
      t3(2, "08:45", "09:00"),
      t3(3, "09:00", "10:15"),
    ]
  );
}

#[tokio::test]
async fn delete_then_missing() {
  let (app, base) = app().await;
  let slot = create(&app, &base, period("08:00", "08:45")).await;
  let uri = format!("{base}/slots/{}", slot["slot_id"].as_str().unwrap());

  let (status, _) = send(&app, Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, body) = send(&app, Method::DELETE, &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn cancelled_is_terminal() {
  let (app, base) = app().await;
  let slot = create(&app, &base, period("08:00", "08:45")).await;
  let uri = format!("{base}/slots/{}/status", slot["slot_id"].as_str().unwrap());

  let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "cancelled" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "cancelled");

  let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "status": "done" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ─── Day ─────────────────────────────────────────────────────────────────────

fn generate_body(confirm: bool) -> Value {
  json!({
    "start_time": "08:00",
    "num_periods": 3,
    "period_duration_min": 45,
    "breaks": [{ "after_period": 2, "duration_min": 15, "name": "Break" }],
    "confirm": confirm,
  })
}

#[tokio::test]
async fn generate_requires_confirmation() {
  let (app, base) = app().await;
  create(&app, &base, period("12:00", "12:45")).await;

  let (status, body) = send(&app, Method::POST, &format!("{base}/generate"), Some(generate_body(false))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("confirm"));

  let (_, view) = send(&app, Method::GET, &base, None).await;
  assert_eq!(times(&view).len(), 1);
}

#[tokio::test]
async fn generate_replaces_the_day() {
  let (app, base) = app().await;
  create(&app, &base, period("12:00", "12:45")).await;

  let (status, slots) = send(&app, Method::POST, &format!("{base}/generate"), Some(generate_body(true))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(slots.as_array().unwrap().len(), 4);
  assert_eq!(slots[2]["slot_type"], "break");

  let (_, view) = send(&app, Method::GET, &base, None).await;
  assert_eq!(
    times(&view),
    vec![
      t3(1, "08:00", "08:45"),
      t3(2, "08:45", "09:30"),
      t3(3, "09:30", "09:45"),
      t3(4, "09:45", "10:30"),
    ]
  );
}

#[tokio::test]
async fn renumber_on_a_dense_day_changes_nothing() {
  let (app, base) = app().await;
  create(&app, &base, period("08:00", "08:45")).await;

  let (status, body) = send(&app, Method::POST, &format!("{base}/renumber"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "renumbered": 0 }));
}

#[tokio::test]
async fn malformed_date_is_rejected() {
  let (app, _) = app().await;
  let uri = format!("/schools/SCH01/classes/{}/days/14-03-2025", Uuid::new_v4());

  let (status, _) = send(&app, Method::GET, &uri, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Progress ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn taught_round_trip() {
  let (app, base) = app().await;
  let slot = create(&app, &base, period("08:00", "08:45")).await;
  let id = slot["slot_id"].as_str().unwrap();
  let uri = format!("{base}/slots/{id}/taught");

  let (status, record) = send(&app, Method::POST, &uri, None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(record["timetable_slot_id"], id);

  let (_, body) = send(&app, Method::GET, &uri, None).await;
  assert_eq!(body, json!({ "taught": true }));

  let (_, view) = send(&app, Method::GET, &base, None).await;
  assert_eq!(view["taught"], json!([id]));

  let (_, body) = send(&app, Method::DELETE, &uri, None).await;
  assert_eq!(body, json!({ "removed": 1 }));

  let (_, body) = send(&app, Method::GET, &uri, None).await;
  assert_eq!(body, json!({ "taught": false }));
}

#[tokio::test]
async fn breaks_cannot_be_taught() {
  let (app, base) = app().await;
  let slot = create(
    &app,
    &base,
    json!({ "slot_type": "break", "name": "Lunch", "start_time": "12:00", "end_time": "12:30" }),
  )
  .await;
  let uri = format!("{base}/slots/{}/taught", slot["slot_id"].as_str().unwrap());

  let (status, _) = send(&app, Method::POST, &uri, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
