//! End-to-end simulation sessions: cascade, prices, alerts and dispatch in one run.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{app, app_with, get, post_json, test_config};

const RUN: &str = "/api/orchestrate/run";

fn alert_types(session: &Value) -> Vec<&str> {
    session["data"]["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["alert_type"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_uri_run_completes_every_stage() {
    let app = app();
    let (status, body) = post_json(&app, RUN, json!({ "scenario": "uri" })).await;

    assert_eq!(status, StatusCode::OK);
    let summary = &body["data"];
    assert_eq!(summary["status"], "completed");
    assert_eq!(summary["grid_region"], "ERCOT");
    assert_eq!(summary["total_failed_nodes"], 3);
    assert_eq!(summary["crews_dispatched"], 3);
    assert!(summary["avg_eta_minutes"].as_f64().unwrap() > 0.0);
    assert!(summary["peak_price_mwh"].as_f64().unwrap() > 100.0);

    let id = summary["session_id"].as_str().unwrap();
    let (status, session) = get(&app, &format!("/api/orchestrate/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["data"]["status"], "completed");
    assert!(session["data"]["completed_at"].is_string());
    assert_eq!(
        session["data"]["alerts"].as_array().unwrap().len(),
        summary["alerts_generated"].as_u64().unwrap() as usize
    );

    let types = alert_types(&session);
    assert!(types.contains(&"cascade_warning"));
    assert!(types.contains(&"price_spike"));
    assert!(types.contains(&"weather_battery"));
}

#[tokio::test]
async fn test_uri_run_dispatches_crews() {
    let app = app();
    post_json(&app, RUN, json!({ "scenario": "uri", "forecast_hour": 36 })).await;

    let (_, status) = get(&app, "/api/utility/crews/dispatch/status").await;
    assert_eq!(status["data"]["total_dispatched"], 3);
}

#[tokio::test]
async fn test_normal_run_dispatches_nobody() {
    let app = app();
    let (status, body) = post_json(&app, RUN, json!({ "scenario": "normal", "forecast_hour": 12 })).await;

    assert_eq!(status, StatusCode::OK);
    let summary = &body["data"];
    assert_eq!(summary["total_failed_nodes"], 0);
    assert_eq!(summary["crews_dispatched"], 0);
    assert_eq!(summary["avg_eta_minutes"], 0.0);

    let id = summary["session_id"].as_str().unwrap();
    let (_, session) = get(&app, &format!("/api/orchestrate/sessions/{}", id)).await;
    assert!(!alert_types(&session).contains(&"cascade_warning"));
}

#[tokio::test]
async fn test_runs_listed_as_sessions() {
    let app = app();
    let (_, first) = post_json(&app, RUN, json!({ "scenario": "normal" })).await;
    let (_, second) = post_json(&app, RUN, json!({ "scenario": "uri" })).await;

    let (status, body) = get(&app, "/api/orchestrate/sessions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    let ids: Vec<&str> = body["data"]["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["session_id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&first["data"]["session_id"].as_str().unwrap()));
    assert!(ids.contains(&second["data"]["session_id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_unknown_session_not_found() {
    let (status, body) = get(&app(), "/api/orchestrate/sessions/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RES_4001");
}

#[tokio::test]
async fn test_forecast_hour_out_of_range_rejected() {
    let (status, body) = post_json(&app(), RUN, json!({ "forecast_hour": 48 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "forecast_hour");
}

#[tokio::test]
async fn test_household_alerts_pushed_to_topics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/consumer_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "ntfy_topic": "blackout-home" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.notifications.ntfy_server = server.uri();
    config.notifications.supabase_url = Some(server.uri());
    config.notifications.supabase_anon_key = Some("anon-key".to_string());
    let app = app_with(config);

    let (_, body) = post_json(&app, RUN, json!({ "scenario": "uri" })).await;
    let id = body["data"]["session_id"].as_str().unwrap();
    let (_, session) = get(&app, &format!("/api/orchestrate/sessions/{}", id)).await;

    let household = alert_types(&session)
        .iter()
        .filter(|t| t.starts_with("weather_"))
        .count();
    assert!(household > 0);
    assert_eq!(session["data"]["notifications_sent"], household);
    assert_eq!(session["data"]["notifications_failed"], 0);

    let pushes = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(pushes, household);
}
