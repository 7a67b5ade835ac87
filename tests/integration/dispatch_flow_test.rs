//! Crew dispatch lifecycle: init from a Uri cascade, recommend, dispatch, tick.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{app, get, post_empty, post_json};

const DISPATCH: &str = "/api/utility/crews/dispatch";

fn crews_with_status<'a>(status: &'a Value, wanted: &str) -> Vec<&'a str> {
    status["data"]["crews"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["status"] == wanted)
        .map(|c| c["crew_id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_status_empty_before_init() {
    let app = app();
    let (status, body) = get(&app, &format!("{}/status", DISPATCH)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignments"], json!([]));
    assert_eq!(body["data"]["total_dispatched"], 0);
}

#[tokio::test]
async fn test_init_loads_roster_and_failures() {
    let app = app();
    let (status, body) = post_empty(&app, &format!("{}/init?scenario=uri", DISPATCH)).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["status"], "initialized");
    assert_eq!(data["crews_loaded"], 7);
    assert_eq!(data["failed_nodes"], 3);

    let (_, status) = get(&app, &format!("{}/status", DISPATCH)).await;
    assert_eq!(crews_with_status(&status, "standby").len(), 7);
}

#[tokio::test]
async fn test_normal_day_has_nothing_to_repair() {
    let app = app();
    let (_, body) = post_empty(&app, &format!("{}/init?scenario=normal", DISPATCH)).await;
    assert_eq!(body["data"]["crews_loaded"], 3);
    assert_eq!(body["data"]["failed_nodes"], 0);

    let (_, body) = get(&app, &format!("{}/recommend", DISPATCH)).await;
    assert_eq!(body["data"]["assignments"], json!([]));
    assert_eq!(body["data"]["avg_eta_minutes"], 0.0);
}

#[tokio::test]
async fn test_recommend_covers_every_failed_node_without_dispatching() {
    let app = app();
    post_empty(&app, &format!("{}/init?scenario=uri", DISPATCH)).await;

    let (status, body) = get(&app, &format!("{}/recommend", DISPATCH)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_failed_nodes"], 3);
    assert_eq!(data["total_crews_available"], 7);
    assert_eq!(data["coverage_pct"], 1.0);
    assert_eq!(data["unassigned_nodes"], json!([]));

    let assignments = data["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 3);
    assert!(assignments.iter().all(|a| a["status"] == "dispatched"));
    let mut targets: Vec<&str> = assignments
        .iter()
        .map(|a| a["target_node_id"].as_str().unwrap())
        .collect();
    targets.sort();
    assert_eq!(targets, vec!["A1", "D1", "D2"]);

    let (_, status) = get(&app, &format!("{}/status", DISPATCH)).await;
    assert_eq!(status["data"]["assignments"], json!([]));
}

#[tokio::test]
async fn test_dispatch_all_then_tick() {
    let app = app();
    post_empty(&app, &format!("{}/init?scenario=uri", DISPATCH)).await;

    let (status, body) = post_empty(&app, &format!("{}/all", DISPATCH)).await;
    assert_eq!(status, StatusCode::OK);
    let created = body["data"].as_array().unwrap();
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|a| a["status"] == "en_route"));
    assert!(created.iter().all(|a| a["dispatched_at"].is_string()));

    let (_, status) = get(&app, &format!("{}/status", DISPATCH)).await;
    assert_eq!(status["data"]["total_dispatched"], 3);
    assert_eq!(crews_with_status(&status, "en_route").len(), 3);

    // Every failed node is now targeted
    let (_, body) = get(&app, &format!("{}/recommend", DISPATCH)).await;
    assert_eq!(body["data"]["total_failed_nodes"], 0);

    let (status, body) = post_empty(&app, &format!("{}/tick", DISPATCH)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignments"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_manual_dispatch_rules() {
    let app = app();
    post_empty(&app, &format!("{}/init?scenario=uri", DISPATCH)).await;

    let (status, body) = post_json(
        &app,
        DISPATCH,
        json!({ "crew_id": "CREW-TX-17", "target_node_id": "D1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["crew_id"], "CREW-TX-17");
    assert_eq!(body["data"]["target_node_id"], "D1");
    assert_eq!(body["data"]["status"], "en_route");
    assert!(body["data"]["eta_minutes"].as_u64().unwrap() > 0);

    // Already en route
    let (status, body) = post_json(
        &app,
        DISPATCH,
        json!({ "crew_id": "CREW-TX-17", "target_node_id": "A1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DSP_5002");

    let (status, body) = post_json(
        &app,
        DISPATCH,
        json!({ "crew_id": "CREW-XX-99", "target_node_id": "D1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DSP_5001");

    let (status, body) = post_json(
        &app,
        DISPATCH,
        json!({ "crew_id": "CREW-TX-42", "target_node_id": "H2" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DSP_5003");
}

#[tokio::test]
async fn test_dispatch_requires_both_ids() {
    let app = app();
    let (status, _) = post_json(&app, DISPATCH, json!({ "crew_id": "CREW-TX-17" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_live_init_runs_as_normal_day() {
    let app = app();
    let (status, body) = post_empty(&app, &format!("{}/init?scenario=live", DISPATCH)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["crews_loaded"], 3);
    assert_eq!(body["data"]["failed_nodes"], 0);

    let (_, status) = get(&app, &format!("{}/status", DISPATCH)).await;
    assert_eq!(crews_with_status(&status, "standby").len(), 3);
}
