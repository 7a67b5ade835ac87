//! Grid, simulation and operational endpoints against the six-bus fixture grid.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, get, post_json};

#[tokio::test]
async fn test_health_reports_grid_size() {
    let app = app();
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["grid"]["nodes"], 6);
    assert_eq!(body["grid"]["edges"], 5);
    // Health is served bare, without the response envelope
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn test_metrics_unavailable_without_recorder() {
    let app = app();
    let (status, _) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_topology_wrapped_in_envelope() {
    let app = app();
    let (status, body) = get(&app, "/api/grid/topology").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["meta"]["timestamp"].is_string());
    assert_eq!(body["data"]["total_nodes"], 6);
    assert_eq!(body["data"]["total_edges"], 5);
    assert_eq!(body["data"]["region"], "ERCOT");
}

#[tokio::test]
async fn test_status_defaults_to_uri_peak() {
    let app = app();
    let (status, body) = get(&app, "/api/grid/status").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["scenario"], "uri_2021");
    assert_eq!(data["forecast_hour"], 36);
    assert_eq!(data["summary"]["total_nodes"], 6);
    assert_eq!(data["summary"]["failed_count"], 2);

    let failed: Vec<&str> = data["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["status"] == "failed")
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(failed, vec!["D1", "A1"]);
}

#[tokio::test]
async fn test_status_normal_day_is_nominal() {
    let app = app();
    let (status, body) = get(&app, "/api/grid/status?scenario=normal&forecast_hour=12").await;

    assert_eq!(status, StatusCode::OK);
    let summary = &body["data"]["summary"];
    assert_eq!(summary["failed_count"], 0);
    assert_eq!(summary["nominal_count"], 6);
    assert_eq!(summary["cascade_probability"], 0.0);
}

#[tokio::test]
async fn test_status_rejects_out_of_range_hour() {
    let app = app();
    let (status, body) = get(&app, "/api/grid/status?forecast_hour=99").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VAL_3001");
    assert_eq!(body["error"]["field"], "forecast_hour");
}

#[tokio::test]
async fn test_status_rejects_malformed_hour() {
    let app = app();
    let (status, _) = get(&app, "/api/grid/status?forecast_hour=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_node_detail_and_not_found() {
    let app = app();

    let (status, body) = get(&app, "/api/grid/nodes/D2").await;
    assert_eq!(status, StatusCode::OK);
    let mut neighbours: Vec<&str> = body["data"]["connected_nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    neighbours.sort();
    assert_eq!(neighbours, vec!["A1", "D1"]);

    let (status, body) = get(&app, "/api/grid/nodes/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RES_4001");
}

#[tokio::test]
async fn test_cascade_probability_covers_other_regions() {
    let app = app();
    let (status, body) = get(&app, "/api/grid/cascade-probability").await;

    assert_eq!(status, StatusCode::OK);
    let probabilities = body["data"]["probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 7);
    assert_eq!(probabilities["ERCOT"], 1.0);
}

#[tokio::test]
async fn test_hotspots_and_arcs() {
    let app = app();

    let (status, body) = get(&app, "/api/grid/hotspots?scenario=uri").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["hotspots"].is_array());

    let (status, body) = get(&app, "/api/grid/arcs?scenario=uri").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["arcs"].is_array());
}

#[tokio::test]
async fn test_uri_cascade_spreads_from_overloaded_buses() {
    let app = app();
    let (status, body) = post_json(&app, "/api/simulate/cascade", json!({ "scenario": "uri" })).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["failed_node_ids"], json!(["A1", "D1", "D2"]));
    assert_eq!(data["total_failed_nodes"], 3);
    assert_eq!(data["total_nodes"], 6);
    assert_eq!(data["final_node_states"]["D2"]["status"], "failed");
    assert_eq!(data["final_node_states"]["H2"]["status"], "nominal");
}

#[tokio::test]
async fn test_normal_cascade_has_no_failures() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/simulate/cascade",
        json!({ "scenario": "normal", "forecast_hour": 12 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_failed_nodes"], 0);
    assert_eq!(body["data"]["cascade_depth"], 0);
}

#[tokio::test]
async fn test_cascade_rejects_invalid_body() {
    let app = app();
    let (status, _) = post_json(
        &app,
        "/api/simulate/cascade",
        json!({ "scenario": "uri", "forecast_hour": 72 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app();
    let (status, body) = get(&app, "/api/docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/simulate/cascade"].is_object());
    assert!(body["paths"]["/api/grid/status"].is_object());
}

#[tokio::test]
async fn test_request_id_echoed() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_error_body_carries_request_id() {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/grid/nodes/NOPE")
                .header("x-request-id", "req-404")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "req-404");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], "req-404");
}

#[tokio::test]
async fn test_generated_request_id_matches_error_body() {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/grid/status?forecast_hour=99")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let header = response.headers()["x-request-id"].to_str().unwrap().to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], header.as_str());
}
