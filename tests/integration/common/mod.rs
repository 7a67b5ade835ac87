//! Shared fixtures: a six-bus Texas grid and an app wired around it.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use blackout_api::config::Config;
use blackout_api::constants::api::GRID_REGION;
use blackout_api::models::grid::{GridData, GridEdge, GridNode};
use blackout_api::router::build_router;
use blackout_api::services::grid::classify_weather_zone;
use blackout_api::services::GridGraph;
use blackout_api::startup::build_state;

/// Nothing listens on the discard port, so live weather always falls back.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

fn node(id: &str, lat: f64, lon: f64, base: f64, cap: f64, kv: f64) -> GridNode {
    GridNode {
        id: id.to_string(),
        bus_num: 0,
        lat,
        lon,
        base_load_mw: base,
        capacity_mw: cap,
        voltage_kv: kv,
        region: GRID_REGION.to_string(),
        weather_zone: classify_weather_zone(lat, lon).to_string(),
        area: 1,
        grid_zone: 1,
        substation: None,
        source: "activsg2000".to_string(),
    }
}

fn edge(from: &str, to: &str) -> GridEdge {
    GridEdge {
        from_bus: from.to_string(),
        to_bus: to.to_string(),
        capacity_mva: 100.0,
        impedance: 0.01,
    }
}

/// Under the Uri storm D1 and A1 overload at hour 36 and push D2 over;
/// on a normal day every bus stays well below capacity.
pub fn test_grid() -> GridGraph {
    GridGraph::from_data(GridData {
        nodes: vec![
            node("D1", 32.78, -96.80, 100.0, 300.0, 345.0),
            node("D2", 32.90, -96.90, 50.0, 400.0, 138.0),
            node("H1", 29.76, -95.37, 80.0, 500.0, 345.0),
            node("H2", 29.80, -95.40, 40.0, 1000.0, 138.0),
            node("A1", 30.27, -97.74, 60.0, 200.0, 138.0),
            node("S1", 29.42, -98.49, 30.0, 600.0, 69.0),
        ],
        edges: vec![
            edge("D1", "D2"),
            edge("D2", "A1"),
            edge("A1", "S1"),
            edge("A1", "H1"),
            edge("H1", "H2"),
        ],
    })
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.environment = "test".to_string();
    config.weather.open_meteo_url = UNREACHABLE_URL.to_string();
    config.event_stream_interval_ms = 1;
    config
}

pub fn app_with(config: Config) -> Router {
    let state = build_state(&config, Arc::new(test_grid()), None).expect("state");
    build_router(state)
}

pub fn app() -> Router {
    app_with(test_config())
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}
