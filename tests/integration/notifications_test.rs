//! ntfy relay endpoints against mocked Supabase and ntfy servers.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{app_with, post_json, test_config};

async fn mock_profile(server: &MockServer, profile_id: &str, topic: Option<&str>) {
    let rows = match topic {
        Some(t) => json!([{ "ntfy_topic": t }]),
        None => json!([]),
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/consumer_profiles"))
        .and(query_param("id", format!("eq.{}", profile_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

fn app_for(server: &MockServer) -> axum::Router {
    let mut config = test_config();
    config.notifications.ntfy_server = server.uri();
    config.notifications.supabase_url = Some(server.uri());
    config.notifications.supabase_anon_key = Some("anon-key".to_string());
    app_with(config)
}

#[tokio::test]
async fn test_confirmation_relayed_to_profile_topic() {
    let server = MockServer::start().await;
    mock_profile(&server, "martinez-family", Some("blackout-martinez")).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({
            "topic": "blackout-martinez",
            "title": "✅ Device Adjusted"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, body) = post_json(
        &app,
        "/api/notifications/confirm",
        json!({
            "profile_id": "martinez-family",
            "alert_title": "Freeze warning",
            "action_taken": "ACCEPT",
            "success": true,
            "device_type": "hvac",
            "savings_added": 2.5,
            "savings_pending": 7.5
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "message": "Notification sent" }));
}

#[tokio::test]
async fn test_payout_without_topic_fails() {
    let server = MockServer::start().await;
    mock_profile(&server, "default-apartment", None).await;

    let app = app_for(&server);
    let (status, body) = post_json(
        &app,
        "/api/notifications/payout",
        json!({ "profile_id": "default-apartment", "amount_usd": 10.0, "tx_hash": "ABC123" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "EXT_8003");
}

#[tokio::test]
async fn test_payout_requires_tx_hash() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let (status, _) = post_json(
        &app,
        "/api/notifications/payout",
        json!({ "profile_id": "p-1", "amount_usd": 10.0, "tx_hash": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_broadcast_counts_deliveries() {
    let server = MockServer::start().await;
    mock_profile(&server, "p-1", Some("topic-1")).await;
    mock_profile(&server, "p-2", Some("topic-2")).await;
    mock_profile(&server, "p-3", None).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, body) = post_json(
        &app,
        "/api/notifications/broadcast",
        json!({
            "alerts": [
                { "profile_id": "p-1", "alert_type": "weather_hvac", "title": "Freeze" },
                { "profile_id": "p-2", "alert_type": "weather_battery" },
                { "profile_id": "p-3", "alert_type": "weather_ev" },
                { "alert_type": "weather_hvac" },
                { "profile_id": "p-1", "alert_type": "grid_stress" }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": 2, "failed": 1 }));
}

#[tokio::test]
async fn test_broadcast_without_directory_counts_failures() {
    let mut config = test_config();
    config.notifications.supabase_url = None;
    config.notifications.supabase_anon_key = None;
    let app = app_with(config);

    let (status, body) = post_json(
        &app,
        "/api/notifications/broadcast",
        json!({ "alerts": [{ "profile_id": "p-1", "alert_type": "weather_hvac" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": 0, "failed": 1 }));
}

#[tokio::test]
async fn test_broadcast_rejects_more_than_500_alerts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app_for(&server);

    let alerts: Vec<_> = (0..501)
        .map(|i| json!({ "profile_id": format!("p-{}", i), "alert_type": "weather_hvac" }))
        .collect();
    let (status, body) = post_json(
        &app,
        "/api/notifications/broadcast",
        json!({ "alerts": alerts }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "alerts");
}
