//! Price forecasts, consumer optimisation and the utility operator views.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, get, post_json};

#[tokio::test]
async fn test_prices_fall_back_to_rules_without_model() {
    let app = app();
    let (status, body) = get(&app, "/api/forecast/prices?region=ercot&mode=hybrid").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["region"], "ERCOT");
    assert_eq!(data["mode"], "rules");

    let prices = data["prices"].as_array().unwrap();
    assert_eq!(prices.len(), 48);
    assert_eq!(prices[0]["hour"], 0);
    assert!(prices.iter().all(|p| p["price_mwh"].as_f64().unwrap() > 0.0));
}

#[tokio::test]
async fn test_uri_prices_reach_the_cap() {
    let app = app();
    let (_, body) = get(&app, "/api/forecast/prices/ERCOT?scenario=uri").await;

    let peak = body["data"]["prices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price_mwh"].as_f64().unwrap())
        .fold(0.0_f64, f64::max);
    assert!(peak > 1000.0, "peak {} should be storm pricing", peak);
}

#[tokio::test]
async fn test_zone_prices_carry_zone() {
    let app = app();
    let (status, body) = get(&app, "/api/forecast/prices/ercot?zone=Coast").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["region"], "ERCOT");
    let prices = body["data"]["prices"].as_array().unwrap();
    assert!(prices.iter().all(|p| p["zone"] == "Coast"));
}

#[tokio::test]
async fn test_model_info_without_model() {
    let app = app();
    let (status, body) = get(&app, "/api/forecast/prices/model-info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["model_loaded"], false);
}

#[tokio::test]
async fn test_invalid_pricing_mode_rejected() {
    let app = app();
    let (status, _) = get(&app, "/api/forecast/prices?mode=guess").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_premade_profiles_listed() {
    let app = app();
    let (status, body) = get(&app, "/api/consumer/profiles").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["profiles"][0]["profile_id"], "martinez-family");
    assert_eq!(body["data"]["profiles"][0]["profile_type"], "pre_made");
}

#[tokio::test]
async fn test_custom_profile_created_and_optimised() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/consumer/profiles/custom",
        json!({
            "name": "Garage Lab",
            "household_size": 2,
            "square_footage": 1400,
            "has_ev": true,
            "avg_monthly_kwh": 800.0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let profile = &body["data"];
    assert_eq!(profile["profile_type"], "custom");
    assert_eq!(profile["hvac_type"], "central_ac");
    let id = profile["profile_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("custom-"));

    let (_, body) = get(&app, "/api/consumer/profiles").await;
    assert_eq!(body["data"]["total"], 5);

    let (status, body) = get(&app, &format!("/api/consumer/recommendations/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile"]["name"], "Garage Lab");
}

#[tokio::test]
async fn test_custom_profile_validation() {
    let app = app();
    let (status, body) = post_json(
        &app,
        "/api/consumer/profiles/custom",
        json!({
            "name": "Too Many",
            "household_size": 0,
            "square_footage": 1400,
            "avg_monthly_kwh": 800.0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "household_size");
}

#[tokio::test]
async fn test_recommendations_for_storm() {
    let app = app();
    let (status, body) = get(
        &app,
        "/api/consumer/recommendations/martinez-family?scenario=uri&region=ercot",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["profile"]["profile_id"], "martinez-family");
    assert!(data["optimized_schedule"].as_array().unwrap().len() >= 3);
    assert!(data["total_savings"].as_f64().unwrap() >= 0.0);
    assert!(data["readiness_score"].as_u64().unwrap() <= 100);
}

#[tokio::test]
async fn test_unknown_profile_not_found() {
    let app = app();

    let (status, body) = get(&app, "/api/consumer/recommendations/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RES_4001");

    let (status, _) = get(&app, "/api/consumer/savings/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_savings_summary() {
    let app = app();
    let (status, body) = get(&app, "/api/consumer/savings/default-eco-home").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile_id"], "default-eco-home");
    assert_eq!(body["data"]["period_hours"], 48);
}

#[tokio::test]
async fn test_overview_has_five_regions() {
    let app = app();
    let (status, body) = get(&app, "/api/utility/overview?scenario=uri").await;

    assert_eq!(status, StatusCode::OK);
    let regions = body["data"]["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 5);

    let (status, body) = get(&app, "/api/utility/overview/dal?scenario=uri").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["region_id"], "DAL");

    let (status, _) = get(&app, "/api/utility/overview/XYZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_crews_and_weather_events() {
    let app = app();

    let (status, body) = get(&app, "/api/utility/crews?scenario=uri").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["crews"].as_array().unwrap().len(), 7);

    let (status, body) = get(&app, "/api/utility/weather-events?scenario=uri").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_array());
}

#[tokio::test]
async fn test_events_timeline_and_stream() {
    let app = app();

    let (status, body) = get(&app, "/api/utility/events?scenario=uri").await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"].as_array().unwrap().len();
    assert!(events > 0);

    let (status, body) = get(&app, "/api/utility/events/stream?scenario=uri").await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    let frames: Vec<&str> = text
        .lines()
        .filter_map(|l| l.strip_prefix("data: "))
        .collect();
    assert_eq!(frames.len(), events + 1);
    assert_eq!(frames.last().copied(), Some(r#"{"done":true}"#));
}

#[tokio::test]
async fn test_outcomes_compare_mitigation() {
    let app = app();
    let (status, body) = get(&app, "/api/utility/outcomes?scenario=uri").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["without_blackout"]["failed_nodes"], 3);
    assert!(
        data["with_blackout"]["failed_nodes"].as_u64().unwrap()
            <= data["without_blackout"]["failed_nodes"].as_u64().unwrap()
    );
    assert_eq!(data["without_blackout"]["peak_price_mwh"], 9000.0);
}

#[tokio::test]
async fn test_device_alerts_for_storm() {
    let app = app();
    let (status, body) = get(
        &app,
        "/api/consumer/alerts/martinez-family?scenario=uri&region=ercot",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["profile_id"], "martinez-family");
    assert_eq!(data["region"], "ERCOT");

    let alerts = data["alerts"].as_array().unwrap();
    assert_eq!(alerts[0]["device_type"], "hvac");
    let battery = alerts.iter().find(|a| a["device_type"] == "battery").unwrap();
    assert_eq!(battery["severity"], "critical");
    assert_eq!(battery["recommended_action"]["action"], "CHARGE_FULL");
    assert!(alerts.iter().all(|a| a["device_type"] != "ev_charger"));

    let (status, _) = get(&app, "/api/consumer/alerts/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
