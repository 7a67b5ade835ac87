//! Wholesale price forecasts.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::Utc;

use super::extractors::ApiQuery;
use super::response::ApiResponse;
use crate::app_state::AppState;
use crate::constants::forecast::PRICE_HORIZON_HOURS;
use crate::models::price::{
    ModelInfoResponse, PriceForecastResponse, PriceQuery, PricingMode, RegionPriceQuery,
};

/// Build the `/api/forecast` routes
pub fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/prices", get(get_prices))
        .route("/prices/model-info", get(get_model_info))
        .route("/prices/{region}", get(get_region_prices))
}

async fn price_forecast(
    state: &AppState,
    region: &str,
    mode: PricingMode,
    scenario: &str,
    zone: Option<&str>,
) -> PriceForecastResponse {
    let region = region.to_ascii_uppercase();
    let now = Utc::now();
    let prices = match zone {
        Some(zone) => {
            state
                .prices
                .zone_forecast(&region, zone, mode, scenario, PRICE_HORIZON_HOURS, now)
                .await
        }
        None => state
            .prices
            .forecast(&region, mode, scenario, PRICE_HORIZON_HOURS, now),
    };

    PriceForecastResponse {
        region,
        start_time: now,
        mode: state.prices.effective_mode(mode),
        prices,
    }
}

/// 48-hour price forecast for a region given in the query
#[utoipa::path(
    get,
    path = "/api/forecast/prices",
    tag = "forecast",
    params(PriceQuery),
    responses((status = 200, description = "Hourly prices", body = PriceForecastResponse))
)]
pub async fn get_prices(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PriceQuery>,
) -> ApiResponse<PriceForecastResponse> {
    ApiResponse::success(
        price_forecast(&state, &query.region, query.mode, &query.scenario, query.zone.as_deref())
            .await,
    )
}

/// 48-hour price forecast for the region in the path
#[utoipa::path(
    get,
    path = "/api/forecast/prices/{region}",
    tag = "forecast",
    params(("region" = String, Path, description = "ISO such as ERCOT or CAISO"), RegionPriceQuery),
    responses((status = 200, description = "Hourly prices", body = PriceForecastResponse))
)]
pub async fn get_region_prices(
    State(state): State<AppState>,
    Path(region): Path<String>,
    ApiQuery(query): ApiQuery<RegionPriceQuery>,
) -> ApiResponse<PriceForecastResponse> {
    ApiResponse::success(
        price_forecast(&state, &region, query.mode, &query.scenario, query.zone.as_deref()).await,
    )
}

/// Metadata of the loaded price model
#[utoipa::path(
    get,
    path = "/api/forecast/prices/model-info",
    tag = "forecast",
    responses((status = 200, description = "Model metadata", body = ModelInfoResponse))
)]
pub async fn get_model_info(State(state): State<AppState>) -> ApiResponse<ModelInfoResponse> {
    ApiResponse::success(state.prices.model_info())
}
