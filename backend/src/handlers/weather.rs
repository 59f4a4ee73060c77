//! Weather HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::external::WeatherClient;
use crate::services::weather::LocationQuery;
use crate::services::WeatherService;
use crate::AppState;

/// Weather service over the shared HTTP client
pub fn weather_service(state: &AppState) -> WeatherService {
    let client = WeatherClient::new(state.http.clone(), &state.config.weather);
    WeatherService::new(state.db.clone(), client, state.config.weather.clone())
}

/// Current conditions for `lat`/`lon`, `city` or the default location
pub async fn current_weather(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> impl IntoResponse {
    match weather_service(&state).current(&query).await {
        Ok(weather) => (StatusCode::OK, Json(weather)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Five-day forecast
pub async fn weather_forecast(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> impl IntoResponse {
    match weather_service(&state).forecast(&query).await {
        Ok(forecast) => (StatusCode::OK, Json(forecast)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Gardening tips
pub async fn weather_tips(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> impl IntoResponse {
    match weather_service(&state).tips(&query).await {
        Ok(tips) => (StatusCode::OK, Json(tips)).into_response(),
        Err(e) => e.into_response(),
    }
}
