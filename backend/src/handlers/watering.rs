//! Watering log HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::handlers::weather::weather_service;
use crate::middleware::CurrentUser;
use crate::services::watering::LogWateringInput;
use crate::services::weather::LocationQuery;
use crate::services::WateringService;
use crate::AppState;

/// The caller's watering logs
pub async fn list_watering_logs(State(state): State<AppState>, current_user: CurrentUser) -> impl IntoResponse {
    let service = WateringService::new(state.db.clone());

    match service.list_logs(current_user.0.user_id).await {
        Ok(logs) => (StatusCode::OK, Json(serde_json::json!({ "logs": logs }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Log a watering; advice is attached when the weather can be fetched
pub async fn log_watering(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(location): Query<LocationQuery>,
    Json(input): Json<LogWateringInput>,
) -> impl IntoResponse {
    let weather = weather_service(&state);
    let current = match weather.resolve_location(&location).await {
        Ok(coords) => weather.snapshot(&coords).await,
        Err(e) => Err(e),
    };

    let snapshot = match current {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!("Logging watering without weather advice: {}", e);
            None
        }
    };

    let service = WateringService::new(state.db.clone());
    match service.log_watering(current_user.0.user_id, input, snapshot.as_ref()).await {
        Ok(log) => (StatusCode::CREATED, Json(log)).into_response(),
        Err(e) => e.into_response(),
    }
}
