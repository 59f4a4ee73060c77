//! Task HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::handlers::weather::weather_service;
use crate::middleware::CurrentUser;
use crate::services::task::CreateTaskInput;
use crate::services::weather::LocationQuery;
use crate::services::{CropService, TaskService};
use crate::AppState;

/// Today's care tasks derived from the caller's crops and the weather
pub async fn derived_tasks(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(location): Query<LocationQuery>,
) -> impl IntoResponse {
    let crop_service = CropService::new(state.db.clone(), state.events.clone());

    let records = match crop_service.all_crops(current_user.0.user_id).await {
        Ok(records) => records,
        Err(e) => return e.into_response(),
    };
    let crops: Vec<_> = records.iter().map(|r| r.to_crop()).collect();

    let derivation = TaskService::new(state.db.clone())
        .derived_tasks(&crops, &weather_service(&state), &state.config.weather, &location)
        .await;

    (StatusCode::OK, Json(derivation)).into_response()
}

/// Stored tasks split into upcoming and reminders
pub async fn list_tasks(State(state): State<AppState>, current_user: CurrentUser) -> impl IntoResponse {
    let service = TaskService::new(state.db.clone());

    match service.list_tasks(current_user.0.user_id).await {
        Ok(buckets) => (StatusCode::OK, Json(buckets)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a stored task
pub async fn create_task(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTaskInput>,
) -> impl IntoResponse {
    let service = TaskService::new(state.db.clone());

    match service.create_task(current_user.0.user_id, input).await {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a stored task
pub async fn delete_task(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TaskService::new(state.db.clone());

    match service.delete_task(current_user.0.user_id, task_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark a stored task completed
pub async fn complete_task(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TaskService::new(state.db.clone());

    match service.complete_task(current_user.0.user_id, task_id).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Defer today's open care tasks to tomorrow when rain is expected
pub async fn reschedule_for_rain(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(location): Query<LocationQuery>,
) -> impl IntoResponse {
    let service = TaskService::new(state.db.clone());

    match service
        .reschedule_for_rain(
            current_user.0.user_id,
            &weather_service(&state),
            &state.config.weather,
            &location,
        )
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}
