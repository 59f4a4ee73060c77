//! Crop library HTTP handlers

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{care_calendar, care_guide, crop_suggestions, days_planted_display, CalendarEntry, CareGuide, TaskDerivation};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::handlers::weather::weather_service;
use crate::middleware::CurrentUser;
use crate::services::crop::{CreateCropInput, CreateGrowthEventInput, CropQuery, CropRecord, CropStats, UpdateCropInput};
use crate::services::weather::LocationQuery;
use crate::services::{CropService, ProfileService, TaskService};
use crate::AppState;

/// Crop with its care guide for the detail page
#[derive(Debug, Serialize)]
pub struct CropDetail {
    #[serde(flatten)]
    pub crop: CropRecord,
    pub days_planted: i64,
    pub care: CareGuide,
}

#[derive(Debug, Serialize)]
pub struct CropCalendar {
    pub crop_id: Uuid,
    pub date_planted: NaiveDate,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub location: Option<String>,
    pub crops: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: CropStats,
    #[serde(flatten)]
    pub today: TaskDerivation,
}

/// Library listing with search, status filter and sort
pub async fn list_crops(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<CropQuery>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.list_crops(current_user.0.user_id, &query).await {
        Ok(crops) => (StatusCode::OK, Json(serde_json::json!({ "crops": crops }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a crop with its care guide
pub async fn get_crop(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(crop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.get_crop(current_user.0.user_id, crop_id).await {
        Ok(crop) => {
            let today = state.config.weather.local_today(Utc::now());
            let detail = CropDetail {
                days_planted: days_planted_display(crop.date_planted, today),
                care: care_guide(&crop.name),
                crop,
            };
            (StatusCode::OK, Json(detail)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Add a crop
pub async fn create_crop(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCropInput>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.create_crop(current_user.0.user_id, input).await {
        Ok(crop) => (StatusCode::CREATED, Json(crop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a crop
pub async fn update_crop(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(crop_id): Path<Uuid>,
    Json(input): Json<UpdateCropInput>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.update_crop(current_user.0.user_id, crop_id, input).await {
        Ok(crop) => (StatusCode::OK, Json(crop)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a crop
pub async fn delete_crop(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(crop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.delete_crop(current_user.0.user_id, crop_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Growth timeline, newest first
pub async fn list_timeline(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(crop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.list_growth_events(current_user.0.user_id, crop_id).await {
        Ok(events) => (StatusCode::OK, Json(serde_json::json!({ "events": events }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a growth event; the crop status follows it
pub async fn add_timeline_event(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(crop_id): Path<Uuid>,
    Json(input): Json<CreateGrowthEventInput>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.add_growth_event(current_user.0.user_id, crop_id, input).await {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Starter care calendar for a crop
pub async fn crop_calendar(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(crop_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    match service.get_crop(current_user.0.user_id, crop_id).await {
        Ok(crop) => {
            let calendar = CropCalendar {
                crop_id: crop.id,
                date_planted: crop.date_planted,
                entries: care_calendar(&crop.name, crop.date_planted),
            };
            (StatusCode::OK, Json(calendar)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Crops suited to a location; defaults to the caller's profile location
pub async fn crop_suggestions_for(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SuggestionQuery>,
) -> impl IntoResponse {
    let location = match query.location {
        Some(location) => Some(location),
        None => match ProfileService::new(state.db.clone()).get_user(current_user.0.user_id).await {
            Ok(user) => user.location,
            Err(e) => return e.into_response(),
        },
    };

    let crops = location
        .as_deref()
        .map(crop_suggestions)
        .unwrap_or_default()
        .iter()
        .map(|c| c.to_string())
        .collect();

    (StatusCode::OK, Json(SuggestionResponse { location, crops })).into_response()
}

/// Counts plus today's care tasks
pub async fn dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(location): Query<LocationQuery>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone(), state.events.clone());

    let records = match service.all_crops(current_user.0.user_id).await {
        Ok(records) => records,
        Err(e) => return e.into_response(),
    };

    let crops: Vec<_> = records.iter().map(|r| r.to_crop()).collect();
    let today = TaskService::new(state.db.clone())
        .derived_tasks(&crops, &weather_service(&state), &state.config.weather, &location)
        .await;

    let response = DashboardResponse {
        stats: CropStats::from_records(&records),
        today,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Server-sent crop changes visible to the caller
pub async fn crop_events(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user = current_user.0;
    tracing::debug!(user_id = %user.user_id, "Crop event subscriber connected");

    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |message| match message {
        Ok(change) if change.visible_to(user.user_id, user.is_admin()) => {
            match Event::default().event(change.kind.as_str()).json_data(&change) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::warn!("Failed to encode crop change: {}", e);
                    None
                }
            }
        }
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Crop event subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
