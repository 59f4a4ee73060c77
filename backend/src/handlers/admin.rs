//! Admin HTTP handlers; routed behind `require_admin`

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::services::admin::AdminCropQuery;
use crate::services::AdminService;
use crate::AppState;

fn admin_service(state: &AppState) -> AdminService {
    AdminService::new(state.db.clone(), state.events.clone())
}

/// All accounts
pub async fn admin_list_users(State(state): State<AppState>) -> impl IntoResponse {
    match admin_service(&state).list_users().await {
        Ok(users) => (StatusCode::OK, Json(serde_json::json!({ "users": users }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// All crops, filtered by `status` and `owner_id`
pub async fn admin_list_crops(
    State(state): State<AppState>,
    Query(query): Query<AdminCropQuery>,
) -> impl IntoResponse {
    match admin_service(&state).list_all_crops(&query).await {
        Ok(crops) => (StatusCode::OK, Json(serde_json::json!({ "crops": crops }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete any crop
pub async fn admin_delete_crop(State(state): State<AppState>, Path(crop_id): Path<Uuid>) -> impl IntoResponse {
    match admin_service(&state).delete_any_crop(crop_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// CSV download of the filtered crops
pub async fn admin_export_crops(
    State(state): State<AppState>,
    Query(query): Query<AdminCropQuery>,
) -> impl IntoResponse {
    match admin_service(&state).export_crops_csv(&query).await {
        Ok(bytes) => {
            let disposition = format!(
                "attachment; filename=\"crops-{}.csv\"",
                Utc::now().format("%Y%m%d")
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
