//! Photo gallery HTTP handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ImageHostClient;
use crate::middleware::CurrentUser;
use crate::services::photo::PhotoUpload;
use crate::services::PhotoService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    pub crop_id: Option<Uuid>,
}

fn photo_service(state: &AppState) -> PhotoService {
    let image_host = ImageHostClient::new(state.http.clone(), &state.config.image_host);
    PhotoService::new(state.db.clone(), image_host)
}

/// Gallery, optionally for one crop
pub async fn list_photos(State(state): State<AppState>, Query(query): Query<PhotoQuery>) -> impl IntoResponse {
    match photo_service(&state).list_photos(query.crop_id).await {
        Ok(photos) => (StatusCode::OK, Json(serde_json::json!({ "photos": photos }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Multipart upload with a `file` part and an optional `crop_id` part
pub async fn upload_photo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> impl IntoResponse {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return e.into_response(),
    };

    match photo_service(&state).upload(current_user.0.user_id, upload).await {
        Ok(photo) => (StatusCode::CREATED, Json(photo)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a photo the caller uploaded, or any photo as admin
pub async fn delete_photo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(photo_id): Path<Uuid>,
) -> impl IntoResponse {
    match photo_service(&state).delete_photo(&current_user.0, photo_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn read_upload(mut multipart: Multipart) -> AppResult<PhotoUpload> {
    let mut file = None;
    let mut crop_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation("file", format!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("photo").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation("file", format!("Malformed upload: {}", e)))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            "crop_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation("crop_id", format!("Malformed upload: {}", e)))?;
                if !text.trim().is_empty() {
                    let id = Uuid::parse_str(text.trim())
                        .map_err(|_| AppError::validation("crop_id", "Invalid crop id"))?;
                    crop_id = Some(id);
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::validation("file", "Please select an image"))?;

    Ok(PhotoUpload {
        file_name,
        content_type,
        bytes,
        crop_id,
    })
}
