//! Profile HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::middleware::CurrentUser;
use crate::services::profile::UpdateProfileInput;
use crate::services::{CropService, ProfileService};
use crate::AppState;

/// The caller's profile with seasonal stats
pub async fn get_profile(State(state): State<AppState>, current_user: CurrentUser) -> impl IntoResponse {
    let crops = CropService::new(state.db.clone(), state.events.clone());
    let profiles = ProfileService::new(state.db.clone());
    let user_id = current_user.0.user_id;

    let result = match crops.stats(user_id).await {
        Ok(stats) => profiles.get_profile(user_id, stats).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> impl IntoResponse {
    let crops = CropService::new(state.db.clone(), state.events.clone());
    let profiles = ProfileService::new(state.db.clone());
    let user_id = current_user.0.user_id;

    let result = match crops.stats(user_id).await {
        Ok(stats) => profiles.update_profile(user_id, input, stats).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}
