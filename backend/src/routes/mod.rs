//! Route definitions for the Grow Smart API

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    AppState,
};

/// Largest accepted photo upload
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create API routes
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .nest("/profile", profile_routes(state))
        .nest("/crops", crop_routes(state))
        .nest("/tasks", task_routes(state))
        .nest("/weather", weather_routes(state))
        .nest("/photos", photo_routes(state))
        .nest("/watering-logs", watering_routes(state))
        // Admin routes
        .nest("/admin", admin_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Profile routes (protected)
fn profile_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_profile).put(handlers::update_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Crop library routes (protected)
fn crop_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_crops).post(handlers::create_crop))
        .route("/dashboard", get(handlers::dashboard))
        .route("/suggestions", get(handlers::crop_suggestions_for))
        .route("/events", get(handlers::crop_events))
        .route(
            "/:id",
            get(handlers::get_crop)
                .put(handlers::update_crop)
                .delete(handlers::delete_crop),
        )
        .route(
            "/:id/timeline",
            get(handlers::list_timeline).post(handlers::add_timeline_event),
        )
        .route("/:id/calendar", get(handlers::crop_calendar))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Task routes (protected)
fn task_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tasks).post(handlers::create_task))
        .route("/derived", get(handlers::derived_tasks))
        .route("/reschedule-for-rain", post(handlers::reschedule_for_rain))
        .route("/:id", delete(handlers::delete_task))
        .route("/:id/complete", post(handlers::complete_task))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Weather routes (protected)
fn weather_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/current", get(handlers::current_weather))
        .route("/forecast", get(handlers::weather_forecast))
        .route("/tips", get(handlers::weather_tips))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Photo gallery routes (protected)
fn photo_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_photos).post(handlers::upload_photo))
        .route("/:id", delete(handlers::delete_photo))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Watering log routes (protected)
fn watering_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_watering_logs).post(handlers::log_watering))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Admin routes; the admin check runs after authentication
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::admin_list_users))
        .route("/crops", get(handlers::admin_list_crops))
        .route("/crops/export", get(handlers::admin_export_crops))
        .route("/crops/:id", delete(handlers::admin_delete_crop))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}
