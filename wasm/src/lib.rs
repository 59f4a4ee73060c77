//! WebAssembly module for Grow Smart
//!
//! Runs the care logic in the browser so the dashboard can re-derive tasks
//! and filter the crop library without a round trip:
//! - Task derivation from crops and a weather snapshot
//! - Growth event status mapping
//! - Library search, filter and sort
//! - Care guides and crop form validation

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use wasm_bindgen::prelude::*;

use shared::{
    care_guide, days_planted_display, derive_tasks, library_view, status_from_event, validate_crop_name,
    validate_frequency, Crop, CropFilter, CropSort, CropStatus, DeriveOptions, WeatherSnapshot,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("grow-smart wasm loaded"));
}

/// Derive today's care tasks.
///
/// `crops_json` is an array of crops, `weather_json` an optional weather
/// snapshot. Returns the derivation as JSON.
#[wasm_bindgen]
pub fn derive_tasks_json(
    crops_json: &str,
    weather_json: Option<String>,
    weather_aware: bool,
    rain_lookahead_hours: Option<i32>,
) -> Result<String, JsValue> {
    let now = browser_now()?;
    let today = browser_today(now);
    derive_at(crops_json, weather_json.as_deref(), weather_aware, rain_lookahead_hours, now, today)
        .map_err(to_js)
}

/// Status a crop moves to after a growth event
#[wasm_bindgen]
pub fn status_for_event(event_type: &str, current_status: &str) -> Result<String, JsValue> {
    let current = CropStatus::parse(current_status)
        .ok_or_else(|| to_js(format!("Unknown crop status: {}", current_status)))?;
    Ok(status_from_event(event_type, current).as_str().to_string())
}

/// Days shown on a crop card for a `YYYY-MM-DD` planting date
#[wasm_bindgen]
pub fn days_planted(date_planted: &str) -> Result<i32, JsValue> {
    let today = browser_today(browser_now()?);
    days_planted_on(date_planted, today).map_err(to_js)
}

/// Care guide for a crop name as JSON
#[wasm_bindgen]
pub fn care_guide_json(crop_name: &str) -> Result<String, JsValue> {
    serde_json::to_string(&care_guide(crop_name)).map_err(|e| to_js(e.to_string()))
}

/// Filter and sort a crop list the way the library page does
#[wasm_bindgen]
pub fn library_view_json(
    crops_json: &str,
    search: Option<String>,
    status: Option<String>,
    sort: Option<String>,
) -> Result<String, JsValue> {
    library_view_from(crops_json, search, status.as_deref(), sort.as_deref()).map_err(to_js)
}

/// First problem with a crop form, or `None` when it is valid
#[wasm_bindgen]
pub fn validate_crop_form(name: &str, watering_frequency: Option<i32>, fertilizing_frequency: Option<i32>) -> Option<String> {
    validate_crop_name(name)
        .and_then(|_| validate_frequency(watering_frequency))
        .and_then(|_| validate_frequency(fertilizing_frequency))
        .err()
        .map(str::to_string)
}

fn derive_at(
    crops_json: &str,
    weather_json: Option<&str>,
    weather_aware: bool,
    rain_lookahead_hours: Option<i32>,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<String, String> {
    let crops: Vec<Crop> = serde_json::from_str(crops_json).map_err(|e| format!("Invalid crops JSON: {}", e))?;
    let weather: Option<WeatherSnapshot> = weather_json
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| format!("Invalid weather JSON: {}", e))?;

    let mut options = DeriveOptions::at(now).weather_aware(weather_aware);
    if let Some(hours) = rain_lookahead_hours {
        options = options.rain_lookahead_hours(i64::from(hours));
    }

    let derivation = derive_tasks(&crops, weather.as_ref(), today, &options);
    serde_json::to_string(&derivation).map_err(|e| e.to_string())
}

fn days_planted_on(date_planted: &str, today: NaiveDate) -> Result<i32, String> {
    let planted = NaiveDate::parse_from_str(date_planted.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid planting date: {}", e))?;
    i32::try_from(days_planted_display(planted, today)).map_err(|e| e.to_string())
}

fn library_view_from(
    crops_json: &str,
    search: Option<String>,
    status: Option<&str>,
    sort: Option<&str>,
) -> Result<String, String> {
    let crops: Vec<Crop> = serde_json::from_str(crops_json).map_err(|e| format!("Invalid crops JSON: {}", e))?;
    let filter = CropFilter {
        search,
        status: CropFilter::status_param(status),
    };
    let sort = match sort {
        Some("date") => CropSort::Date,
        Some("status") => CropSort::Status,
        _ => CropSort::Name,
    };

    serde_json::to_string(&library_view(&crops, &filter, sort)).map_err(|e| e.to_string())
}

fn browser_now() -> Result<DateTime<Utc>, JsValue> {
    let millis = js_sys::Date::now() as i64;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| to_js("Browser clock out of range".to_string()))
}

/// The browser's local calendar date
fn browser_today(now: DateTime<Utc>) -> NaiveDate {
    let minutes_behind_utc = js_sys::Date::new_0().get_timezone_offset() as i64;
    local_date(now, minutes_behind_utc)
}

/// `minutes_behind_utc` follows `Date.getTimezoneOffset`: negative east of UTC
fn local_date(now: DateTime<Utc>, minutes_behind_utc: i64) -> NaiveDate {
    (now - Duration::minutes(minutes_behind_utc)).date_naive()
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}
