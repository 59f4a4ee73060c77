//! Weather data models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current conditions plus the forecast the care logic looks at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub wind_speed_mps: Decimal,
    /// Main condition group, e.g. "Clear", "Rain", "Drizzle"
    pub condition: String,
    pub description: String,
    #[serde(default)]
    pub forecast: Vec<ForecastEntry>,
}

impl WeatherSnapshot {
    pub fn is_raining(&self) -> bool {
        is_rain_condition(&self.condition)
    }
}

/// One interval of a multi-day forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub condition: String,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub wind_speed_mps: Decimal,
}

/// Forecast summarized per calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub high_celsius: Decimal,
    pub low_celsius: Decimal,
    pub humidity_percent: i32,
    pub wind_speed_mps: Decimal,
    pub condition: String,
}

/// Severity of a gardening tip
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Warning,
    Info,
    Success,
}

/// Weather-driven suggestion shown next to the forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GardeningTip {
    pub kind: TipKind,
    pub title: String,
    pub message: String,
}

/// True when a condition string mentions rain, in any case
pub fn is_rain_condition(condition: &str) -> bool {
    condition.to_ascii_lowercase().contains("rain")
}

/// Broader wet-weather check used for tips: rain, drizzle or thunderstorm
pub fn is_wet_condition(condition: &str) -> bool {
    let lower = condition.to_ascii_lowercase();
    lower.contains("rain") || lower.contains("drizzle") || lower.contains("thunderstorm")
}
