//! Configuration management for the Grow Smart server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with GS__ prefix

use chrono::{DateTime, Duration, NaiveDate, Utc};
use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Image hosting configuration
    pub image_host: ImageHostConfig,

    /// CORS configuration
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// OpenWeatherMap data API base, e.g. https://api.openweathermap.org/data/2.5
    pub api_endpoint: String,

    /// OpenWeatherMap geocoding API base
    pub geo_endpoint: String,

    /// Weather API key
    pub api_key: String,

    /// Timeout for weather requests
    pub request_timeout_secs: u64,

    /// Location used when the caller supplies none
    pub default_latitude: Decimal,
    pub default_longitude: Decimal,
    pub default_label: String,

    /// How far ahead forecast rain defers care tasks
    pub rain_lookahead_hours: i64,

    /// Water early when humidity is low
    pub weather_aware_watering: bool,

    /// Offset of the gardeners' local time from UTC, used to pick "today"
    pub utc_offset_minutes: i32,
}

impl WeatherConfig {
    /// Calendar date in the configured local time
    pub fn local_today(&self, now: DateTime<Utc>) -> NaiveDate {
        (now + Duration::minutes(i64::from(self.utc_offset_minutes))).date_naive()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageHostConfig {
    /// Upload API base, e.g. https://api.cloudinary.com/v1_1
    pub api_endpoint: String,

    pub cloud_name: String,

    /// Unsigned upload preset
    pub upload_preset: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins, `*` for any
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("GS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.geo_endpoint", "https://api.openweathermap.org/geo/1.0")?
            .set_default("weather.api_key", "")?
            .set_default("weather.request_timeout_secs", 10)?
            .set_default("weather.default_latitude", "12.9716")?
            .set_default("weather.default_longitude", "77.5946")?
            .set_default("weather.default_label", "Bengaluru")?
            .set_default("weather.rain_lookahead_hours", 24)?
            .set_default("weather.weather_aware_watering", false)?
            .set_default("weather.utc_offset_minutes", 330)?
            .set_default("image_host.api_endpoint", "https://api.cloudinary.com/v1_1")?
            .set_default("image_host.cloud_name", "")?
            .set_default("image_host.upload_preset", "")?
            .set_default("cors.allowed_origins", vec!["*"])?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (GS prefix)
            .add_source(
                Environment::with_prefix("GS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn weather_config(utc_offset_minutes: i32) -> WeatherConfig {
        WeatherConfig {
            api_endpoint: String::new(),
            geo_endpoint: String::new(),
            api_key: String::new(),
            request_timeout_secs: 10,
            default_latitude: Decimal::new(129716, 4),
            default_longitude: Decimal::new(775946, 4),
            default_label: "Bengaluru".to_string(),
            rain_lookahead_hours: 24,
            weather_aware_watering: false,
            utc_offset_minutes,
        }
    }

    #[test]
    fn test_local_today_crosses_midnight_before_utc() {
        // 02:00 in Bengaluru on the 10th
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 20, 30, 0).unwrap();
        assert_eq!(weather_config(330).local_today(now), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(weather_config(0).local_today(now), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
    }

    #[test]
    fn test_local_today_west_of_utc() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 3, 0, 0).unwrap();
        assert_eq!(weather_config(-300).local_today(now), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
    }
}
