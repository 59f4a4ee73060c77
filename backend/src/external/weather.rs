//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap for current conditions, the 5-day/3-hour
//! forecast and geocoding

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::{ForecastEntry, GpsCoordinates, PlaceLabel, WeatherSnapshot};

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    geo_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    weather: Vec<OWMWeather>,
    main: OWMMain,
    wind: OWMWind,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    speed: f64,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    weather: Vec<OWMWeather>,
    wind: OWMWind,
}

/// One geocoding match
#[derive(Debug, Deserialize)]
struct OWMPlace {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: Option<String>,
}

impl WeatherClient {
    /// Create a new WeatherClient sharing the application's HTTP client
    pub fn new(client: Client, config: &WeatherConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            geo_url: config.geo_endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn get_current_weather(&self, location: &GpsCoordinates) -> AppResult<WeatherSnapshot> {
        let url = format!("{}/weather", self.base_url);
        let data: OWMCurrentResponse = self.get_json(&url, &self.metric_query(location)).await?;
        Ok(convert_current_response(data))
    }

    /// Fetch the 5-day/3-hour forecast by GPS coordinates
    pub async fn get_forecast(&self, location: &GpsCoordinates) -> AppResult<Vec<ForecastEntry>> {
        let url = format!("{}/forecast", self.base_url);
        let data: OWMForecastResponse = self.get_json(&url, &self.metric_query(location)).await?;
        Ok(convert_forecast_response(data))
    }

    /// Resolve a city name to coordinates, `None` when nothing matches
    pub async fn geocode(&self, city: &str) -> AppResult<Option<(GpsCoordinates, PlaceLabel)>> {
        let url = format!("{}/direct", self.geo_url);
        let query = [
            ("q", city.trim().to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];
        let places: Vec<OWMPlace> = self.get_json(&url, &query).await?;
        Ok(places.into_iter().next().map(|p| {
            (
                GpsCoordinates::new(to_decimal(p.lat, 4), to_decimal(p.lon, 4)),
                PlaceLabel {
                    city: p.name,
                    country: p.country.unwrap_or_default(),
                },
            )
        }))
    }

    /// Place label for coordinates, "Unknown" when the lookup fails
    pub async fn reverse_geocode(&self, location: &GpsCoordinates) -> PlaceLabel {
        let url = format!("{}/reverse", self.geo_url);
        let query = [
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];
        match self.get_json::<Vec<OWMPlace>>(&url, &query).await {
            Ok(places) => places
                .into_iter()
                .next()
                .map(|p| PlaceLabel {
                    city: p.name,
                    country: p.country.unwrap_or_default(),
                })
                .unwrap_or_else(PlaceLabel::unknown),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                PlaceLabel::unknown()
            }
        }
    }

    fn metric_query(&self, location: &GpsCoordinates) -> [(&'static str, String); 4] {
        [
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ]
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::WeatherServiceUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WeatherServiceUnavailable(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::WeatherServiceUnavailable(format!("Failed to parse weather response: {}", e)))
    }
}

fn to_decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default().round_dp(dp)
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> WeatherSnapshot {
    let weather = data.weather.first();

    WeatherSnapshot {
        temperature_celsius: to_decimal(data.main.temp, 2),
        humidity_percent: data.main.humidity,
        wind_speed_mps: to_decimal(data.wind.speed, 2),
        condition: weather.map(|w| w.main.clone()).unwrap_or_default(),
        description: weather.map(|w| w.description.clone()).unwrap_or_default(),
        forecast: Vec::new(),
    }
}

/// Convert OpenWeatherMap forecast response to our format
fn convert_forecast_response(data: OWMForecastResponse) -> Vec<ForecastEntry> {
    data.list
        .into_iter()
        .filter_map(|item| {
            let timestamp: DateTime<Utc> = DateTime::from_timestamp(item.dt, 0)?;
            Some(ForecastEntry {
                timestamp,
                condition: item.weather.first().map(|w| w.main.clone()).unwrap_or_default(),
                temperature_celsius: to_decimal(item.main.temp, 2),
                humidity_percent: item.main.humidity,
                wind_speed_mps: to_decimal(item.wind.speed, 2),
            })
        })
        .collect()
}
