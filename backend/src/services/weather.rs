//! Weather service for current conditions, cached forecasts and tips

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    daily_forecast, extreme_weather_warning, gardening_tips, DailyForecast, ForecastEntry,
    GardeningTip, GpsCoordinates, PlaceLabel, WeatherSnapshot,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::external::WeatherClient;

/// Forecasts are reused for this long
pub const FORECAST_CACHE_HOURS: i64 = 3;

/// Weather service
#[derive(Clone)]
pub struct WeatherService {
    db: PgPool,
    client: WeatherClient,
    config: WeatherConfig,
}

/// Cached forecast record
#[derive(Debug, Clone, FromRow)]
pub struct CachedForecast {
    pub id: Uuid,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub forecasts: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Where the caller wants weather for
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<Decimal>,
    pub lon: Option<Decimal>,
    /// City name, geocoded when coordinates are absent
    pub city: Option<String>,
}

/// Current conditions with the place they were fetched for
#[derive(Debug, Serialize)]
pub struct CurrentWeatherResponse {
    pub location: GpsCoordinates,
    pub place: PlaceLabel,
    #[serde(flatten)]
    pub weather: WeatherSnapshot,
}

/// Forecast summarized for display
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub location: GpsCoordinates,
    pub daily: Vec<DailyForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extreme_warning: Option<String>,
}

/// Tips for the current conditions and coming days
#[derive(Debug, Serialize)]
pub struct TipsResponse {
    pub tips: Vec<GardeningTip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extreme_warning: Option<String>,
}

impl WeatherService {
    /// Create a new WeatherService instance
    pub fn new(db: PgPool, client: WeatherClient, config: WeatherConfig) -> Self {
        Self { db, client, config }
    }

    /// The configured fallback location
    pub fn default_location(&self) -> GpsCoordinates {
        GpsCoordinates::new(self.config.default_latitude, self.config.default_longitude)
    }

    /// Resolve a query to coordinates: explicit coordinates, then city, then fallback
    pub async fn resolve_location(&self, query: &LocationQuery) -> AppResult<GpsCoordinates> {
        if let (Some(lat), Some(lon)) = (query.lat, query.lon) {
            shared::validate_coordinates(lat, lon).map_err(|m| AppError::validation("lat", m))?;
            return Ok(GpsCoordinates::new(lat, lon));
        }

        if let Some(city) = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            match self.client.geocode(city).await? {
                Some((coords, _)) => return Ok(coords),
                None => return Err(AppError::NotFound(format!("Location '{}'", city))),
            }
        }

        Ok(self.default_location())
    }

    /// Current conditions and place label
    pub async fn current(&self, query: &LocationQuery) -> AppResult<CurrentWeatherResponse> {
        let location = self.resolve_location(query).await?;
        let weather = self.client.get_current_weather(&location).await?;
        let place = if location == self.default_location() {
            PlaceLabel {
                city: self.config.default_label.clone(),
                country: String::new(),
            }
        } else {
            self.client.reverse_geocode(&location).await
        };

        Ok(CurrentWeatherResponse {
            location,
            place,
            weather,
        })
    }

    /// Current conditions with the forecast attached, as the task deriver wants it.
    ///
    /// Fails only when current conditions are unavailable.
    pub async fn snapshot(&self, location: &GpsCoordinates) -> AppResult<WeatherSnapshot> {
        let current = self.client.get_current_weather(location).await?;
        let forecast = self.forecast_entries(location).await;
        Ok(with_forecast(current, forecast))
    }

    /// Daily forecast for a location
    pub async fn forecast(&self, query: &LocationQuery) -> AppResult<ForecastResponse> {
        let location = self.resolve_location(query).await?;
        let entries = self.forecast_entries(&location).await?;

        Ok(ForecastResponse {
            daily: daily_forecast(&entries),
            extreme_warning: extreme_weather_warning(&entries),
            location,
        })
    }

    /// Gardening tips for a location
    pub async fn tips(&self, query: &LocationQuery) -> AppResult<TipsResponse> {
        let location = self.resolve_location(query).await?;
        let current = self.client.get_current_weather(&location).await?;
        let entries = self.forecast_entries(&location).await?;

        Ok(TipsResponse {
            tips: gardening_tips(&current, &daily_forecast(&entries)),
            extreme_warning: extreme_weather_warning(&entries),
        })
    }

    /// Forecast entries from cache or API
    pub async fn forecast_entries(
        &self,
        location: &GpsCoordinates,
    ) -> AppResult<Vec<ForecastEntry>> {
        let cached = match self.get_cached_forecast(location).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Forecast cache lookup failed, fetching from API: {}", e);
                None
            }
        };

        if let Some(cached) = cached {
            match serde_json::from_value::<Vec<ForecastEntry>>(cached.forecasts) {
                Ok(entries) => {
                    tracing::debug!(cache_id = %cached.id, "Forecast cache hit");
                    return Ok(entries);
                }
                Err(e) => tracing::warn!("Discarding unreadable cached forecast: {}", e),
            }
        }

        let entries = self.client.get_forecast(location).await?;

        // A failed cache write only costs a refetch
        if let Err(e) = self.cache_forecast(location, &entries).await {
            tracing::warn!("Failed to cache forecast: {}", e);
        }

        Ok(entries)
    }

    /// Cache forecast data
    async fn cache_forecast(&self, location: &GpsCoordinates, entries: &[ForecastEntry]) -> AppResult<()> {
        let forecasts_json = serde_json::to_value(entries).map_err(|e| AppError::Internal(e.to_string()))?;
        let expires_at = Utc::now() + Duration::hours(FORECAST_CACHE_HOURS);

        sqlx::query(
            r#"
            INSERT INTO weather_forecasts (latitude, longitude, forecasts, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&forecasts_json)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        sqlx::query("DELETE FROM weather_forecasts WHERE expires_at < NOW()")
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Get cached forecast if not expired
    async fn get_cached_forecast(&self, location: &GpsCoordinates) -> AppResult<Option<CachedForecast>> {
        let cached = sqlx::query_as::<_, CachedForecast>(
            r#"
            SELECT id, latitude, longitude, forecasts, fetched_at, expires_at
            FROM weather_forecasts
            WHERE ABS(latitude - $1) < 0.01
              AND ABS(longitude - $2) < 0.01
              AND expires_at > NOW()
            ORDER BY fetched_at DESC
            LIMIT 1
            "#,
        )
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_optional(&self.db)
        .await?;

        Ok(cached)
    }
}

/// Attach forecast entries to current conditions.
///
/// A failed forecast leaves current conditions in place with no entries.
pub fn with_forecast(
    mut current: WeatherSnapshot,
    forecast: AppResult<Vec<ForecastEntry>>,
) -> WeatherSnapshot {
    match forecast {
        Ok(entries) => current.forecast = entries,
        Err(e) => {
            tracing::warn!("Forecast unavailable, using current conditions only: {}", e);
            current.forecast = Vec::new();
        }
    }
    current
}
