//! Watering log service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{watering_advice, WeatherSnapshot};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Watering log service
#[derive(Clone)]
pub struct WateringService {
    db: PgPool,
}

/// Watering log entry
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WateringLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub crop: String,
    pub amount: String,
    pub watered_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub weather_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for logging a watering
#[derive(Debug, Deserialize)]
pub struct LogWateringInput {
    pub crop: String,
    /// Free text, e.g. "500 ml"
    pub amount: String,
    pub watered_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl WateringService {
    /// Create a new WateringService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a watering with advice from the current weather, when known
    pub async fn log_watering(
        &self,
        user_id: Uuid,
        input: LogWateringInput,
        weather: Option<&WeatherSnapshot>,
    ) -> AppResult<WateringLog> {
        shared::validate_required(&input.crop).map_err(|_| AppError::validation("crop", "Please select a crop"))?;
        shared::validate_required(&input.amount).map_err(|_| AppError::validation("amount", "Please enter an amount"))?;

        let weather_message = weather.and_then(watering_advice);

        let log = sqlx::query_as::<_, WateringLog>(
            r#"
            INSERT INTO watering_logs (user_id, crop, amount, watered_at, notes, photo_url, weather_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, crop, amount, watered_at, notes, photo_url, weather_message, created_at
            "#,
        )
        .bind(user_id)
        .bind(input.crop.trim())
        .bind(input.amount.trim())
        .bind(input.watered_at.unwrap_or_else(Utc::now))
        .bind(&input.notes)
        .bind(&input.photo_url)
        .bind(&weather_message)
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    /// A user's logs, newest first
    pub async fn list_logs(&self, user_id: Uuid) -> AppResult<Vec<WateringLog>> {
        let logs = sqlx::query_as::<_, WateringLog>(
            r#"
            SELECT id, user_id, crop, amount, watered_at, notes, photo_url, weather_message, created_at
            FROM watering_logs
            WHERE user_id = $1
            ORDER BY watered_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }
}
