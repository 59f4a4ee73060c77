//! Profile service for the caller's account details and garden stats

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{crop_suggestions, ExperienceLevel};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::crop::CropStats;

/// Profile service
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Public user profile
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub location: Option<String>,
    pub preferred_crops: Vec<String>,
    pub garden_type: Option<String>,
    pub experience: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Profile page payload
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub stats: CropStats,
    pub suggested_crops: Vec<String>,
}

/// Input for updating a profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub preferred_crops: Option<Vec<String>>,
    pub garden_type: Option<String>,
    pub experience: Option<ExperienceLevel>,
}

const PROFILE_COLUMNS: &str =
    "id, email, name, location, preferred_crops, garden_type, experience, role, is_active, created_at, last_login_at";

impl ProfileService {
    /// Create a new ProfileService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Profile with seasonal crop counts
    pub async fn get_profile(&self, user_id: Uuid, stats: CropStats) -> AppResult<ProfileResponse> {
        let profile = self.get_user(user_id).await?;
        Ok(with_suggestions(profile, stats))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
        stats: CropStats,
    ) -> AppResult<ProfileResponse> {
        if let Some(name) = &input.name {
            shared::validate_required(name).map_err(|m| AppError::validation("name", m))?;
        }

        let sql = format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                preferred_crops = COALESCE($4, preferred_crops),
                garden_type = COALESCE($5, garden_type),
                experience = COALESCE($6, experience)
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.location)
            .bind(&input.preferred_crops)
            .bind(&input.garden_type)
            .bind(input.experience.map(|e| e.as_str()))
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(with_suggestions(profile, stats))
    }

    /// Every account, newest first
    pub async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", PROFILE_COLUMNS);
        let users = sqlx::query_as::<_, UserProfile>(&sql).fetch_all(&self.db).await?;
        Ok(users)
    }
}

fn with_suggestions(profile: UserProfile, stats: CropStats) -> ProfileResponse {
    let suggested_crops = profile
        .location
        .as_deref()
        .map(crop_suggestions)
        .unwrap_or_default()
        .iter()
        .map(|c| c.to_string())
        .collect();

    ProfileResponse {
        profile,
        stats,
        suggested_crops,
    }
}
