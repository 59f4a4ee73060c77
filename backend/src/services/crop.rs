//! Crop management service for the crop library and growth timeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{status_from_event, Crop, CropFilter, CropSort, CropStatus, Season};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::events::{ChangeKind, CropChange, EventHub};

const CROP_COLUMNS: &str = r#"
    id, owner_id, name, variety, date_planted, container_size, sunlight_req,
    source, notes, watering_frequency, fertilizing_frequency, status, season,
    photo_url, created_at, updated_at
"#;

/// Crop service for managing a user's crops
#[derive(Clone)]
pub struct CropService {
    db: PgPool,
    events: EventHub,
}

/// Crop record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CropRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub variety: Option<String>,
    pub date_planted: NaiveDate,
    pub container_size: Option<String>,
    pub sunlight_req: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub watering_frequency: Option<i32>,
    pub fertilizing_frequency: Option<i32>,
    pub status: String,
    pub season: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CropRecord {
    pub fn status(&self) -> CropStatus {
        CropStatus::parse(&self.status).unwrap_or_default()
    }

    pub fn season(&self) -> Season {
        Season::parse(&self.season).unwrap_or_else(|| Season::for_date(self.created_at.date_naive()))
    }

    /// The fields the care logic works with
    pub fn to_crop(&self) -> Crop {
        Crop {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name.clone(),
            variety: self.variety.clone(),
            date_planted: self.date_planted,
            watering_frequency: self.watering_frequency,
            fertilizing_frequency: self.fertilizing_frequency,
            status: self.status(),
        }
    }
}

/// Growth timeline entry
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GrowthEventRecord {
    pub id: Uuid,
    pub crop_id: Uuid,
    pub user_id: Uuid,
    pub event_type: String,
    pub event_date: NaiveDate,
    pub notes: Option<String>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Growth event together with the crop status it produced
#[derive(Debug, Serialize)]
pub struct GrowthEventResult {
    pub event: GrowthEventRecord,
    pub status: CropStatus,
}

/// Input for creating a crop
#[derive(Debug, Deserialize)]
pub struct CreateCropInput {
    pub name: String,
    pub variety: Option<String>,
    pub date_planted: Option<NaiveDate>,
    pub container_size: Option<String>,
    pub sunlight_req: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub watering_frequency: Option<i32>,
    pub fertilizing_frequency: Option<i32>,
    pub photo_url: Option<String>,
}

/// Input for updating a crop
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCropInput {
    pub name: Option<String>,
    pub variety: Option<String>,
    pub date_planted: Option<NaiveDate>,
    pub container_size: Option<String>,
    pub sunlight_req: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub watering_frequency: Option<i32>,
    pub fertilizing_frequency: Option<i32>,
    pub status: Option<CropStatus>,
    pub photo_url: Option<String>,
}

/// Input for a growth timeline event
#[derive(Debug, Deserialize)]
pub struct CreateGrowthEventInput {
    pub event_type: String,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Library query parameters
#[derive(Debug, Default, Deserialize)]
pub struct CropQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub sort: CropSort,
}

impl CropQuery {
    pub fn filter(&self) -> CropFilter {
        CropFilter {
            search: self.search.clone(),
            status: CropFilter::status_param(self.status.as_deref()),
        }
    }
}

/// Crop counts for the dashboard and profile
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CropStats {
    pub total_crops: usize,
    pub harvest_count: usize,
    /// Percentage of crops that reached fruiting or ready
    pub success_rate: u32,
    pub spring_summer: usize,
    pub fall_winter: usize,
}

impl CropStats {
    pub fn from_records(records: &[CropRecord]) -> Self {
        Self::tally(records.iter().map(|r| (r.status(), r.season())))
    }

    pub fn tally(crops: impl IntoIterator<Item = (CropStatus, Season)>) -> Self {
        let mut stats = CropStats::default();
        for (status, season) in crops {
            stats.total_crops += 1;
            if status.is_successful() {
                stats.harvest_count += 1;
            }
            match season {
                Season::SpringSummer => stats.spring_summer += 1,
                Season::FallWinter => stats.fall_winter += 1,
            }
        }
        if stats.total_crops > 0 {
            let rate = stats.harvest_count as f64 / stats.total_crops as f64 * 100.0;
            stats.success_rate = rate.round() as u32;
        }
        stats
    }
}

const OWNED_CROP_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM crops WHERE id = $1 AND owner_id = $2)";

/// Fails with not found unless `crop_id` belongs to `owner_id`
pub async fn ensure_crop_owned(db: &PgPool, owner_id: Uuid, crop_id: Uuid) -> AppResult<()> {
    let owned = sqlx::query_scalar::<_, bool>(OWNED_CROP_EXISTS)
        .bind(crop_id)
        .bind(owner_id)
        .fetch_one(db)
        .await?;

    if owned {
        Ok(())
    } else {
        Err(AppError::NotFound("Crop".to_string()))
    }
}

impl CropService {
    /// Create a new CropService instance
    pub fn new(db: PgPool, events: EventHub) -> Self {
        Self { db, events }
    }

    /// Library listing for an owner
    pub async fn list_crops(&self, owner_id: Uuid, query: &CropQuery) -> AppResult<Vec<CropRecord>> {
        let filter = query.filter();
        let order_by = match query.sort {
            CropSort::Name => "LOWER(name) ASC",
            CropSort::Date => "date_planted DESC",
            CropSort::Status => "status ASC",
        };

        let sql = format!(
            r#"
            SELECT {}
            FROM crops
            WHERE owner_id = $1
              AND ($2::text IS NULL OR name ILIKE $2 OR variety ILIKE $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY {}, id
            "#,
            CROP_COLUMNS, order_by
        );

        let crops = sqlx::query_as::<_, CropRecord>(&sql)
            .bind(owner_id)
            .bind(filter.search_pattern())
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.db)
            .await?;

        Ok(crops)
    }

    /// All of an owner's crops in library name order
    pub async fn all_crops(&self, owner_id: Uuid) -> AppResult<Vec<CropRecord>> {
        self.list_crops(owner_id, &CropQuery::default()).await
    }

    /// Get a crop by ID
    pub async fn get_crop(&self, owner_id: Uuid, crop_id: Uuid) -> AppResult<CropRecord> {
        let sql = format!("SELECT {} FROM crops WHERE id = $1 AND owner_id = $2", CROP_COLUMNS);
        sqlx::query_as::<_, CropRecord>(&sql)
            .bind(crop_id)
            .bind(owner_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Crop".to_string()))
    }

    /// Create a new crop
    pub async fn create_crop(&self, owner_id: Uuid, input: CreateCropInput) -> AppResult<CropRecord> {
        shared::validate_crop_name(&input.name).map_err(|m| AppError::validation("name", m))?;
        let date_planted = input
            .date_planted
            .ok_or_else(|| AppError::validation("date_planted", "Date planted is required"))?;
        shared::validate_frequency(input.watering_frequency)
            .map_err(|m| AppError::validation("watering_frequency", m))?;
        shared::validate_frequency(input.fertilizing_frequency)
            .map_err(|m| AppError::validation("fertilizing_frequency", m))?;

        let season = Season::for_date(Utc::now().date_naive());

        let sql = format!(
            r#"
            INSERT INTO crops (
                owner_id, name, variety, date_planted, container_size, sunlight_req,
                source, notes, watering_frequency, fertilizing_frequency, status, season, photo_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            CROP_COLUMNS
        );

        let crop = sqlx::query_as::<_, CropRecord>(&sql)
            .bind(owner_id)
            .bind(input.name.trim())
            .bind(&input.variety)
            .bind(date_planted)
            .bind(&input.container_size)
            .bind(&input.sunlight_req)
            .bind(&input.source)
            .bind(&input.notes)
            .bind(input.watering_frequency)
            .bind(input.fertilizing_frequency)
            .bind(CropStatus::Growing.as_str())
            .bind(season.as_str())
            .bind(&input.photo_url)
            .fetch_one(&self.db)
            .await?;

        tracing::info!(crop_id = %crop.id, %owner_id, "Crop created");
        self.publish(&crop, ChangeKind::Created);

        Ok(crop)
    }

    /// Update a crop
    pub async fn update_crop(
        &self,
        owner_id: Uuid,
        crop_id: Uuid,
        input: UpdateCropInput,
    ) -> AppResult<CropRecord> {
        if let Some(name) = &input.name {
            shared::validate_crop_name(name).map_err(|m| AppError::validation("name", m))?;
        }
        shared::validate_frequency(input.watering_frequency)
            .map_err(|m| AppError::validation("watering_frequency", m))?;
        shared::validate_frequency(input.fertilizing_frequency)
            .map_err(|m| AppError::validation("fertilizing_frequency", m))?;

        let sql = format!(
            r#"
            UPDATE crops SET
                name = COALESCE($3, name),
                variety = COALESCE($4, variety),
                date_planted = COALESCE($5, date_planted),
                container_size = COALESCE($6, container_size),
                sunlight_req = COALESCE($7, sunlight_req),
                source = COALESCE($8, source),
                notes = COALESCE($9, notes),
                watering_frequency = COALESCE($10, watering_frequency),
                fertilizing_frequency = COALESCE($11, fertilizing_frequency),
                status = COALESCE($12, status),
                photo_url = COALESCE($13, photo_url),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            CROP_COLUMNS
        );

        let crop = sqlx::query_as::<_, CropRecord>(&sql)
            .bind(crop_id)
            .bind(owner_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.variety)
            .bind(input.date_planted)
            .bind(&input.container_size)
            .bind(&input.sunlight_req)
            .bind(&input.source)
            .bind(&input.notes)
            .bind(input.watering_frequency)
            .bind(input.fertilizing_frequency)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.photo_url)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Crop".to_string()))?;

        self.publish(&crop, ChangeKind::Updated);
        Ok(crop)
    }

    /// Delete a crop
    pub async fn delete_crop(&self, owner_id: Uuid, crop_id: Uuid) -> AppResult<()> {
        let deleted = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM crops WHERE id = $1 AND owner_id = $2 RETURNING id",
        )
        .bind(crop_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        if deleted.is_none() {
            return Err(AppError::NotFound("Crop".to_string()));
        }

        tracing::info!(%crop_id, "Crop deleted");
        self.events.publish(CropChange {
            crop_id,
            owner_id,
            kind: ChangeKind::Deleted,
        });
        Ok(())
    }

    /// Record a growth event and move the crop to the status it implies
    pub async fn add_growth_event(
        &self,
        owner_id: Uuid,
        crop_id: Uuid,
        input: CreateGrowthEventInput,
    ) -> AppResult<GrowthEventResult> {
        shared::validate_required(&input.event_type).map_err(|m| AppError::validation("event_type", m))?;

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM crops WHERE id = $1 AND owner_id = $2 FOR UPDATE",
        )
        .bind(crop_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Crop".to_string()))?;

        let current = CropStatus::parse(&current).unwrap_or_default();
        let status = status_from_event(input.event_type.trim(), current);

        let event = sqlx::query_as::<_, GrowthEventRecord>(
            r#"
            INSERT INTO growth_events (crop_id, user_id, event_type, event_date, notes, photos)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, crop_id, user_id, event_type, event_date, notes, photos, created_at
            "#,
        )
        .bind(crop_id)
        .bind(owner_id)
        .bind(input.event_type.trim())
        .bind(input.date.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(&input.notes)
        .bind(&input.photos)
        .fetch_one(&mut *tx)
        .await?;

        if status != current {
            sqlx::query("UPDATE crops SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(crop_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(%crop_id, event = %event.event_type, from = %current, to = %status, "Growth event recorded");
        self.events.publish(CropChange {
            crop_id,
            owner_id,
            kind: ChangeKind::GrowthEvent,
        });

        Ok(GrowthEventResult { event, status })
    }

    /// Growth timeline, newest first
    pub async fn list_growth_events(&self, owner_id: Uuid, crop_id: Uuid) -> AppResult<Vec<GrowthEventRecord>> {
        // Ownership check
        self.get_crop(owner_id, crop_id).await?;

        let events = sqlx::query_as::<_, GrowthEventRecord>(
            r#"
            SELECT id, crop_id, user_id, event_type, event_date, notes, photos, created_at
            FROM growth_events
            WHERE crop_id = $1
            ORDER BY event_date DESC, created_at DESC
            "#,
        )
        .bind(crop_id)
        .fetch_all(&self.db)
        .await?;

        Ok(events)
    }

    /// Counts for the dashboard
    pub async fn stats(&self, owner_id: Uuid) -> AppResult<CropStats> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT status, season FROM crops WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;

        Ok(CropStats::tally(rows.iter().map(|(status, season)| {
            (
                CropStatus::parse(status).unwrap_or_default(),
                Season::parse(season).unwrap_or(Season::SpringSummer),
            )
        })))
    }

    fn publish(&self, crop: &CropRecord, kind: ChangeKind) {
        self.events.publish(CropChange {
            crop_id: crop.id,
            owner_id: crop.owner_id,
            kind,
        });
    }
}
