//! Admin service for cross-account crop oversight

use serde::Deserialize;
use shared::CropFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::events::{ChangeKind, CropChange, EventHub};
use crate::services::crop::CropRecord;
use crate::services::profile::{ProfileService, UserProfile};

/// Header row of the crop export
pub const EXPORT_HEADER: [&str; 9] = [
    "id",
    "owner_id",
    "name",
    "variety",
    "date_planted",
    "status",
    "season",
    "watering_frequency",
    "fertilizing_frequency",
];

/// Admin service
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
    events: EventHub,
}

/// Admin crop listing filters
#[derive(Debug, Default, Deserialize)]
pub struct AdminCropQuery {
    pub status: Option<String>,
    pub owner_id: Option<Uuid>,
}

impl AdminService {
    /// Create a new AdminService instance
    pub fn new(db: PgPool, events: EventHub) -> Self {
        Self { db, events }
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        ProfileService::new(self.db.clone()).list_users().await
    }

    /// Every crop, optionally narrowed by status or owner
    pub async fn list_all_crops(&self, query: &AdminCropQuery) -> AppResult<Vec<CropRecord>> {
        let status = CropFilter::status_param(query.status.as_deref());

        let crops = sqlx::query_as::<_, CropRecord>(
            r#"
            SELECT id, owner_id, name, variety, date_planted, container_size, sunlight_req,
                   source, notes, watering_frequency, fertilizing_frequency, status, season,
                   photo_url, created_at, updated_at
            FROM crops
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR owner_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(query.owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(crops)
    }

    /// Delete a crop regardless of owner
    pub async fn delete_any_crop(&self, crop_id: Uuid) -> AppResult<()> {
        let owner_id = sqlx::query_scalar::<_, Uuid>("DELETE FROM crops WHERE id = $1 RETURNING owner_id")
            .bind(crop_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Crop".to_string()))?;

        tracing::warn!(%crop_id, %owner_id, "Crop deleted by admin");
        self.events.publish(CropChange {
            crop_id,
            owner_id,
            kind: ChangeKind::Deleted,
        });
        Ok(())
    }

    /// Filtered crops as CSV bytes
    pub async fn export_crops_csv(&self, query: &AdminCropQuery) -> AppResult<Vec<u8>> {
        let crops = self.list_all_crops(query).await?;
        crops_to_csv(&crops)
    }
}

/// Render crops as CSV with a header row
pub fn crops_to_csv(crops: &[CropRecord]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER).map_err(csv_error)?;

    for crop in crops {
        writer
            .write_record([
                crop.id.to_string(),
                crop.owner_id.to_string(),
                crop.name.clone(),
                crop.variety.clone().unwrap_or_default(),
                crop.date_planted.to_string(),
                crop.status().as_str().to_string(),
                crop.season().as_str().to_string(),
                crop.watering_frequency.map(|f| f.to_string()).unwrap_or_default(),
                crop.fertilizing_frequency.map(|f| f.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV export failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn record(name: &str, variety: Option<&str>) -> CropRecord {
        CropRecord {
            id: Uuid::nil(),
            owner_id: Uuid::nil(),
            name: name.to_string(),
            variety: variety.map(str::to_string),
            date_planted: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            container_size: None,
            sunlight_req: None,
            source: None,
            notes: None,
            watering_frequency: Some(2),
            fertilizing_frequency: None,
            status: "flowering".to_string(),
            season: "Spring/Summer".to_string(),
            photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let bytes = crops_to_csv(&[record("Basil", Some("Genovese"))]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], EXPORT_HEADER.join(","));
        assert!(lines[1].contains(",Basil,Genovese,2024-03-01,flowering,"));
        assert!(lines[1].ends_with(",2,"));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let bytes = crops_to_csv(&[record("Peppers, hot", None)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Peppers, hot\""));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let bytes = crops_to_csv(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().lines().count(), 1);
    }
}
