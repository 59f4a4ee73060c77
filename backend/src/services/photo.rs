//! Photo service for garden photo uploads

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ImageHostClient;
use crate::middleware::AuthUser;
use crate::services::crop::ensure_crop_owned;

/// Shown when the uploader has no name on record
pub const UNKNOWN_UPLOADER: &str = "Unknown";

/// Photo service
#[derive(Clone)]
pub struct PhotoService {
    db: PgPool,
    image_host: ImageHostClient,
}

/// Stored photo
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PhotoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub crop_id: Option<Uuid>,
    pub url: String,
    pub public_id: String,
    pub created_at: DateTime<Utc>,
}

/// Photo with its uploader for the gallery
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GalleryPhoto {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub photo: PhotoRecord,
    pub uploader_name: String,
}

/// A file pulled from a multipart request
#[derive(Debug)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub crop_id: Option<Uuid>,
}

impl PhotoService {
    /// Create a new PhotoService instance
    pub fn new(db: PgPool, image_host: ImageHostClient) -> Self {
        Self { db, image_host }
    }

    /// Validate, upload to the image host and record the photo
    pub async fn upload(&self, user_id: Uuid, upload: PhotoUpload) -> AppResult<PhotoRecord> {
        shared::validate_image_content_type(&upload.content_type).map_err(|m| AppError::validation("file", m))?;
        if upload.bytes.is_empty() {
            return Err(AppError::validation("file", "Please select an image"));
        }

        if let Some(crop_id) = upload.crop_id {
            ensure_crop_owned(&self.db, user_id, crop_id).await?;
        }

        let image = self
            .image_host
            .upload(upload.file_name, &upload.content_type, upload.bytes)
            .await?;

        let photo = sqlx::query_as::<_, PhotoRecord>(
            r#"
            INSERT INTO photos (user_id, crop_id, url, public_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, crop_id, url, public_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(upload.crop_id)
        .bind(&image.secure_url)
        .bind(&image.public_id)
        .fetch_one(&self.db)
        .await?;

        Ok(photo)
    }

    /// Gallery, newest first
    pub async fn list_photos(&self, crop_id: Option<Uuid>) -> AppResult<Vec<GalleryPhoto>> {
        let photos = sqlx::query_as::<_, GalleryPhoto>(
            r#"
            SELECT p.id, p.user_id, p.crop_id, p.url, p.public_id, p.created_at,
                   COALESCE(NULLIF(u.name, ''), $2) AS uploader_name
            FROM photos p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE ($1::uuid IS NULL OR p.crop_id = $1)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(crop_id)
        .bind(UNKNOWN_UPLOADER)
        .fetch_all(&self.db)
        .await?;

        Ok(photos)
    }

    /// Delete a photo; only the uploader or an admin may
    pub async fn delete_photo(&self, user: &AuthUser, photo_id: Uuid) -> AppResult<()> {
        let uploader = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM photos WHERE id = $1")
            .bind(photo_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Photo".to_string()))?;

        if uploader != user.user_id && !user.is_admin() {
            return Err(AppError::InsufficientPermissions);
        }

        sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(photo_id)
            .execute(&self.db)
            .await?;

        tracing::info!(%photo_id, "Photo deleted");
        Ok(())
    }
}
