//! Image host client
//!
//! Unsigned uploads to a Cloudinary-compatible API.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::config::ImageHostConfig;
use crate::error::{AppError, AppResult};

/// Client for the image hosting API
#[derive(Clone)]
pub struct ImageHostClient {
    upload_url: String,
    upload_preset: String,
    http_client: Client,
}

/// Stored image returned by the host
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

impl ImageHostClient {
    pub fn new(http_client: Client, config: &ImageHostConfig) -> Self {
        Self {
            upload_url: format!(
                "{}/{}/image/upload",
                config.api_endpoint.trim_end_matches('/'),
                config.cloud_name
            ),
            upload_preset: config.upload_preset.clone(),
            http_client,
        }
    }

    /// Upload an image and return its hosted URL and id
    pub async fn upload(
        &self,
        file_name: String,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<UploadedImage> {
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|e| AppError::validation("file", format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .http_client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ImageHost(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ImageHost(format!("API returned {}: {}", status, body)));
        }

        let uploaded: UploadedImage = response
            .json()
            .await
            .map_err(|e| AppError::ImageHost(format!("Failed to parse response: {}", e)))?;

        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_url_layout() {
        let config = ImageHostConfig {
            api_endpoint: "https://api.cloudinary.com/v1_1/".to_string(),
            cloud_name: "garden".to_string(),
            upload_preset: "unsigned".to_string(),
        };
        let client = ImageHostClient::new(Client::new(), &config);
        assert_eq!(client.upload_url, "https://api.cloudinary.com/v1_1/garden/image/upload");
    }

    #[test]
    fn test_upload_response_parses() {
        let json = r#"{"secure_url": "https://res.example/img.jpg", "public_id": "abc123", "width": 640}"#;
        let image: UploadedImage = serde_json::from_str(json).unwrap();
        assert_eq!(image.public_id, "abc123");
    }
}
