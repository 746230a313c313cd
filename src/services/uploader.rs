use std::path::Path;

use async_trait::async_trait;
use log::info;
use reqwest::multipart;
use serde::Deserialize;

use crate::error::DiagnosisError;

/// Image CDN seam. Takes a local file, returns a hosted HTTPS URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload_image(&self, image_path: &Path) -> Result<String, DiagnosisError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Unsigned Cloudinary upload: multipart POST with the file and an upload
/// preset, no retries.
pub struct CloudinaryUploader {
    http: reqwest::Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

impl CloudinaryUploader {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self::with_base_url("https://api.cloudinary.com/v1_1", cloud_name, upload_preset)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        cloud_name: impl Into<String>,
        upload_preset: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        }
    }
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    async fn upload_image(&self, image_path: &Path) -> Result<String, DiagnosisError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|_| DiagnosisError::InvalidImage(image_path.to_path_buf()))?;

        let file_part = multipart::Part::bytes(bytes)
            .file_name("upload.jpg")
            .mime_str("image/jpeg")
            .map_err(|err| DiagnosisError::PersistenceFailed(format!("invalid mime type: {err}")))?;
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("upload_preset", self.upload_preset.clone());

        let url = format!("{}/{}/image/upload", self.base_url, self.cloud_name);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| DiagnosisError::PersistenceFailed(format!("upload failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagnosisError::PersistenceFailed(format!(
                "upload rejected: {status} {body}"
            )));
        }

        let parsed: UploadResponse = response.json().await.map_err(|err| {
            DiagnosisError::PersistenceFailed(format!("invalid upload response: {err}"))
        })?;

        info!("Uploaded {} -> {}", image_path.display(), parsed.secure_url);
        Ok(parsed.secure_url)
    }
}
