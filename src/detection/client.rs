use std::path::Path;

use async_trait::async_trait;
use log::debug;
use reqwest::multipart;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::DiagnosisError;

/// Backoff applied when the classifier rate-limits us without saying for how
/// long (Retry-After absent or non-numeric).
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct DetectOptions {
    /// Hint the service to use its cheaper/faster classification path. The
    /// live-scan loop sets this; one-shot diagnosis does not.
    pub lite: bool,
}

/// Seam for the remote classifier so the live-scan loop and commands can be
/// exercised against fakes.
#[async_trait]
pub trait DiseaseDetector: Send + Sync {
    /// Upload the image and return the raw, unnormalized prediction payload.
    async fn detect_disease(
        &self,
        image_path: &Path,
        options: DetectOptions,
    ) -> Result<Value, DiagnosisError>;
}

/// HTTP client for the classification endpoint. One POST per call, no
/// automatic retries; HTTP 429 is turned into the distinguishable
/// `RateLimited` error so callers can back off instead of failing.
pub struct DetectionClient {
    http: reqwest::Client,
    base_url: String,
}

impl DetectionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DiseaseDetector for DetectionClient {
    async fn detect_disease(
        &self,
        image_path: &Path,
        options: DetectOptions,
    ) -> Result<Value, DiagnosisError> {
        // Fail fast on a bad local file; no network call is made.
        if !image_path.is_file() {
            return Err(DiagnosisError::InvalidImage(image_path.to_path_buf()));
        }
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|_| DiagnosisError::InvalidImage(image_path.to_path_buf()))?;

        let file_part = multipart::Part::bytes(bytes)
            .file_name("plant.jpg")
            .mime_str("image/jpeg")
            .map_err(|err| DiagnosisError::DetectionFailed(format!("invalid mime type: {err}")))?;
        let mut form = multipart::Form::new().part("file", file_part);
        if options.lite {
            form = form.text("lite", "true");
        }

        let url = format!("{}/predict", self.base_url);
        debug!("POST {url} (lite: {})", options.lite);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| DiagnosisError::DetectionFailed(format!("request failed: {err}")))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(DiagnosisError::RateLimited { retry_after_secs });
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagnosisError::DetectionFailed(format!(
                "API request failed: {status} {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| DiagnosisError::DetectionFailed(format!("invalid response body: {err}")))
    }
}
