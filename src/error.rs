use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of the diagnosis pipeline. Callers match on the variant:
/// `RateLimited` is recoverable (the live-scan loop backs off on it), the
/// rest terminate the triggering action.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    /// The image file does not exist or is unreadable. Raised before any
    /// network call is attempted.
    #[error("invalid image: {0} does not exist or is not readable")]
    InvalidImage(PathBuf),

    #[error("failed to crop photo: {0}")]
    CropFailed(String),

    /// Classifier returned HTTP 429. `retry_after_secs` comes from the
    /// Retry-After header, defaulting to 20 when absent or non-numeric.
    #[error("classifier rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Any other transport failure or non-2xx classifier response.
    #[error("disease detection failed: {0}")]
    DetectionFailed(String),

    #[error("persistence failed: {0}")]
    PersistenceFailed(String),
}

impl DiagnosisError {
    /// Message shown in user-facing alerts on the one-shot path. The live
    /// overlay never displays these; it logs and moves on.
    pub fn user_message(&self) -> String {
        match self {
            DiagnosisError::InvalidImage(_) => {
                "The selected image could not be read. Please try another photo.".into()
            }
            DiagnosisError::CropFailed(_) => "Failed to take photo".into(),
            DiagnosisError::RateLimited { retry_after_secs } => format!(
                "The analysis service is busy. Please try again in {retry_after_secs} seconds."
            ),
            DiagnosisError::DetectionFailed(_) => {
                "Failed to analyze the image. Please try again.".into()
            }
            DiagnosisError::PersistenceFailed(_) => {
                "Failed to save diagnosis. Please try again.".into()
            }
        }
    }
}
