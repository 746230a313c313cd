pub mod client;
pub mod commands;
pub mod normalize;

pub use client::{DetectOptions, DetectionClient, DiseaseDetector, DEFAULT_RETRY_AFTER_SECS};
pub use normalize::{normalize, NormalizedPrediction, Severity};
