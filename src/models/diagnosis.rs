use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detection::NormalizedPrediction;

/// A saved diagnosis as it lives in the document store. `diagnosis` is the
/// flat prediction shape; reloading it goes back through the normalizer so
/// records written by older app versions with missing fields still render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    pub id: String,
    pub user_id: String,
    pub image_url: String,
    pub diagnosis: NormalizedPrediction,
    pub timestamp: DateTime<Utc>,
}
