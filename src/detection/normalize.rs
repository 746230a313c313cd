//! Reconciles the two shapes a diagnosis can arrive in.
//!
//! Fresh classifier responses nest the interesting fields under
//! `disease_prediction` / `plant_prediction`, while records reloaded from the
//! document store are already flat. Every screen renders the same
//! [`NormalizedPrediction`], so both shapes funnel through [`normalize`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_TREATMENT: &str = "Unable to determine treatment";
pub const DEFAULT_DESCRIPTION: &str = "Could not analyze the image properly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "Unknown")]
    Unknown,
}

// Tolerant by hand: any label outside low/medium/high (or null) must land on
// Unknown instead of failing the whole record.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(Severity::from_label).unwrap_or_default())
    }
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Unknown => "Unknown",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unknown
    }
}

/// The canonical in-memory diagnosis record. Serde defaults mirror the
/// normalizer's per-field fallbacks so partial payloads deserialize into the
/// same values [`normalize`] would produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPrediction {
    #[serde(default)]
    pub plant: Option<String>,
    #[serde(default = "default_disease")]
    pub disease: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "default_treatment")]
    pub treatment: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

fn default_disease() -> String {
    "Unknown".into()
}

fn default_treatment() -> String {
    DEFAULT_TREATMENT.into()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.into()
}

impl NormalizedPrediction {
    /// The record shown when there is nothing to show: analysis produced no
    /// usable payload.
    pub fn unknown() -> Self {
        Self {
            plant: None,
            disease: default_disease(),
            confidence: 0.0,
            treatment: default_treatment(),
            description: default_description(),
            severity: Severity::Unknown,
            recommendations: None,
        }
    }
}

impl Default for NormalizedPrediction {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Total over arbitrary input: nullish payloads become the all-Unknown
/// record, the nested classifier shape is flattened, anything else is treated
/// as the flat persisted shape with missing fields defaulted field by field.
pub fn normalize(raw: Option<&Value>) -> NormalizedPrediction {
    let Some(raw) = raw else {
        return NormalizedPrediction::unknown();
    };
    if raw.is_null() {
        return NormalizedPrediction::unknown();
    }

    let nested_plant = raw.pointer("/plant_prediction/plant").and_then(Value::as_str);
    if let (Some(disease_prediction), Some(plant)) = (raw.get("disease_prediction"), nested_plant) {
        let mut flat = from_flat(disease_prediction);
        flat.plant = Some(plant.to_string());
        return flat;
    }

    from_flat(raw)
}

/// Field-by-field extraction; never fails on wrong or missing types.
fn from_flat(value: &Value) -> NormalizedPrediction {
    NormalizedPrediction {
        plant: value.get("plant").and_then(Value::as_str).map(String::from),
        disease: string_or(value, "disease", default_disease),
        confidence: value
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        treatment: string_or(value, "treatment", default_treatment),
        description: string_or(value, "description", default_description),
        severity: value
            .get("severity")
            .and_then(Value::as_str)
            .map(Severity::from_label)
            .unwrap_or_default(),
        recommendations: value
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            }),
    }
}

fn string_or(value: &Value, key: &str, fallback: fn() -> String) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nullish_input_yields_unknown_record() {
        for raw in [None, Some(&Value::Null)] {
            let prediction = normalize(raw);
            assert_eq!(prediction.disease, "Unknown");
            assert_eq!(prediction.confidence, 0.0);
            assert_eq!(prediction.severity, Severity::Unknown);
            assert!(!prediction.description.is_empty());
        }
    }

    #[test]
    fn nested_api_shape_is_flattened() {
        let raw = json!({
            "plant_prediction": {
                "plant": "Tomato",
                "confidence": 0.97,
                "classes": [{"label": "Tomato", "prob": 0.97}]
            },
            "disease_prediction": {
                "disease": "Blight",
                "confidence": 0.9,
                "treatment": "T",
                "description": "D",
                "severity": "high",
                "recommendations": []
            }
        });

        let prediction = normalize(Some(&raw));
        assert_eq!(prediction.plant.as_deref(), Some("Tomato"));
        assert_eq!(prediction.disease, "Blight");
        assert_eq!(prediction.confidence, 0.9);
        assert_eq!(prediction.treatment, "T");
        assert_eq!(prediction.description, "D");
        assert_eq!(prediction.severity, Severity::High);
        assert_eq!(prediction.recommendations, Some(vec![]));
    }

    #[test]
    fn flat_history_shape_passes_through_unchanged() {
        let raw = json!({
            "plant": "Tomato",
            "disease": "Blight",
            "confidence": 0.9,
            "treatment": "T",
            "description": "D",
            "severity": "high",
            "recommendations": ["water less"]
        });

        let prediction = normalize(Some(&raw));
        assert_eq!(prediction.plant.as_deref(), Some("Tomato"));
        assert_eq!(prediction.disease, "Blight");
        assert_eq!(prediction.confidence, 0.9);
        assert_eq!(prediction.severity, Severity::High);
        assert_eq!(
            prediction.recommendations,
            Some(vec!["water less".to_string()])
        );
    }

    #[test]
    fn flat_shape_with_missing_fields_gets_defaults() {
        let raw = json!({ "disease": "Rust" });

        let prediction = normalize(Some(&raw));
        assert_eq!(prediction.disease, "Rust");
        assert_eq!(prediction.plant, None);
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.treatment, DEFAULT_TREATMENT);
        assert_eq!(prediction.description, DEFAULT_DESCRIPTION);
        assert_eq!(prediction.severity, Severity::Unknown);
        assert_eq!(prediction.recommendations, None);
    }

    #[test]
    fn lite_payload_without_plant_prediction_is_treated_as_flat() {
        // A lite response carrying only disease_prediction lacks
        // plant_prediction.plant, so it does not match the nested shape.
        let raw = json!({
            "disease_prediction": { "disease": "Blight", "confidence": 0.5 }
        });

        let prediction = normalize(Some(&raw));
        assert_eq!(prediction.disease, "Unknown");
        assert_eq!(prediction.confidence, 0.0);
    }

    #[test]
    fn unexpected_severity_label_falls_back_to_unknown() {
        let raw = json!({ "disease": "Blight", "severity": "catastrophic" });
        assert_eq!(normalize(Some(&raw)).severity, Severity::Unknown);
    }

    #[test]
    fn serde_defaults_match_the_normalizer() {
        let partial: NormalizedPrediction = serde_json::from_value(json!({})).unwrap();
        assert_eq!(partial, NormalizedPrediction::unknown());

        let severity: Severity = serde_json::from_value(json!("nonsense")).unwrap();
        assert_eq!(severity, Severity::Unknown);
        assert_eq!(serde_json::to_value(Severity::Unknown).unwrap(), "Unknown");
        assert_eq!(serde_json::to_value(Severity::High).unwrap(), "high");
    }
}
