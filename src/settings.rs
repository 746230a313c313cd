use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Where the app's remote collaborators live. Defaults point at the
/// development deployment; users on a different network override the
/// classifier address from the settings screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoints {
    pub classifier_base_url: String,
    pub api_base_url: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_upload_preset: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            classifier_base_url: "http://192.168.0.111:8000".into(),
            api_base_url: "http://192.168.0.111:8080".into(),
            cloudinary_cloud_name: "dovqvkbtx".into(),
            cloudinary_upload_preset: "plantcare".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    endpoints: ServiceEndpoints,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn endpoints(&self) -> ServiceEndpoints {
        self.data.read().unwrap().endpoints.clone()
    }

    pub fn update_endpoints(&self, endpoints: ServiceEndpoints) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.endpoints = endpoints;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
