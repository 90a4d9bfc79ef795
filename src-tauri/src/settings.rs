use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

pub const DEFAULT_SERVICE_URL: &str = "https://predicciones-9fuy.onrender.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the dashboard sends its inference traffic. Each page group can be
/// pointed at its own host; by default all three live on the same service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceSettings {
    pub forecast_base_url: String,
    pub catalog_base_url: String,
    pub vision_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            forecast_base_url: DEFAULT_SERVICE_URL.into(),
            catalog_base_url: DEFAULT_SERVICE_URL.into(),
            vision_base_url: DEFAULT_SERVICE_URL.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InferenceSettings {
    /// Timeout as a `Duration`, clamped so a typo in the settings file cannot
    /// produce an instant or multi-hour timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.clamp(1, 300))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserSettings {
    inference: InferenceSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            inference: InferenceSettings::default(),
        }
    }
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
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Settings file is malformed, falling back to defaults: {e}");
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn inference(&self) -> InferenceSettings {
        self.data.read().unwrap().inference.clone()
    }

    pub fn update_inference(&self, settings: InferenceSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.inference = settings;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.inference(), InferenceSettings::default());
    }

    #[test]
    fn updated_settings_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        let custom = InferenceSettings {
            forecast_base_url: "http://localhost:9001".into(),
            catalog_base_url: "http://localhost:9002".into(),
            vision_base_url: "http://localhost:9003".into(),
            request_timeout_secs: 5,
        };
        store.update_inference(custom.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.inference(), custom);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.inference(), InferenceSettings::default());
    }

    #[test]
    fn timeout_is_clamped_to_a_sane_range() {
        let mut settings = InferenceSettings::default();

        settings.request_timeout_secs = 0;
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));

        settings.request_timeout_secs = 100_000;
        assert_eq!(settings.request_timeout(), Duration::from_secs(300));
    }
}
