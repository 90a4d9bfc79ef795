mod catalog;
mod forecast;
mod vision;

pub use forecast::DayForecastRequest;

use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use reqwest::Client;
use uuid::Uuid;

use crate::settings::InferenceSettings;

/// Outbound boundary of the dashboard: one HTTP client plus the base URLs of
/// the three inference services. Calls live in the sibling files (forecast,
/// catalog, vision); everything else in the app goes through these methods
/// and never touches HTTP directly.
#[derive(Clone)]
pub struct InferenceClient {
    http: Client,
    forecast_base: String,
    catalog_base: String,
    vision_base: String,
}

impl InferenceClient {
    pub fn from_settings(settings: &InferenceSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            forecast_base: trimmed(&settings.forecast_base_url),
            catalog_base: trimmed(&settings.catalog_base_url),
            vision_base: trimmed(&settings.vision_base_url),
        })
    }
}

/// Shared handle the controllers hold. Settings updates swap the client
/// underneath without restarting anything; in-flight requests keep the
/// client they started with.
#[derive(Clone)]
pub struct InferenceHandle {
    inner: Arc<RwLock<InferenceClient>>,
}

impl InferenceHandle {
    pub fn new(client: InferenceClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(client)),
        }
    }

    pub fn current(&self) -> InferenceClient {
        self.inner.read().unwrap().clone()
    }

    pub fn replace(&self, client: InferenceClient) {
        *self.inner.write().unwrap() = client;
    }
}

fn trimmed(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// Short correlation id so one request's log lines can be grepped together.
fn request_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
pub(crate) fn test_client(base_url: &str) -> InferenceClient {
    InferenceClient::from_settings(&InferenceSettings {
        forecast_base_url: base_url.into(),
        catalog_base_url: base_url.into(),
        vision_base_url: base_url.into(),
        request_timeout_secs: 5,
    })
    .expect("test client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_lose_their_trailing_slash() {
        let client = InferenceClient::from_settings(&InferenceSettings {
            forecast_base_url: "http://localhost:9001/".into(),
            ..InferenceSettings::default()
        })
        .unwrap();

        assert_eq!(client.forecast_base, "http://localhost:9001");
    }

    #[test]
    fn request_ids_are_short_and_unique() {
        let a = request_id();
        let b = request_id();

        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
    }

    #[test]
    fn replacing_the_client_changes_what_current_returns() {
        let handle = InferenceHandle::new(test_client("http://localhost:9001"));
        handle.replace(test_client("http://localhost:9002"));

        assert_eq!(handle.current().catalog_base, "http://localhost:9002");
    }
}
