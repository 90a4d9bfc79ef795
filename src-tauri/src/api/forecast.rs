use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::models::DemandInput;

use super::{request_id, InferenceClient};

/// Body of the single-day forecast call. Same field names as the form
/// record, except the holiday flag goes out as 0/1 instead of a bool
/// because that is what the model was trained on.
#[derive(Debug, Clone, Serialize)]
pub struct DayForecastRequest {
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Fuel_Price")]
    pub fuel_price: f64,
    #[serde(rename = "MarkDown1")]
    pub markdown1: f64,
    #[serde(rename = "MarkDown2")]
    pub markdown2: f64,
    #[serde(rename = "MarkDown3")]
    pub markdown3: f64,
    #[serde(rename = "MarkDown4")]
    pub markdown4: f64,
    #[serde(rename = "MarkDown5")]
    pub markdown5: f64,
    #[serde(rename = "CPI")]
    pub cpi: f64,
    #[serde(rename = "Unemployment")]
    pub unemployment: f64,
    #[serde(rename = "Size")]
    pub size: u32,
    #[serde(rename = "IsHoliday")]
    pub is_holiday: u8,
}

impl From<&DemandInput> for DayForecastRequest {
    fn from(input: &DemandInput) -> Self {
        let input = input.sanitized();
        Self {
            temperature: input.temperature,
            fuel_price: input.fuel_price,
            markdown1: input.markdown1,
            markdown2: input.markdown2,
            markdown3: input.markdown3,
            markdown4: input.markdown4,
            markdown5: input.markdown5,
            cpi: input.cpi,
            unemployment: input.unemployment,
            size: input.size,
            is_holiday: u8::from(input.is_holiday),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DayForecastResponse {
    predicted_sales: f64,
}

#[derive(Debug, Serialize)]
struct RangeForecastRequest {
    days: u32,
}

#[derive(Debug, Deserialize)]
struct RangeForecastResponse {
    predicted_sales: Vec<f64>,
}

impl InferenceClient {
    /// Predicted sales for a single day with the given conditions.
    pub async fn predict_day(&self, request: &DayForecastRequest) -> Result<f64> {
        let rid = request_id();
        let url = format!("{}/predict_day", self.forecast_base);
        info!("[{rid}] POST {url}");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to reach forecast service")?;

        if !response.status().is_success() {
            bail!("forecast service returned {}", response.status());
        }

        let body: DayForecastResponse = response
            .json()
            .await
            .context("Failed to parse forecast response")?;

        info!("[{rid}] predicted sales {:.2}", body.predicted_sales);
        Ok(body.predicted_sales)
    }

    /// Ordered daily sales values for the next `days` days. Dates are not
    /// part of the response; the caller attaches them starting today.
    pub async fn predict_days(&self, days: u32) -> Result<Vec<f64>> {
        let rid = request_id();
        let url = format!("{}/predict_days", self.forecast_base);
        info!("[{rid}] POST {url} (days: {days})");

        let response = self
            .http
            .post(&url)
            .json(&RangeForecastRequest { days })
            .send()
            .await
            .context("Failed to reach forecast service")?;

        if !response.status().is_success() {
            bail!("forecast service returned {}", response.status());
        }

        let body: RangeForecastResponse = response
            .json()
            .await
            .context("Failed to parse forecast response")?;

        info!("[{rid}] received {} daily values", body.predicted_sales.len());
        Ok(body.predicted_sales)
    }
}
