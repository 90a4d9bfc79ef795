use std::sync::Arc;

use chrono::Local;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::{DayForecastRequest, InferenceHandle};
use crate::models::{build_forecast_series, clamp_days, DemandInput, PredictionPoint};
use crate::requests::RequestGate;

pub const PREDICTION_ERROR: &str = "No fue posible obtener la predicción. Inténtalo de nuevo.";

/// Everything the demand page renders. The two forms load independently,
/// hence the two loading flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandState {
    pub single_day_sales: Option<f64>,
    pub range: Vec<PredictionPoint>,
    pub error: Option<String>,
    pub loading_single: bool,
    pub loading_range: bool,
}

#[derive(Clone)]
pub struct DemandController {
    api: InferenceHandle,
    state: Arc<Mutex<DemandState>>,
    single_gate: RequestGate,
    range_gate: RequestGate,
}

impl DemandController {
    pub fn new(api: InferenceHandle) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(DemandState::default())),
            single_gate: RequestGate::new(),
            range_gate: RequestGate::new(),
        }
    }

    pub async fn get_state(&self) -> DemandState {
        self.state.lock().await.clone()
    }

    /// One forecast request for the submitted conditions. Failures are
    /// captured in the state; resubmitting while a request is in flight
    /// supersedes it.
    pub async fn predict_single_day(&self, input: DemandInput) -> DemandState {
        let ticket = self.single_gate.begin().await;
        {
            let mut state = self.state.lock().await;
            if ticket.token.is_cancelled() {
                return state.clone();
            }
            state.loading_single = true;
        }

        let client = self.api.current();
        let request = DayForecastRequest::from(&input);
        let outcome = tokio::select! {
            _ = ticket.token.cancelled() => {
                info!("single-day prediction superseded before completion");
                return self.get_state().await;
            }
            result = client.predict_day(&request) => result,
        };

        let mut state = self.state.lock().await;
        if !self.single_gate.finish(&ticket).await {
            info!("dropping stale single-day prediction result");
            return state.clone();
        }

        match outcome {
            Ok(sales) => {
                state.single_day_sales = Some(sales);
                state.error = None;
            }
            Err(err) => {
                error!("Single-day prediction failed: {err:#}");
                state.error = Some(PREDICTION_ERROR.to_string());
            }
        }
        state.loading_single = false;
        state.clone()
    }

    /// Forecast for the next `days` days. The response carries values only;
    /// dates are attached here starting from the local date.
    pub async fn predict_multiple_days(&self, days: u32) -> DemandState {
        let days = clamp_days(days);
        let ticket = self.range_gate.begin().await;
        {
            let mut state = self.state.lock().await;
            if ticket.token.is_cancelled() {
                return state.clone();
            }
            state.loading_range = true;
        }

        let client = self.api.current();
        let outcome = tokio::select! {
            _ = ticket.token.cancelled() => {
                info!("multi-day prediction superseded before completion");
                return self.get_state().await;
            }
            result = client.predict_days(days) => result,
        };

        let mut state = self.state.lock().await;
        if !self.range_gate.finish(&ticket).await {
            info!("dropping stale multi-day prediction result");
            return state.clone();
        }

        match outcome {
            Ok(values) => {
                let today = Local::now().date_naive();
                state.range = build_forecast_series(today, &values);
                state.error = None;
            }
            Err(err) => {
                error!("Multi-day prediction failed: {err:#}");
                state.error = Some(PREDICTION_ERROR.to_string());
            }
        }
        state.loading_range = false;
        state.clone()
    }

    /// Cancels whatever is in flight and returns the page to its initial
    /// state. Called when the user navigates away.
    pub async fn reset(&self) -> DemandState {
        self.single_gate.cancel_active().await;
        self.range_gate.cancel_active().await;

        let mut state = self.state.lock().await;
        *state = DemandState::default();
        state.clone()
    }
}
