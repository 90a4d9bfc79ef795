use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const MIN_FORECAST_DAYS: u32 = 1;
pub const MAX_FORECAST_DAYS: u32 = 30;

/// Input record for a single-day demand prediction. Field names mirror the
/// upstream model's feature names, so the form payload round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandInput {
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
    pub is_holiday: bool,
}

impl Default for DemandInput {
    fn default() -> Self {
        Self {
            temperature: 55.3,
            fuel_price: 2.75,
            markdown1: 1500.0,
            markdown2: 500.0,
            markdown3: 100.0,
            markdown4: 50.0,
            markdown5: 200.0,
            cpi: 220.5,
            unemployment: 6.2,
            size: 151_315,
            is_holiday: false,
        }
    }
}

impl DemandInput {
    /// Non-finite numbers cannot be carried in a JSON body, so they collapse
    /// to zero before the record goes on the wire. Negatives pass through.
    pub fn sanitized(&self) -> Self {
        Self {
            temperature: finite_or_zero(self.temperature),
            fuel_price: finite_or_zero(self.fuel_price),
            markdown1: finite_or_zero(self.markdown1),
            markdown2: finite_or_zero(self.markdown2),
            markdown3: finite_or_zero(self.markdown3),
            markdown4: finite_or_zero(self.markdown4),
            markdown5: finite_or_zero(self.markdown5),
            cpi: finite_or_zero(self.cpi),
            unemployment: finite_or_zero(self.unemployment),
            size: self.size,
            is_holiday: self.is_holiday,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One point of a multi-day forecast. The date is synthesized client-side;
/// the service only returns the ordered sales values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub sales: f64,
}

pub fn clamp_days(days: u32) -> u32 {
    days.clamp(MIN_FORECAST_DAYS, MAX_FORECAST_DAYS)
}

/// Value `i` of the response is dated `start + i` days, so an N-value
/// response always yields exactly N points starting today.
pub fn build_forecast_series(start: NaiveDate, values: &[f64]) -> Vec<PredictionPoint> {
    values
        .iter()
        .enumerate()
        .map(|(offset, sales)| PredictionPoint {
            date: start + Days::new(offset as u64),
            sales: *sales,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_has_one_point_per_value_with_consecutive_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let values = [120.0, 98.5, 143.25, 101.0];

        let series = build_forecast_series(start, &values);

        assert_eq!(series.len(), values.len());
        for (offset, point) in series.iter().enumerate() {
            assert_eq!(point.date, start + Days::new(offset as u64));
            assert_eq!(point.sales, values[offset]);
        }
    }

    #[test]
    fn empty_response_builds_empty_series() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(build_forecast_series(start, &[]).is_empty());
    }

    #[test]
    fn days_are_clamped_to_form_bounds() {
        assert_eq!(clamp_days(0), MIN_FORECAST_DAYS);
        assert_eq!(clamp_days(1), 1);
        assert_eq!(clamp_days(30), 30);
        assert_eq!(clamp_days(90), MAX_FORECAST_DAYS);
    }

    #[test]
    fn input_serializes_with_upstream_field_names() {
        let input = DemandInput::default();
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json["Temperature"], 55.3);
        assert_eq!(json["Fuel_Price"], 2.75);
        assert_eq!(json["MarkDown1"], 1500.0);
        assert_eq!(json["CPI"], 220.5);
        assert_eq!(json["Size"], 151_315);
        assert_eq!(json["IsHoliday"], false);
    }

    #[test]
    fn sanitize_drops_non_finite_values() {
        let input = DemandInput {
            temperature: f64::NAN,
            fuel_price: f64::INFINITY,
            ..DemandInput::default()
        };

        let sanitized = input.sanitized();

        assert_eq!(sanitized.temperature, 0.0);
        assert_eq!(sanitized.fuel_price, 0.0);
        assert_eq!(sanitized.cpi, 220.5);
    }
}
