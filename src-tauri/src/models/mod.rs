pub mod forecast;
pub mod product;

pub use forecast::{
    build_forecast_series, clamp_days, DemandInput, PredictionPoint, MAX_FORECAST_DAYS,
    MIN_FORECAST_DAYS,
};
pub use product::Product;
