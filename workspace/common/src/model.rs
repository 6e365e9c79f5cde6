use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Seasonal component of a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeasonalitySummary {
    pub name: String,
    /// Period in days
    pub period: f64,
    pub fourier_order: usize,
    /// "additive" or "multiplicative"
    pub mode: String,
}

/// Read-only description of the forecasting model served by this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelSummary {
    /// Trend type ("linear" or "flat")
    pub growth: String,
    /// First date of the training history
    pub first_trained_date: NaiveDate,
    /// Last date of the training history; forecasts start after it
    pub last_trained_date: NaiveDate,
    /// Number of training observations
    pub history_len: usize,
    /// Number of trend changepoints
    pub changepoints: usize,
    pub seasonalities: Vec<SeasonalitySummary>,
    /// Width of the uncertainty interval (e.g. 0.8)
    pub interval_width: f64,
    /// Monte Carlo draws used for the uncertainty interval
    pub uncertainty_samples: usize,
    /// Library version that serialized the model, when recorded
    pub serialized_by: Option<String>,
}
