use chrono::NaiveDate;
use common::{ForecastTable, ForecastTableRow, ModelSummary, SeasonalitySummary};
use compute::TrainedModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

use crate::sessions::SessionStore;

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Forecasting model, loaded once and never mutated
    pub model: Arc<dyn TrainedModel>,
    /// Per-visitor forecast contexts
    pub sessions: SessionStore,
    /// Looker Studio report embedded in the dashboard tab
    pub dashboard_url: Arc<str>,
}

impl AppState {
    pub fn new(model: Arc<dyn TrainedModel>, sessions: SessionStore, dashboard_url: String) -> Self {
        Self {
            model,
            sessions,
            dashboard_url: dashboard_url.into(),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("last_trained_date", &self.model.last_trained_date())
            .field("sessions", &self.sessions)
            .field("dashboard_url", &self.dashboard_url)
            .finish()
    }
}

/// Query parameters for forecast endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ForecastQuery {
    /// Number of business days to forecast (default: 1)
    #[validate(range(min = 1, max = 30))]
    pub horizon: Option<u32>,
}

/// A computed forecast
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForecastResponse {
    /// Number of business days forecast
    pub horizon: u32,
    /// Last date of the training history
    pub last_trained_date: Option<NaiveDate>,
    /// Point forecasts, one row per business day
    pub table: ForecastTable,
    /// Plotly figure (`data` and `layout`) including the uncertainty band
    #[schema(value_type = Object)]
    pub chart: serde_json::Value,
    /// Suggested name of the CSV export
    pub file_name: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Model status
    pub model: String,
    /// Last date the model was trained on
    pub last_trained_date: Option<NaiveDate>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::forecast::get_model,
        crate::handlers::forecast::get_forecast,
        crate::handlers::forecast::get_forecast_csv,
    ),
    components(
        schemas(
            ApiResponse<ForecastResponse>,
            ApiResponse<ModelSummary>,
            ErrorResponse,
            HealthResponse,
            ForecastQuery,
            ForecastResponse,
            ForecastTable,
            ForecastTableRow,
            ModelSummary,
            SeasonalitySummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "model", description = "Loaded forecasting model"),
        (name = "forecast", description = "Brent oil price forecast endpoints"),
    ),
    info(
        title = "Brentcast API",
        description = "Brent crude oil price forecasts from a pre-fit Prophet model",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
