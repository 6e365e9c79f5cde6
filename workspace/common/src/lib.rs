//! Common transport-layer types shared between the JSON API, the HTML pages
//! and the CLI. Nothing in here knows how a forecast is computed.

mod forecast;
mod model;

pub use forecast::{
    DATE_COLUMN_LABEL, ForecastTable, ForecastTableRow, PRICE_COLUMN_LABEL, TABLE_DATE_FORMAT,
};
pub use model::{ModelSummary, SeasonalitySummary};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// Wraps `data` in a successful response.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}
