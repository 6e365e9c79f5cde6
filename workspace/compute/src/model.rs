//! The forecasting capability the rest of the application depends on.
//!
//! The web layer and the session logic only ever see these traits, so a
//! different backend (or a stub in tests) can stand in for the Prophet
//! predictor.

use chrono::NaiveDate;
use common::ModelSummary;

use crate::error::Result;
use crate::horizon::Horizon;
use crate::timeline::{Frequency, Timeline};

/// A training observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A predicted value with its uncertainty interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Output of a single predict call, ascending by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictedSeries {
    points: Vec<ForecastPoint>,
}

impl PredictedSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// The last `n` points (all of them when `n` exceeds the length).
    pub fn tail(&self, n: usize) -> &[ForecastPoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A pre-fit, immutable forecasting model.
pub trait ForecastModel: Send + Sync {
    /// The trained timeline extended by `horizon` steps of `frequency`.
    fn extend_timeline(&self, horizon: Horizon, frequency: Frequency) -> Result<Timeline>;

    /// Predicts every date of `timeline`.
    fn predict(&self, timeline: &Timeline) -> Result<PredictedSeries>;
}

/// A [`ForecastModel`] that also remembers what it was trained on.
pub trait TrainedModel: ForecastModel {
    /// Training observations in ascending date order.
    fn history(&self) -> &[Observation];

    fn summary(&self) -> ModelSummary;

    fn last_trained_date(&self) -> Option<NaiveDate> {
        self.history().last().map(|obs| obs.date)
    }
}
