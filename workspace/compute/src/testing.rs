//! Fixtures shared by the unit tests here and the web crate's tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use common::ModelSummary;

use crate::error::Result;
use crate::horizon::Horizon;
use crate::model::{ForecastModel, ForecastPoint, Observation, PredictedSeries, TrainedModel};
use crate::prophet::ProphetModel;
use crate::timeline::{Frequency, Timeline};

/// The bundled Prophet artifact: 51 business days of Brent prices from
/// 2024-07-01 to 2024-09-09 with yearly and weekly seasonality.
pub fn fixture_json() -> &'static str {
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../modelo_json_prophet.json"))
}

pub fn fixture_model() -> ProphetModel {
    ProphetModel::from_json_str(fixture_json()).expect("bundled model fixture must parse")
}

/// A model with a straight-line forecast that counts its predict calls.
pub struct StubModel {
    history: Vec<Observation>,
    predict_calls: AtomicUsize,
}

impl StubModel {
    /// `len` business days of history ending on `last`, rising by 0.5 a day
    /// from 70.0.
    pub fn business_days(last: NaiveDate, len: usize) -> Self {
        let mut dates = vec![last];
        while dates.len() < len {
            let previous = dates[dates.len() - 1].pred_opt().expect("date in range");
            let mut day = previous;
            while crate::timeline::is_weekend(day) {
                day = day.pred_opt().expect("date in range");
            }
            dates.push(day);
        }
        dates.reverse();

        let history = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| Observation {
                date,
                value: 70.0 + 0.5 * i as f64,
            })
            .collect();

        Self {
            history,
            predict_calls: AtomicUsize::new(0),
        }
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }
}

impl ForecastModel for StubModel {
    fn extend_timeline(&self, horizon: Horizon, frequency: Frequency) -> Result<Timeline> {
        let dates: Vec<NaiveDate> = self.history.iter().map(|o| o.date).collect();
        let last = dates[dates.len() - 1];
        Timeline::new(&dates, frequency.dates_after(last, horizon.as_usize())?)
    }

    fn predict(&self, timeline: &Timeline) -> Result<PredictedSeries> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        let points = timeline
            .dates()
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let yhat = 70.0 + 0.5 * i as f64;
                ForecastPoint {
                    date,
                    yhat,
                    yhat_lower: yhat - 1.0,
                    yhat_upper: yhat + 1.0,
                }
            })
            .collect();
        Ok(PredictedSeries::new(points))
    }
}

impl TrainedModel for StubModel {
    fn history(&self) -> &[Observation] {
        &self.history
    }

    fn summary(&self) -> ModelSummary {
        ModelSummary {
            growth: "linear".to_string(),
            first_trained_date: self.history[0].date,
            last_trained_date: self.history[self.history.len() - 1].date,
            history_len: self.history.len(),
            changepoints: 0,
            seasonalities: vec![],
            interval_width: 0.8,
            uncertainty_samples: 0,
            serialized_by: None,
        }
    }
}
