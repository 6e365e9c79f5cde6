//! Per-session forecast interaction.
//!
//! Computing a forecast ([`on_submit`]) and displaying it ([`render`]) are
//! separate: a page may be rendered any number of times from the stored
//! [`SessionContext`] without predicting again.

use common::ForecastTable;
use tracing::{debug, info};

use crate::chart::{ChartSpec, forecast_chart};
use crate::error::Result;
use crate::horizon::Horizon;
use crate::model::{ForecastModel, Observation, PredictedSeries};
use crate::table::{forecast_table, write_csv};
use crate::timeline::Frequency;

/// A predicted series together with the horizon it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub horizon: Horizon,
    pub series: PredictedSeries,
}

/// State kept for one user session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    /// Set once the user asked for a forecast; never reset within a session.
    pub forecast_requested: bool,
    /// Most recent successful forecast.
    pub last_forecast: Option<ForecastRun>,
}

/// Everything the page shows for a requested forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub chart: ChartSpec,
    pub table: ForecastTable,
    pub csv: Vec<u8>,
    pub file_name: String,
}

/// Extends the model's timeline by `horizon` business days and predicts it.
pub fn on_submit<M>(model: &M, horizon: Horizon) -> Result<ForecastRun>
where
    M: ForecastModel + ?Sized,
{
    let timeline = model.extend_timeline(horizon, Frequency::BusinessDay)?;
    let series = model.predict(&timeline)?;
    info!(%horizon, points = series.len(), "Forecast computed");
    Ok(ForecastRun { horizon, series })
}

/// Chart, table and CSV for the stored forecast, or `None` while nothing has
/// been requested.
pub fn render(context: &SessionContext, history: &[Observation]) -> Result<Option<RenderOutput>> {
    if !context.forecast_requested {
        return Ok(None);
    }
    let Some(run) = &context.last_forecast else {
        return Ok(None);
    };

    let chart = forecast_chart(history, &run.series);
    let table = forecast_table(&run.series, run.horizon)?;
    let csv = write_csv(&table)?;
    let file_name = table.file_name();
    debug!(rows = table.len(), %file_name, "Rendered forecast");

    Ok(Some(RenderOutput {
        chart,
        table,
        csv,
        file_name,
    }))
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value the horizon input starts with: the last requested one, else 1.
    pub fn horizon(&self) -> Horizon {
        self.last_forecast
            .as_ref()
            .map(|run| run.horizon)
            .unwrap_or_default()
    }

    /// Marks the session as having requested a forecast.
    pub fn begin_request(&mut self) {
        self.forecast_requested = true;
    }

    /// Stores the outcome of a request, replacing any previous forecast. A
    /// failed request clears it so a stale forecast is never shown.
    pub fn finish_request(&mut self, outcome: Result<ForecastRun>) -> Result<&ForecastRun> {
        match outcome {
            Ok(run) => Ok(&*self.last_forecast.insert(run)),
            Err(e) => {
                self.last_forecast = None;
                Err(e)
            }
        }
    }

    /// Handles an activation of the predict control.
    pub fn submit<M>(&mut self, model: &M, horizon: Horizon) -> Result<&ForecastRun>
    where
        M: ForecastModel + ?Sized,
    {
        self.begin_request();
        let outcome = on_submit(model, horizon);
        self.finish_request(outcome)
    }
}
