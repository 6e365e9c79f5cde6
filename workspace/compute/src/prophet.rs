//! Prophet predictor.
//!
//! Evaluates a model fitted offline by Prophet and serialized with
//! `prophet.serialize.model_to_json`. Only prediction is implemented; the
//! trend, seasonality and uncertainty computations follow Prophet's MAP
//! predict path.

mod seasonality;
mod serialize;
mod trend;
mod uncertainty;

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use common::{ModelSummary, SeasonalitySummary};
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};
use crate::horizon::Horizon;
use crate::model::{ForecastModel, ForecastPoint, Observation, PredictedSeries, TrainedModel};
use crate::timeline::{Frequency, Timeline};

use seasonality::{Seasonality, SeasonalityMode};

use seasonality::SeasonalDesign;
use serialize::{ParamValue, SerializedModel};

/// Seed of the uncertainty simulations unless configured otherwise.
pub const DEFAULT_UNCERTAINTY_SEED: u64 = 4587;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    Linear,
    Flat,
}

impl Growth {
    pub fn as_str(self) -> &'static str {
        match self {
            Growth::Linear => "linear",
            Growth::Flat => "flat",
        }
    }
}

/// One posterior sample of the fitted parameters (a single one for MAP fits).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParamRow {
    pub k: f64,
    pub m: f64,
    pub delta: Vec<f64>,
    pub sigma_obs: f64,
    pub beta: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Params {
    pub rows: Vec<ParamRow>,
    /// Column-wise mean of `rows`, used for the point forecast.
    pub mean: ParamRow,
}

/// A fitted Prophet model, immutable once loaded.
#[derive(Debug, Clone)]
pub struct ProphetModel {
    growth: Growth,
    start: f64,
    t_scale: f64,
    y_scale: f64,
    floor: f64,
    changepoints_t: Vec<f64>,
    params: Params,
    seasonalities: Vec<Seasonality>,
    history: Vec<Observation>,
    history_dates: Vec<NaiveDate>,
    interval_width: f64,
    uncertainty_samples: usize,
    uncertainty_seed: u64,
    version: Option<String>,
}

/// Reads and materializes the model stored at `path`.
#[instrument]
pub fn load_model(path: &Path) -> Result<ProphetModel> {
    let raw = std::fs::read_to_string(path)?;
    let model = ProphetModel::from_json_str(&raw)?;
    info!(
        history = model.history.len(),
        last_trained_date = ?model.history_dates.last(),
        "Loaded forecasting model"
    );
    Ok(model)
}

impl ProphetModel {
    /// Parses a Prophet JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let serialized: SerializedModel = serde_json::from_str(raw)?;
        Self::from_serialized(serialized)
    }

    /// Replaces the seed of the uncertainty simulations.
    pub fn with_uncertainty_seed(mut self, seed: u64) -> Self {
        self.uncertainty_seed = seed;
        self
    }

    /// Replaces the number of uncertainty simulations (0 disables them).
    pub fn with_uncertainty_samples(mut self, samples: usize) -> Self {
        self.uncertainty_samples = samples;
        self
    }


    fn from_serialized(s: SerializedModel) -> Result<Self> {
        let growth = match s.growth.as_str() {
            "linear" => Growth::Linear,
            "flat" => Growth::Flat,
            other => return Err(ComputeError::Unsupported(format!("{} growth", other))),
        };
        if s.logistic_floor {
            return Err(ComputeError::Unsupported("logistic floor".to_string()));
        }
        if s.holidays.is_some() || s.train_holiday_names.is_some() || s.country_holidays.is_some() {
            return Err(ComputeError::Unsupported("holidays".to_string()));
        }
        if let Some((names, _)) = &s.extra_regressors {
            if !names.is_empty() {
                return Err(ComputeError::Unsupported(format!(
                    "extra regressors {:?}",
                    names
                )));
            }
        }
        if !(s.t_scale > 0.0) || !s.y_scale.is_finite() || !s.start.is_finite() {
            return Err(ComputeError::ModelFormat(
                "start, t_scale and y_scale must be finite and t_scale positive".to_string(),
            ));
        }

        let floor = match s.scaling.as_deref() {
            None | Some("absmax") => 0.0,
            Some("minmax") => s.y_min.unwrap_or(0.0),
            Some(other) => {
                return Err(ComputeError::ModelFormat(format!("unknown scaling '{}'", other)));
            }
        };

        let seasonalities = parse_seasonalities(s.seasonalities)?;
        let changepoints_t = s.changepoints_t.unwrap_or_default();
        let feature_width: usize = seasonalities.iter().map(Seasonality::width).sum();
        let params = parse_params(s.params, changepoints_t.len(), feature_width)?;

        let mut history_dates = serialize::parse_date_series(&s.history_dates)?;
        history_dates.sort();
        history_dates.dedup();
        let history: Vec<Observation> = serialize::parse_history(&s.history)?
            .into_iter()
            .map(|(date, value)| Observation { date, value })
            .collect();
        if history_dates.is_empty() {
            return Err(ComputeError::ModelFormat("model has no history dates".to_string()));
        }

        debug!(
            growth = growth.as_str(),
            seasonalities = seasonalities.len(),
            changepoints = changepoints_t.len(),
            samples = params.rows.len(),
            "Parsed serialized model"
        );

        Ok(Self {
            growth,
            start: s.start,
            t_scale: s.t_scale,
            y_scale: s.y_scale,
            floor,
            changepoints_t,
            params,
            seasonalities,
            history,
            history_dates,
            interval_width: s.interval_width,
            uncertainty_samples: serialize::uncertainty_samples(&s.uncertainty_samples)?,
            uncertainty_seed: DEFAULT_UNCERTAINTY_SEED,
            version: s.version,
        })
    }

    /// Scaled time of `date`: 0 at the first training date, 1 at the last.
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (epoch_seconds(date) - self.start) / self.t_scale
    }

    fn point_trend(&self, t: &[f64]) -> Vec<f64> {
        let point = &self.params.mean;
        let scaled = match self.growth {
            Growth::Linear => {
                trend::piecewise_linear(t, &point.delta, point.k, point.m, &self.changepoints_t)
            }
            Growth::Flat => trend::flat(t, point.m),
        };
        scaled
            .into_iter()
            .map(|v| v * self.y_scale + self.floor)
            .collect()
    }
}

impl ForecastModel for ProphetModel {
    fn extend_timeline(&self, horizon: Horizon, frequency: Frequency) -> Result<Timeline> {
        let last = self
            .history_dates
            .last()
            .copied()
            .ok_or_else(|| ComputeError::Timeline("model has no history".to_string()))?;
        let future = frequency.dates_after(last, horizon.as_usize())?;
        Timeline::new(&self.history_dates, future)
    }

    #[instrument(skip(self, timeline), fields(points = timeline.len()))]
    fn predict(&self, timeline: &Timeline) -> Result<PredictedSeries> {
        let dates = timeline.dates();
        if dates.is_empty() {
            return Ok(PredictedSeries::default());
        }

        let t: Vec<f64> = dates.iter().map(|&d| self.scaled_time(d)).collect();
        let trend = self.point_trend(&t);
        let design = SeasonalDesign::build(dates, &self.seasonalities);
        let terms = design.apply(&self.params.mean.beta);

        let yhat: Vec<f64> = (0..dates.len())
            .map(|i| trend[i] * (1.0 + terms.multiplicative[i]) + terms.additive[i] * self.y_scale)
            .collect();
        if let Some(bad) = yhat.iter().position(|v| !v.is_finite()) {
            return Err(ComputeError::Prediction(format!(
                "non-finite prediction at {}",
                dates[bad]
            )));
        }

        let bounds = uncertainty::intervals(self, &t, &design, &yhat)?;

        let points = dates
            .iter()
            .zip(yhat)
            .zip(bounds)
            .map(|((&date, yhat), (yhat_lower, yhat_upper))| ForecastPoint {
                date,
                yhat,
                yhat_lower,
                yhat_upper,
            })
            .collect();

        debug!(future = timeline.future_len(), "Prediction finished");
        Ok(PredictedSeries::new(points))
    }
}

impl TrainedModel for ProphetModel {
    fn history(&self) -> &[Observation] {
        &self.history
    }

    fn last_trained_date(&self) -> Option<NaiveDate> {
        self.history_dates.last().copied()
    }

    fn summary(&self) -> ModelSummary {
        ModelSummary {
            growth: self.growth.as_str().to_string(),
            first_trained_date: self.history_dates[0],
            last_trained_date: self.history_dates[self.history_dates.len() - 1],
            history_len: self.history.len(),
            changepoints: self.changepoints_t.len(),
            seasonalities: self
                .seasonalities
                .iter()
                .map(|s| SeasonalitySummary {
                    name: s.name.clone(),
                    period: s.period,
                    fourier_order: s.fourier_order,
                    mode: s.mode.as_str().to_string(),
                })
                .collect(),
            interval_width: self.interval_width,
            uncertainty_samples: self.uncertainty_samples,
            serialized_by: self.version.as_ref().map(|v| format!("prophet {}", v)),
        }
    }
}

fn parse_seasonalities(
    (names, mut specs): (Vec<String>, std::collections::HashMap<String, serialize::SeasonalitySpec>),
) -> Result<Vec<Seasonality>> {
    names
        .into_iter()
        .map(|name| {
            let spec = specs.remove(&name).ok_or_else(|| {
                ComputeError::ModelFormat(format!("seasonality '{}' has no definition", name))
            })?;
            if let Some(condition) = spec.condition_name {
                return Err(ComputeError::Unsupported(format!(
                    "conditional seasonality '{}' on '{}'",
                    name, condition
                )));
            }
            let mode = match spec.mode.as_str() {
                "additive" => SeasonalityMode::Additive,
                "multiplicative" => SeasonalityMode::Multiplicative,
                other => {
                    return Err(ComputeError::ModelFormat(format!(
                        "seasonality '{}' has unknown mode '{}'",
                        name, other
                    )));
                }
            };
            if !(spec.period > 0.0) {
                return Err(ComputeError::ModelFormat(format!(
                    "seasonality '{}' has non-positive period",
                    name
                )));
            }
            Ok(Seasonality {
                name,
                period: spec.period,
                fourier_order: spec.fourier_order,
                mode,
            })
        })
        .collect()
}

fn parse_params(
    mut raw: std::collections::HashMap<String, ParamValue>,
    n_changepoints: usize,
    feature_width: usize,
) -> Result<Params> {
    let mut take = |name: &str| {
        raw.remove(name)
            .map(ParamValue::into_rows)
            .ok_or_else(|| ComputeError::ModelFormat(format!("missing parameter '{}'", name)))
    };
    let k = take("k")?;
    let m = take("m")?;
    let delta = take("delta")?;
    let sigma_obs = take("sigma_obs")?;
    let beta = take("beta")?;

    let n = k.len();
    if n == 0 || [m.len(), delta.len(), sigma_obs.len(), beta.len()].iter().any(|&len| len != n) {
        return Err(ComputeError::ModelFormat(
            "parameters have inconsistent sample counts".to_string(),
        ));
    }

    let scalar = |rows: &[Vec<f64>], i: usize, name: &str| {
        rows[i].first().copied().ok_or_else(|| {
            ComputeError::ModelFormat(format!("parameter '{}' has an empty sample", name))
        })
    };

    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        if delta[i].len() != n_changepoints {
            return Err(ComputeError::ModelFormat(format!(
                "expected {} changepoint deltas, found {}",
                n_changepoints,
                delta[i].len()
            )));
        }
        if beta[i].len() != feature_width {
            return Err(ComputeError::ModelFormat(format!(
                "expected {} seasonal coefficients, found {}",
                feature_width,
                beta[i].len()
            )));
        }
        rows.push(ParamRow {
            k: scalar(&k, i, "k")?,
            m: scalar(&m, i, "m")?,
            delta: delta[i].clone(),
            sigma_obs: scalar(&sigma_obs, i, "sigma_obs")?,
            beta: beta[i].clone(),
        });
    }

    let mean = mean_row(&rows);
    Ok(Params { rows, mean })
}

fn mean_row(rows: &[ParamRow]) -> ParamRow {
    let mut mean = rows[0].clone();
    for row in &rows[1..] {
        mean.k += row.k;
        mean.m += row.m;
        mean.sigma_obs += row.sigma_obs;
        for (acc, value) in mean.delta.iter_mut().zip(&row.delta) {
            *acc += value;
        }
        for (acc, value) in mean.beta.iter_mut().zip(&row.beta) {
            *acc += value;
        }
    }

    let n = rows.len() as f64;
    mean.k /= n;
    mean.m /= n;
    mean.sigma_obs /= n;
    mean.delta.iter_mut().for_each(|v| *v /= n);
    mean.beta.iter_mut().for_each(|v| *v /= n);
    mean
}

pub(crate) fn epoch_seconds(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

pub(crate) fn epoch_days(date: NaiveDate) -> f64 {
    epoch_seconds(date) / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_model;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixture_loads() {
        let model = fixture_model();
        let summary = model.summary();

        assert_eq!(summary.growth, "linear");
        assert_eq!(summary.last_trained_date, date(2024, 9, 9));
        assert_eq!(summary.first_trained_date, date(2024, 7, 1));
        assert_eq!(summary.history_len, 51);
        assert_eq!(summary.changepoints, 5);
        let names: Vec<_> = summary.seasonalities.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["yearly", "weekly"]);
    }

    #[test]
    fn test_scaled_time_spans_history() {
        let model = fixture_model();
        assert!(model.scaled_time(date(2024, 7, 1)).abs() < 1e-12);
        assert!((model.scaled_time(date(2024, 9, 9)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_covers_history_and_future() {
        let model = fixture_model();
        let timeline = model
            .extend_timeline(Horizon::new(5).unwrap(), Frequency::BusinessDay)
            .unwrap();
        let series = model.predict(&timeline).unwrap();

        assert_eq!(series.len(), 51 + 5);
        let last = series.tail(5);
        assert_eq!(last[0].date, date(2024, 9, 10));
        assert_eq!(last[4].date, date(2024, 9, 16));
        // values computed independently from the fixture parameters
        assert!((last[0].yhat - 81.4848).abs() < 1e-3);
        assert!((last[4].yhat - 80.9118).abs() < 1e-3);
    }

    #[test]
    fn test_bounds_enclose_point_forecast() {
        let model = fixture_model();
        let timeline = model
            .extend_timeline(Horizon::new(30).unwrap(), Frequency::BusinessDay)
            .unwrap();
        let series = model.predict(&timeline).unwrap();

        for point in series.tail(30) {
            assert!(point.yhat_lower < point.yhat, "{:?}", point);
            assert!(point.yhat < point.yhat_upper, "{:?}", point);
        }
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = fixture_model();
        let timeline = model
            .extend_timeline(Horizon::new(10).unwrap(), Frequency::BusinessDay)
            .unwrap();

        assert_eq!(model.predict(&timeline).unwrap(), model.predict(&timeline).unwrap());
    }

    #[test]
    fn test_disabled_uncertainty_collapses_bounds() {
        let model = fixture_model().with_uncertainty_samples(0);
        let timeline = model
            .extend_timeline(Horizon::default(), Frequency::BusinessDay)
            .unwrap();
        let series = model.predict(&timeline).unwrap();

        let point = series.tail(1)[0];
        assert_eq!(point.yhat_lower, point.yhat);
        assert_eq!(point.yhat_upper, point.yhat);
    }

    #[test]
    fn test_rejects_logistic_growth() {
        let raw = crate::testing::fixture_json().replace("\"growth\": \"linear\"", "\"growth\": \"logistic\"");
        let err = ProphetModel::from_json_str(&raw).unwrap_err();
        assert!(matches!(err, ComputeError::Unsupported(_)), "{}", err);
    }

    #[test]
    fn test_rejects_mismatched_beta() {
        let mut doc: serde_json::Value = serde_json::from_str(crate::testing::fixture_json()).unwrap();
        doc["params"]["beta"] = serde_json::json!([[0.1, 0.2]]);
        let err = ProphetModel::from_json_str(&doc.to_string()).unwrap_err();
        assert!(matches!(err, ComputeError::ModelFormat(_)), "{}", err);
    }

    fn fixture_with(edit: impl FnOnce(&mut serde_json::Value)) -> Result<ProphetModel> {
        let mut doc: serde_json::Value = serde_json::from_str(crate::testing::fixture_json()).unwrap();
        edit(&mut doc);
        ProphetModel::from_json_str(&doc.to_string())
    }

    fn future_yhat(model: ProphetModel) -> Vec<f64> {
        let model = model.with_uncertainty_samples(0);
        let timeline = model
            .extend_timeline(Horizon::new(10).unwrap(), Frequency::BusinessDay)
            .unwrap();
        let series = model.predict(&timeline).unwrap();
        series.tail(10).iter().map(|p| p.yhat).collect()
    }

    fn zero_beta(doc: &mut serde_json::Value, columns: std::ops::Range<usize>) {
        for i in columns {
            doc["params"]["beta"][0][i] = serde_json::json!(0.0);
        }
    }

    #[test]
    fn test_rejects_holidays() {
        for field in ["holidays", "train_holiday_names", "country_holidays"] {
            let err = fixture_with(|doc| doc[field] = serde_json::json!("BR")).unwrap_err();
            assert!(matches!(err, ComputeError::Unsupported(_)), "{}: {}", field, err);
        }
    }

    #[test]
    fn test_rejects_extra_regressors() {
        let err = fixture_with(|doc| {
            doc["extra_regressors"] = serde_json::json!([["usd_index"], {"usd_index": {"mode": "additive"}}]);
        })
        .unwrap_err();
        assert!(matches!(err, ComputeError::Unsupported(_)), "{}", err);
    }

    #[test]
    fn test_rejects_conditional_seasonality() {
        let err = fixture_with(|doc| {
            doc["seasonalities"][1]["weekly"]["condition_name"] = serde_json::json!("on_season");
        })
        .unwrap_err();
        assert!(matches!(err, ComputeError::Unsupported(_)), "{}", err);
    }

    #[test]
    fn test_rejects_mismatched_delta() {
        let err = fixture_with(|doc| doc["params"]["delta"] = serde_json::json!([[0.1]])).unwrap_err();
        assert!(matches!(err, ComputeError::ModelFormat(_)), "{}", err);
        assert!(err.to_string().contains("expected 5 changepoint deltas"), "{}", err);
    }

    #[test]
    fn test_rejects_unknown_scaling() {
        let err = fixture_with(|doc| doc["scaling"] = serde_json::json!("zscore")).unwrap_err();
        assert!(matches!(err, ComputeError::ModelFormat(_)), "{}", err);
    }

    #[test]
    fn test_flat_growth_predicts_offset() {
        let model = fixture_with(|doc| {
            doc["growth"] = serde_json::json!("flat");
            zero_beta(doc, 0..26);
        })
        .unwrap();
        assert_eq!(model.summary().growth, "flat");

        for yhat in future_yhat(model) {
            assert!((yhat - 0.985 * 88.77).abs() < 1e-9, "{}", yhat);
        }
    }

    #[test]
    fn test_minmax_scaling_shifts_by_floor() {
        let absmax = future_yhat(fixture_model());
        let minmax = future_yhat(
            fixture_with(|doc| {
                doc["scaling"] = serde_json::json!("minmax");
                doc["y_min"] = serde_json::json!(10.0);
            })
            .unwrap(),
        );

        for (a, m) in absmax.iter().zip(&minmax) {
            assert!((m - (a + 10.0)).abs() < 1e-9, "{} vs {}", m, a);
        }
    }

    #[test]
    fn test_multiplicative_seasonality_scales_with_trend() {
        let trend = future_yhat(fixture_with(|doc| zero_beta(doc, 0..26)).unwrap());
        let no_weekly = future_yhat(fixture_with(|doc| zero_beta(doc, 20..26)).unwrap());
        let full = future_yhat(fixture_model());
        let multiplicative = future_yhat(
            fixture_with(|doc| {
                doc["seasonalities"][1]["weekly"]["mode"] = serde_json::json!("multiplicative");
            })
            .unwrap(),
        );

        for i in 0..trend.len() {
            let weekly = (full[i] - no_weekly[i]) / 88.77;
            let expected = no_weekly[i] + trend[i] * weekly;
            assert!(
                (multiplicative[i] - expected).abs() < 1e-9,
                "day {}: {} vs {}",
                i,
                multiplicative[i],
                expected
            );
        }
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ProphetModel::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ComputeError::Json(_)));
    }

    #[test]
    fn test_load_model_missing_file() {
        let err = load_model(Path::new("/nonexistent/modelo.json")).unwrap_err();
        assert!(matches!(err, ComputeError::ModelFile(_)));
    }
}
