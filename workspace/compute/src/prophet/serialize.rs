//! Layout of the JSON document written by Prophet's `model_to_json`.
//!
//! Pandas objects are embedded as JSON *strings*: series use
//! `orient="split"` and data frames `orient="table"`, so they are decoded in a
//! second pass.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ComputeError, Result};

#[derive(Debug, Deserialize)]
pub(crate) struct SerializedModel {
    pub growth: String,
    #[serde(default)]
    pub scaling: Option<String>,
    pub y_scale: f64,
    #[serde(default)]
    pub y_min: Option<f64>,
    #[serde(default)]
    pub logistic_floor: bool,
    pub start: f64,
    pub t_scale: f64,
    #[serde(default)]
    pub changepoints_t: Option<Vec<f64>>,
    pub history_dates: String,
    pub history: String,
    pub seasonalities: (Vec<String>, HashMap<String, SeasonalitySpec>),
    #[serde(default)]
    pub extra_regressors: Option<(Vec<String>, Value)>,
    #[serde(default)]
    pub holidays: Option<String>,
    #[serde(default)]
    pub train_holiday_names: Option<String>,
    #[serde(default)]
    pub country_holidays: Option<String>,
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
    #[serde(default)]
    pub uncertainty_samples: Value,
    pub params: HashMap<String, ParamValue>,
    #[serde(rename = "__prophet_version", default)]
    pub version: Option<String>,
}

fn default_interval_width() -> f64 {
    0.8
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeasonalitySpec {
    pub period: f64,
    pub fourier_order: usize,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub condition_name: Option<String>,
}

fn default_mode() -> String {
    "additive".to_string()
}

/// A fitted parameter: one row per posterior sample (a single row for MAP
/// fits). Scalars sampled by MCMC come out as a flat list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ParamValue {
    Rows(Vec<Vec<f64>>),
    Flat(Vec<f64>),
}

impl ParamValue {
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        match self {
            ParamValue::Rows(rows) => rows,
            ParamValue::Flat(values) => values.into_iter().map(|v| vec![v]).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SplitSeries {
    data: Vec<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct TableFrame {
    data: Vec<HistoryRow>,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    ds: String,
    #[serde(default)]
    y: Option<f64>,
}

/// Decodes an `orient="split"` date series.
pub(crate) fn parse_date_series(raw: &str) -> Result<Vec<NaiveDate>> {
    let series: SplitSeries = serde_json::from_str(raw)?;
    series
        .data
        .into_iter()
        .flatten()
        .map(|ds| parse_timestamp(&ds))
        .collect()
}

/// Decodes the `orient="table"` history frame into `(ds, y)` pairs, dropping
/// rows without an observation.
pub(crate) fn parse_history(raw: &str) -> Result<Vec<(NaiveDate, f64)>> {
    let frame: TableFrame = serde_json::from_str(raw)?;
    let mut rows = Vec::with_capacity(frame.data.len());
    for row in frame.data {
        if let Some(y) = row.y {
            rows.push((parse_timestamp(&row.ds)?, y));
        }
    }
    Ok(rows)
}

/// Parses a pandas ISO timestamp such as `2024-09-09T00:00:00.000` (with or
/// without a trailing `Z`). Only midnight timestamps are accepted.
pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim().trim_end_matches('Z');
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        if datetime.time() != NaiveTime::MIN {
            return Err(ComputeError::Unsupported(format!(
                "sub-daily timestamp '{}'",
                raw
            )));
        }
        return Ok(datetime.date());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| ComputeError::ModelFormat(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Prophet stores `uncertainty_samples` as an integer or as `false`.
pub(crate) fn uncertainty_samples(value: &Value) -> Result<usize> {
    match value {
        Value::Null => Ok(1000),
        Value::Bool(false) => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| ComputeError::ModelFormat(format!("invalid uncertainty_samples {}", n))),
        other => Err(ComputeError::ModelFormat(format!(
            "invalid uncertainty_samples {}",
            other
        ))),
    }
}
