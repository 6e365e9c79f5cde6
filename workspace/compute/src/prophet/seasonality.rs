use std::f64::consts::PI;

use chrono::NaiveDate;

use super::epoch_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalityMode {
    Additive,
    Multiplicative,
}

impl SeasonalityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SeasonalityMode::Additive => "additive",
            SeasonalityMode::Multiplicative => "multiplicative",
        }
    }
}

/// A Fourier seasonality of the fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub name: String,
    pub period: f64,
    pub fourier_order: usize,
    pub mode: SeasonalityMode,
}

impl Seasonality {
    /// Number of feature columns (a sine and a cosine per order).
    pub fn width(&self) -> usize {
        2 * self.fourier_order
    }
}

/// `[sin(2πd/P), cos(2πd/P), sin(4πd/P), cos(4πd/P), ...]` for `d` days since
/// the Unix epoch.
pub(crate) fn fourier_features(days: f64, period: f64, order: usize, out: &mut Vec<f64>) {
    for i in 1..=order {
        let x = 2.0 * PI * i as f64 * days / period;
        out.push(x.sin());
        out.push(x.cos());
    }
}

/// Seasonal design matrix of a set of dates, one row per date.
pub(crate) struct SeasonalDesign {
    rows: Vec<Vec<f64>>,
    multiplicative: Vec<bool>,
}

/// Seasonal contributions before `y_scale` is applied.
pub(crate) struct SeasonalTerms {
    pub additive: Vec<f64>,
    pub multiplicative: Vec<f64>,
}

impl SeasonalDesign {
    pub fn build(dates: &[NaiveDate], seasonalities: &[Seasonality]) -> Self {
        let width = seasonalities.iter().map(Seasonality::width).sum();
        let multiplicative = seasonalities
            .iter()
            .flat_map(|s| std::iter::repeat(s.mode == SeasonalityMode::Multiplicative).take(s.width()))
            .collect();

        let rows = dates
            .iter()
            .map(|&date| {
                let days = epoch_days(date);
                let mut row = Vec::with_capacity(width);
                for s in seasonalities {
                    fourier_features(days, s.period, s.fourier_order, &mut row);
                }
                row
            })
            .collect();

        Self { rows, multiplicative }
    }

    pub fn width(&self) -> usize {
        self.multiplicative.len()
    }

    /// `X β`, split by component mode.
    pub fn apply(&self, beta: &[f64]) -> SeasonalTerms {
        let mut additive = Vec::with_capacity(self.rows.len());
        let mut multiplicative = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut add = 0.0;
            let mut mul = 0.0;
            for ((x, b), is_mul) in row.iter().zip(beta).zip(&self.multiplicative) {
                if *is_mul {
                    mul += x * b;
                } else {
                    add += x * b;
                }
            }
            additive.push(add);
            multiplicative.push(mul);
        }
        SeasonalTerms { additive, multiplicative }
    }
}
