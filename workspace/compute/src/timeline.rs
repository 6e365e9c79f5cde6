use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::{ComputeError, Result};

/// Step between consecutive future dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    /// Monday to Friday, no holiday calendar (pandas `B`)
    #[default]
    BusinessDay,
    /// Every calendar day (pandas `D`)
    Daily,
}

impl Frequency {
    /// First date of this frequency strictly after `date`.
    pub fn next_after(self, date: NaiveDate) -> Option<NaiveDate> {
        let mut next = date.checked_add_days(Days::new(1))?;
        if self == Frequency::BusinessDay {
            while is_weekend(next) {
                next = next.checked_add_days(Days::new(1))?;
            }
        }
        Some(next)
    }

    /// The first `periods` dates strictly after `last`.
    pub fn dates_after(self, last: NaiveDate, periods: usize) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::with_capacity(periods);
        let mut current = last;
        for _ in 0..periods {
            current = self.next_after(current).ok_or_else(|| {
                ComputeError::Timeline(format!("date overflow after {}", current))
            })?;
            dates.push(current);
        }
        Ok(dates)
    }
}

impl FromStr for Frequency {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "B" => Ok(Frequency::BusinessDay),
            "D" => Ok(Frequency::Daily),
            other => Err(ComputeError::Timeline(format!("unsupported frequency '{}'", other))),
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Dates a model is asked to predict: the trained history followed by the
/// future steps, strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    dates: Vec<NaiveDate>,
    future_len: usize,
}

impl Timeline {
    /// Joins `history` and `future`. Both must be ascending and every future
    /// date must come after the last history date.
    pub fn new(history: &[NaiveDate], future: Vec<NaiveDate>) -> Result<Self> {
        let mut dates = Vec::with_capacity(history.len() + future.len());
        dates.extend_from_slice(history);
        let future_len = future.len();
        dates.extend(future);

        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ComputeError::Timeline(format!(
                "timeline is not strictly ascending at {} -> {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self { dates, future_len })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn future_dates(&self) -> &[NaiveDate] {
        &self.dates[self.dates.len() - self.future_len..]
    }

    pub fn future_len(&self) -> usize {
        self.future_len
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
