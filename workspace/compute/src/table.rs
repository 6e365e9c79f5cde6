//! Forecast table projection and its CSV encoding.

use std::str::FromStr;

use chrono::NaiveDate;
use common::{
    DATE_COLUMN_LABEL, ForecastTable, ForecastTableRow, PRICE_COLUMN_LABEL, TABLE_DATE_FORMAT,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::error::{ComputeError, Result};
use crate::horizon::Horizon;
use crate::model::PredictedSeries;

/// The last `horizon` points of `series` with the date reformatted, the point
/// estimate rounded to two decimals and the index reset to `0..horizon`.
pub fn forecast_table(series: &PredictedSeries, horizon: Horizon) -> Result<ForecastTable> {
    let rows = series
        .tail(horizon.as_usize())
        .iter()
        .enumerate()
        .map(|(index, point)| {
            Ok(ForecastTableRow {
                index,
                date: point.date,
                price: round_price(point.yhat)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ForecastTable::new(horizon.days(), rows))
}

/// Rounds half to even at two decimals, always written with two decimals.
pub fn round_price(value: f64) -> Result<Decimal> {
    Decimal::from_f64(value)
        .map(|d| {
            let mut price = d.round_dp(2);
            price.rescale(2);
            price
        })
        .ok_or_else(|| ComputeError::Prediction(format!("cannot represent {} as a price", value)))
}

/// Encodes the table as CSV: a header row, then `DD-MM-YYYY,price` rows.
pub fn write_csv(table: &ForecastTable) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record([DATE_COLUMN_LABEL, PRICE_COLUMN_LABEL])?;
    for row in &table.rows {
        writer.write_record([row.formatted_date(), row.price.to_string()])?;
    }

    writer
        .into_inner()
        .map_err(|e| ComputeError::Csv(e.into_error().into()))
}

/// Parses a CSV produced by [`write_csv`].
pub fn read_csv(bytes: &[u8]) -> Result<ForecastTable> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader.headers()?;
    if headers.iter().collect::<Vec<_>>() != [DATE_COLUMN_LABEL, PRICE_COLUMN_LABEL] {
        return Err(ComputeError::Prediction(format!(
            "unexpected CSV header {:?}",
            headers
        )));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let (Some(date), Some(price)) = (record.get(0), record.get(1)) else {
            return Err(ComputeError::Prediction(format!("short CSV row {}", index)));
        };
        rows.push(ForecastTableRow {
            index,
            date: NaiveDate::parse_from_str(date, TABLE_DATE_FORMAT).map_err(|e| {
                ComputeError::Prediction(format!("invalid date '{}' in CSV: {}", date, e))
            })?,
            price: Decimal::from_str(price).map_err(|e| {
                ComputeError::Prediction(format!("invalid price '{}' in CSV: {}", price, e))
            })?,
        });
    }

    Ok(ForecastTable::new(rows.len() as u32, rows))
}
