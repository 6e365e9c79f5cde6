use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Header of the date column, as shown in the page and written to the CSV.
pub const DATE_COLUMN_LABEL: &str = "Data (Dia/Mês/Ano)";
/// Header of the price column, as shown in the page and written to the CSV.
pub const PRICE_COLUMN_LABEL: &str = "Preço US$";
/// `strftime` pattern of the table dates (day-month-year).
pub const TABLE_DATE_FORMAT: &str = "%d-%m-%Y";

/// One row of the forecast table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ForecastTableRow {
    /// Contiguous 0-based row index
    pub index: usize,
    /// Forecast date, rendered as DD-MM-YYYY
    #[serde(with = "table_date")]
    #[schema(value_type = String, example = "10-09-2024")]
    pub date: NaiveDate,
    /// Point estimate rounded to two decimals
    #[schema(value_type = String, example = "81.48")]
    pub price: Decimal,
}

impl ForecastTableRow {
    /// Date in the table's day-month-year format.
    pub fn formatted_date(&self) -> String {
        self.date.format(TABLE_DATE_FORMAT).to_string()
    }
}

/// The last `horizon` rows of a predicted series, ready for display/export.
///
/// Confidence bounds are deliberately absent: only the chart carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ForecastTable {
    /// Number of business days requested
    pub horizon: u32,
    /// Rows in ascending date order
    pub rows: Vec<ForecastTableRow>,
}

impl ForecastTable {
    pub fn new(horizon: u32, rows: Vec<ForecastTableRow>) -> Self {
        Self { horizon, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Download file name, e.g. `previsao_petroleo_5dias.csv`.
    pub fn file_name(&self) -> String {
        format!("previsao_petroleo_{}dias.csv", self.horizon)
    }

    /// Sentence displayed above the table.
    pub fn caption(&self) -> String {
        format!(
            "Tabela contendo a previsão do preço do petróleo para os próximos {} dias:",
            self.horizon
        )
    }
}

mod table_date {
    use super::TABLE_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(TABLE_DATE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, TABLE_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
