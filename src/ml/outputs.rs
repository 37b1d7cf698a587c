use std::collections::HashMap;
use std::path::PathBuf;

use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const SPIKE_FILE: &str = "detected_spikes.csv";
pub const SUGGESTION_FILE: &str = "inventory_suggestions.csv";
pub const FORECAST_FILE: &str = "forecasted_sales.csv";

/// One CSV row keyed by header name.
pub type RawRow = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("{0} not found")]
    Missing(String),

    #[error("Failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// A detected demand spike as written by the forecast script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct SpikeRecord {
    pub timestamp: String,
    pub product_id: String,
    pub product_name: String,
    pub location: String,
    pub quantity: Option<i64>,
    pub z_score: Option<f64>,
    pub surge_percent: Option<f64>,
}

impl SpikeRecord {
    pub fn from_row(row: &RawRow) -> Self {
        let text = |key: &str| field(row, key).trim().to_string();
        Self {
            timestamp: text("timestamp"),
            product_id: text("product_id"),
            product_name: text("product_name"),
            location: text("location"),
            quantity: parse_int_prefix(field(row, "quantity")),
            z_score: parse_float_prefix(field(row, "z_score")),
            surge_percent: parse_float_prefix(field(row, "surge_percent")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub timestamp: String,
    pub product_name: String,
    pub location: String,
    /// Kept verbatim; alerts print it as written.
    pub forecasted_quantity: String,
}

impl ForecastRow {
    pub fn from_row(row: &RawRow) -> Self {
        Self {
            timestamp: field(row, "timestamp").to_string(),
            product_name: field(row, "product_name").to_string(),
            location: field(row, "location").to_string(),
            forecasted_quantity: field(row, "forecasted_quantity").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRow {
    pub product_name: String,
    pub location: String,
    pub order_recommendation: String,
}

impl SuggestionRow {
    pub fn from_row(row: &RawRow) -> Self {
        Self {
            product_name: field(row, "product_name").to_string(),
            location: field(row, "location").to_string(),
            order_recommendation: field(row, "order_recommendation").to_string(),
        }
    }
}

fn field<'a>(row: &'a RawRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

/// Parse header-keyed rows. Blank lines are skipped and short rows are
/// tolerated.
pub fn parse_rows(data: &[u8]) -> Result<Vec<RawRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.deserialize::<RawRow>() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Leading-integer parse: `"12.7"` gives 12, `"7 units"` gives 7, and input
/// without leading digits gives `None`.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Longest-numeric-prefix float parse. NaN and empty input give `None`.
pub fn parse_float_prefix(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let bytes = value.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    value[..end].parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Reader over the directory the forecast script writes to.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    dir: PathBuf,
}

impl OutputFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub async fn raw_rows(&self, file: &str) -> Result<Vec<RawRow>, OutputError> {
        let path = self.path(file);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Output file not found at {}", path.display());
                return Err(OutputError::Missing(file.to_string()));
            }
            Err(source) => {
                return Err(OutputError::Io {
                    file: file.to_string(),
                    source,
                })
            }
        };

        let rows = parse_rows(&data).map_err(|source| OutputError::Csv {
            file: file.to_string(),
            source,
        })?;
        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    pub async fn spikes(&self) -> Result<Vec<SpikeRecord>, OutputError> {
        let rows = self.raw_rows(SPIKE_FILE).await?;
        Ok(rows.iter().map(SpikeRecord::from_row).collect())
    }

    pub async fn forecasts(&self) -> Result<Vec<ForecastRow>, OutputError> {
        let rows = self.raw_rows(FORECAST_FILE).await?;
        Ok(rows.iter().map(ForecastRow::from_row).collect())
    }

    pub async fn suggestions(&self) -> Result<Vec<SuggestionRow>, OutputError> {
        let rows = self.raw_rows(SUGGESTION_FILE).await?;
        Ok(rows.iter().map(SuggestionRow::from_row).collect())
    }
}
