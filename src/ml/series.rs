use chrono::{DateTime, NaiveDate, NaiveDateTime};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use super::outputs::SpikeRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct SpikeSeries {
    /// Distinct product names in first-seen order.
    pub products: Vec<String>,
    pub selected: String,
    pub points: Vec<SpikeRecord>,
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Chart feed: records ordered by time and narrowed to one product.
/// Unparsable timestamps sort after parsable ones, by text.
pub fn build_series(mut records: Vec<SpikeRecord>, requested: Option<&str>) -> SpikeSeries {
    records.sort_by_cached_key(|r| {
        let parsed = parse_timestamp(&r.timestamp);
        (parsed.is_none(), parsed, r.timestamp.clone())
    });

    let mut products: Vec<String> = Vec::new();
    for record in &records {
        if !products.contains(&record.product_name) {
            products.push(record.product_name.clone());
        }
    }

    let selected = match requested {
        Some(name) if products.iter().any(|p| p == name) => name.to_string(),
        _ => products.first().cloned().unwrap_or_default(),
    };

    let points = records
        .into_iter()
        .filter(|r| r.product_name == selected)
        .collect();

    SpikeSeries {
        products,
        selected,
        points,
    }
}
