use std::collections::HashSet;

use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

use super::outputs::{ForecastRow, SpikeRecord, SuggestionRow};

/// Spikes at or below this surge percentage do not raise an alert.
pub const SPIKE_SURGE_THRESHOLD: f64 = 100.0;
/// Only the first forecast rows are surfaced.
pub const FORECAST_ALERT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Danger,
    Warning,
    Info,
}

impl AlertKind {
    fn priority(self) -> u8 {
        match self {
            AlertKind::Danger => 1,
            AlertKind::Warning => 2,
            AlertKind::Info => 3,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            AlertKind::Danger => "Place Order",
            AlertKind::Warning => "View Details",
            AlertKind::Info => "See Forecast",
        }
    }

    /// `all` (or anything unknown) means no type filter.
    pub fn parse_filter(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "danger" => Some(AlertKind::Danger),
            "warning" => Some(AlertKind::Warning),
            "info" => Some(AlertKind::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct Alert {
    pub id: String,
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub product: String,
    pub location: String,
    pub message: String,
    pub action: String,
}

impl Alert {
    fn new(id: String, kind: AlertKind, product: &str, location: &str, message: String) -> Self {
        Self {
            id,
            kind,
            product: product.to_string(),
            location: location.to_string(),
            message,
            action: kind.action().to_string(),
        }
    }
}

/// Whole-string numeric parse with browser `Number()` rules: empty input reads
/// as zero, `Infinity` and `0x`/`0o`/`0b` literals are accepted, and anything
/// else outside plain decimal notation is rejected.
fn parse_number_literal(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        "" => return Some(0.0),
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        if digits.is_empty() {
            return None;
        }
        return digits.chars().try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        });
    }

    // Rust's float parser also takes "inf" and "NaN" spellings.
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    text.parse::<f64>().ok()
}

fn surge_value(record: &SpikeRecord, raw: Option<&str>) -> Option<f64> {
    match raw {
        Some(text) => parse_number_literal(text),
        None => record.surge_percent,
    }
}

/// Number rendering as the frontend shows it: 150.0 prints as "150".
fn format_number(value: f64) -> String {
    if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

/// Build the prioritized, de-duplicated alert feed.
///
/// `raw_surges` optionally carries the verbatim `surge_percent` column for
/// each spike row; when absent the parsed value on the record is used.
pub fn build_alerts(
    forecasts: &[ForecastRow],
    spikes: &[SpikeRecord],
    raw_surges: Option<&[String]>,
    suggestions: &[SuggestionRow],
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |alert: Alert, alerts: &mut Vec<Alert>| {
        if seen.insert(alert.message.clone()) {
            alerts.push(alert);
        }
    };

    for (i, row) in suggestions.iter().enumerate() {
        if row.order_recommendation == "ORDER" {
            let message = format!("{} low at {}. Reorder now!", row.product_name, row.location);
            push(
                Alert::new(
                    format!("suggestion-{}", i),
                    AlertKind::Danger,
                    &row.product_name,
                    &row.location,
                    message,
                ),
                &mut alerts,
            );
        }
    }

    for (i, record) in spikes.iter().enumerate() {
        let raw = raw_surges.and_then(|r| r.get(i)).map(String::as_str);
        let surge = match surge_value(record, raw) {
            Some(surge) if surge > SPIKE_SURGE_THRESHOLD => surge,
            _ => continue,
        };
        let message = format!(
            "{} spiked {}% at {}",
            record.product_name,
            format_number(surge),
            record.location
        );
        push(
            Alert::new(
                format!("spike-{}", i),
                AlertKind::Warning,
                &record.product_name,
                &record.location,
                message,
            ),
            &mut alerts,
        );
    }

    for (i, row) in forecasts.iter().take(FORECAST_ALERT_LIMIT).enumerate() {
        let message = format!(
            "Forecast: {} demand ≈ {}",
            row.product_name, row.forecasted_quantity
        );
        push(
            Alert::new(
                format!("forecast-{}", i),
                AlertKind::Info,
                &row.product_name,
                &row.location,
                message,
            ),
            &mut alerts,
        );
    }

    alerts.sort_by_key(|a| a.kind.priority());
    alerts
}

/// Client-side view filters over an alert feed.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub product: Option<String>,
    pub kind: Option<AlertKind>,
    pub dismissed: HashSet<String>,
}

impl AlertFilter {
    pub fn new(product: Option<&str>, kind: Option<&str>, dismissed: Option<&str>) -> Self {
        Self {
            product: product
                .map(str::to_string)
                .filter(|p| !p.is_empty()),
            kind: kind.and_then(AlertKind::parse_filter),
            dismissed: dismissed
                .map(|ids| {
                    ids.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn apply(&self, alerts: Vec<Alert>) -> Vec<Alert> {
        alerts
            .into_iter()
            .filter(|a| !self.dismissed.contains(&a.id))
            .filter(|a| self.product.as_ref().map(|p| &a.product == p).unwrap_or(true))
            .filter(|a| self.kind.map(|k| a.kind == k).unwrap_or(true))
            .collect()
    }
}
