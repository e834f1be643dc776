//! Typed candlestick record parsed from a raw exchange row.

use chrono::{DateTime, TimeZone, Utc};
use exchange_client::RawKline;
use serde_json::Value;

use crate::errors::ShapingError;

/// Leading fields every kline row must carry: open time through close
/// time. Binance appends more (quote volume, trade count, ...) which are
/// accepted and ignored.
pub const ESSENTIAL_FIELDS: usize = 7;

/// A single candlestick with named, typed fields.
///
/// Immutable once parsed; its identity is the open time.
#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    /// Start of the candle interval (UTC).
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// End of the candle interval (UTC).
    pub close_time: DateTime<Utc>,
}

impl Kline {
    /// Maps one positional raw row to named fields.
    ///
    /// `index` is the row's position in the response, used to point at
    /// the offending record on failure.
    pub fn from_raw(index: usize, raw: &RawKline) -> Result<Self, ShapingError> {
        if raw.len() < ESSENTIAL_FIELDS {
            return Err(ShapingError::MalformedRecord {
                index,
                reason: format!(
                    "expected at least {ESSENTIAL_FIELDS} fields, got {}",
                    raw.len()
                ),
            });
        }

        Ok(Self {
            open_time: time_field(index, &raw[0], "open time")?,
            open: numeric_field(index, &raw[1], "open")?,
            high: numeric_field(index, &raw[2], "high")?,
            low: numeric_field(index, &raw[3], "low")?,
            close: numeric_field(index, &raw[4], "close")?,
            volume: numeric_field(index, &raw[5], "volume")?,
            close_time: time_field(index, &raw[6], "close time")?,
        })
    }
}

/// The exchange mixes JSON numbers and numeric strings across endpoints;
/// both are accepted.
fn numeric_field(index: usize, value: &Value, field: &str) -> Result<f64, ShapingError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ShapingError::MalformedRecord {
        index,
        reason: format!("{field} is not numeric: {value}"),
    })
}

fn time_field(index: usize, value: &Value, field: &str) -> Result<DateTime<Utc>, ShapingError> {
    let millis = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    };
    millis
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .ok_or_else(|| ShapingError::MalformedRecord {
            index,
            reason: format!("{field} is not a millisecond timestamp: {value}"),
        })
}
