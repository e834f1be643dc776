//! Technical indicators over the close-price column.
//!
//! The math lives in pure `&[f64] -> Vec<Option<f64>>` functions; rows
//! before a window is filled hold `None`, which polars stores as null.

use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ShapingError;
use crate::table::CLOSE;

/// Indicator kinds this crate computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Rsi => "rsi",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = ShapingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sma" => Ok(IndicatorKind::Sma),
            "ema" => Ok(IndicatorKind::Ema),
            "rsi" => Ok(IndicatorKind::Rsi),
            other => Err(ShapingError::UnsupportedIndicator {
                kind: other.to_string(),
            }),
        }
    }
}

/// One requested indicator column: a kind plus its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub window: usize,
}

impl IndicatorSpec {
    pub fn new(kind: IndicatorKind, window: usize) -> Self {
        Self { kind, window }
    }

    /// Name of the appended column, e.g. `sma_20`.
    pub fn column_name(&self) -> String {
        format!("{}_{}", self.kind, self.window)
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.window)
    }
}

/// Parses the CLI form `<kind>:<window>`, e.g. `sma:20`.
impl FromStr for IndicatorSpec {
    type Err = ShapingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, window) = s.split_once(':').ok_or_else(|| ShapingError::InvalidSpec {
            spec: s.to_string(),
        })?;
        let kind: IndicatorKind = kind.parse()?;
        let window: usize = window.parse().map_err(|_| ShapingError::InvalidSpec {
            spec: s.to_string(),
        })?;
        Ok(Self { kind, window })
    }
}

/// Returns a new frame with one Float64 column appended per spec.
///
/// The input frame is never mutated; its existing columns are carried
/// over unchanged (polars columns are cheaply shared, so this is not a
/// deep copy). Requires a Float64 `close` column.
pub fn add_indicators(
    table: &DataFrame,
    specs: &[IndicatorSpec],
) -> Result<DataFrame, ShapingError> {
    let closes: Vec<f64> = table
        .column(CLOSE)
        .map_err(|_| ShapingError::MissingColumn(CLOSE.to_string()))?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    let mut out = table.clone();
    for spec in specs {
        if spec.window == 0 {
            return Err(ShapingError::InvalidWindow { window: 0 });
        }
        let values = match spec.kind {
            IndicatorKind::Sma => sma(&closes, spec.window),
            IndicatorKind::Ema => ema(&closes, spec.window),
            IndicatorKind::Rsi => rsi(&closes, spec.window),
        };
        out.with_column(Column::new(spec.column_name().into(), values))?;
    }
    Ok(out)
}

/// Simple moving average: `None` for the first `window - 1` rows, then
/// the mean of the trailing `window` closes (current row inclusive).
pub fn sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || closes.is_empty() {
        return vec![None; closes.len()];
    }

    let mut out = vec![None; closes.len()];
    let mut sum = 0.0;
    for (i, close) in closes.iter().enumerate() {
        sum += close;
        if i >= window {
            sum -= closes[i - window];
        }
        if i + 1 >= window {
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

/// Exponential moving average, seeded with the SMA of the first `window`
/// closes at row `window - 1`, then the usual `2 / (window + 1)` blend.
pub fn ema(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return out;
    }

    let seed: f64 = closes[..window].iter().sum::<f64>() / window as f64;
    out[window - 1] = Some(seed);

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut prev = seed;
    for i in window..closes.len() {
        prev = (closes[i] - prev) * alpha + prev;
        out[i] = Some(prev);
    }
    out
}

/// Relative strength index with Wilder smoothing: null through row
/// `window - 1`, the first value at row `window` from simple averages of
/// the initial gains and losses, then smoothed averages. A zero average
/// loss yields 100.
pub fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if window == 0 || closes.len() < window + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut avg_gain = gains[..window].iter().sum::<f64>() / window as f64;
    let mut avg_loss = losses[..window].iter().sum::<f64>() / window as f64;
    out[window] = Some(rsi_value(avg_gain, avg_loss));

    for i in window..gains.len() {
        avg_gain = (avg_gain * (window - 1) as f64 + gains[i]) / window as f64;
        avg_loss = (avg_loss * (window - 1) as f64 + losses[i]) / window as f64;
        out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
