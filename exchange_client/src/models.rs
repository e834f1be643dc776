//! Request and response models for the exchange REST API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::Error;

/// One candlestick exactly as the exchange serializes it: a positional
/// JSON array `[openTime, open, high, low, close, volume, closeTime, ...]`
/// mixing numbers and numeric strings. Binance appends further fields past
/// index 6 (quote volume, trade count, ...); they are carried untouched.
pub type RawKline = Vec<serde_json::Value>;

/// Largest `limit` the klines endpoint accepts per request.
pub const MAX_KLINES_LIMIT: u32 = 1_000;

/// Candlestick granularities supported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlineInterval {
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
}

impl KlineInterval {
    /// The wire form sent as the `interval` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::ThreeMinutes => "3m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::TwoHours => "2h",
            KlineInterval::FourHours => "4h",
            KlineInterval::SixHours => "6h",
            KlineInterval::EightHours => "8h",
            KlineInterval::TwelveHours => "12h",
            KlineInterval::OneDay => "1d",
            KlineInterval::ThreeDays => "3d",
            KlineInterval::OneWeek => "1w",
            KlineInterval::OneMonth => "1M",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KlineInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(KlineInterval::OneMinute),
            "3m" => Ok(KlineInterval::ThreeMinutes),
            "5m" => Ok(KlineInterval::FiveMinutes),
            "15m" => Ok(KlineInterval::FifteenMinutes),
            "30m" => Ok(KlineInterval::ThirtyMinutes),
            "1h" => Ok(KlineInterval::OneHour),
            "2h" => Ok(KlineInterval::TwoHours),
            "4h" => Ok(KlineInterval::FourHours),
            "6h" => Ok(KlineInterval::SixHours),
            "8h" => Ok(KlineInterval::EightHours),
            "12h" => Ok(KlineInterval::TwelveHours),
            "1d" => Ok(KlineInterval::OneDay),
            "3d" => Ok(KlineInterval::ThreeDays),
            "1w" => Ok(KlineInterval::OneWeek),
            "1M" => Ok(KlineInterval::OneMonth),
            other => Err(Error::InvalidRequest(format!(
                "unsupported kline interval: {other}"
            ))),
        }
    }
}

/// Parameters for a candlestick history request.
#[derive(Debug, Clone)]
pub struct KlinesRequest {
    /// Trading pair, uppercased (e.g. `BTCUSDT`).
    pub symbol: String,
    pub interval: KlineInterval,
    /// Number of candles to return, `1..=1000`.
    pub limit: u32,
    /// Inclusive lower bound on open time (sent as `startTime`, ms).
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on open time (sent as `endTime`, ms).
    pub end: Option<DateTime<Utc>>,
}

impl KlinesRequest {
    pub fn new(symbol: &str, interval: KlineInterval) -> Self {
        Self {
            symbol: symbol.to_ascii_uppercase(),
            interval,
            limit: 500,
            start: None,
            end: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_range(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Rejects requests the exchange would refuse, before any I/O.
    pub fn validate(&self) -> Result<(), Error> {
        if self.symbol.trim().is_empty() {
            return Err(Error::InvalidRequest("symbol must not be empty".into()));
        }
        if self.limit == 0 || self.limit > MAX_KLINES_LIMIT {
            return Err(Error::InvalidRequest(format!(
                "limit must be within 1..={MAX_KLINES_LIMIT}, got {}",
                self.limit
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start >= end {
                return Err(Error::InvalidRequest(
                    "start must be strictly before end".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Free and locked quantity of a single asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetBalance {
    pub free: f64,
    pub locked: f64,
}

/// Wire shape of `/api/v3/ticker/price`.
#[derive(Debug, Deserialize)]
pub(crate) struct TickerPrice {
    #[allow(dead_code)]
    pub symbol: String,
    pub price: String,
}

/// Wire shape of one entry in the `/api/v3/account` balances array.
#[derive(Debug, Deserialize)]
pub(crate) struct BalanceEntry {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

/// Wire shape of `/api/v3/account`, reduced to what this client reads.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountInfo {
    pub balances: Vec<BalanceEntry>,
}

/// Error body the exchange attaches to non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}
