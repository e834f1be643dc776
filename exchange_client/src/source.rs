//! Capability trait for market data sources.
//!
//! [`MarketDataSource`] is the seam between callers and the network: the
//! real [`BinanceClient`](crate::BinanceClient) implements it, and tests
//! substitute a hand-rolled double with no inheritance hierarchy.

use indexmap::IndexMap;

use crate::errors::Error;
use crate::models::{AssetBalance, KlinesRequest, RawKline};

/// Read-only access to exchange market data and account state.
pub trait MarketDataSource {
    /// Fetches candlestick history for the given request parameters.
    ///
    /// Rows come back in the exchange's chronological response order.
    fn fetch_klines(&self, request: &KlinesRequest) -> Result<Vec<RawKline>, Error>;

    /// Fetches the latest traded price for a symbol.
    fn fetch_price(&self, symbol: &str) -> Result<f64, Error>;

    /// Fetches account balances, restricted to `assets` when non-empty.
    /// An empty filter returns every balance the exchange reports.
    fn fetch_balances(&self, assets: &[String]) -> Result<IndexMap<String, AssetBalance>, Error>;
}
