//! Synchronous REST client for the Binance Spot testnet.
//!
//! The crate exposes three read-only operations behind the
//! [`MarketDataSource`] trait: candlestick history, latest ticker price,
//! and account balances. Every call is an independent blocking request;
//! there is no caching, streaming, or rate-limit scheduling.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod retry;
pub mod source;

pub use client::BinanceClient;
pub use config::{ClientConfig, ConfigError, Credentials};
pub use errors::Error;
pub use models::{AssetBalance, KlineInterval, KlinesRequest, RawKline};
pub use retry::RetryPolicy;
pub use source::MarketDataSource;
