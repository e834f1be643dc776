//! Pure shaping of raw exchange candlesticks.
//!
//! Two stateless transformations, no I/O: [`klines_to_table`] turns the
//! exchange's positional kline rows into a typed polars `DataFrame`, and
//! [`add_indicators`] appends derived indicator columns (SMA, EMA, RSI)
//! computed from the close prices.

pub mod errors;
pub mod indicators;
pub mod kline;
pub mod table;

pub use errors::ShapingError;
pub use indicators::{IndicatorKind, IndicatorSpec, add_indicators};
pub use kline::Kline;
pub use table::klines_to_table;
