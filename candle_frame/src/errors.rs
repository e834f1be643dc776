use thiserror::Error;

/// The unified error type for the `candle_frame` crate.
#[derive(Debug, Error)]
pub enum ShapingError {
    /// A raw kline row that does not match the exchange's fixed layout.
    #[error("Malformed kline record at row {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// An indicator kind this crate does not compute.
    #[error("Unsupported indicator kind: {kind}")]
    UnsupportedIndicator { kind: String },

    /// An indicator spec string that does not parse as `<kind>:<window>`.
    #[error("Invalid indicator spec '{spec}', expected '<kind>:<window>' (e.g. 'sma:20')")]
    InvalidSpec { spec: String },

    /// Indicator windows must be at least 1.
    #[error("Invalid indicator window: {window}")]
    InvalidWindow { window: usize },

    /// The table lacks a column the transformation needs.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// An error from the Polars library.
    #[error("Polars operation failed")]
    Polars(#[from] polars::prelude::PolarsError),
}
