//! Raw kline rows to a typed, ordered DataFrame.

use exchange_client::RawKline;
use polars::prelude::*;

use crate::errors::ShapingError;
use crate::kline::Kline;

pub const OPEN_TIME: &str = "open_time";
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";
pub const CLOSE_TIME: &str = "close_time";

/// The candle table's column names, in order.
pub const COLUMNS: [&str; 7] = [OPEN_TIME, OPEN, HIGH, LOW, CLOSE, VOLUME, CLOSE_TIME];

/// Builds the candle table from raw exchange rows.
///
/// N input rows yield exactly N output rows in input order; no
/// deduplication or gap-filling. Price and volume columns are Float64,
/// the two time columns Datetime[ms]. Any row that does not match the
/// exchange layout fails the whole conversion with the row's index.
pub fn klines_to_table(raw: &[RawKline]) -> Result<DataFrame, ShapingError> {
    let klines = raw
        .iter()
        .enumerate()
        .map(|(index, row)| Kline::from_raw(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    let open_ms: Vec<i64> = klines.iter().map(|k| k.open_time.timestamp_millis()).collect();
    let close_ms: Vec<i64> = klines.iter().map(|k| k.close_time.timestamp_millis()).collect();
    let opens: Vec<f64> = klines.iter().map(|k| k.open).collect();
    let highs: Vec<f64> = klines.iter().map(|k| k.high).collect();
    let lows: Vec<f64> = klines.iter().map(|k| k.low).collect();
    let closes: Vec<f64> = klines.iter().map(|k| k.close).collect();
    let volumes: Vec<f64> = klines.iter().map(|k| k.volume).collect();

    let millis = DataType::Datetime(TimeUnit::Milliseconds, None);
    let columns = vec![
        Column::new(OPEN_TIME.into(), open_ms).cast(&millis)?,
        Column::new(OPEN.into(), opens),
        Column::new(HIGH.into(), highs),
        Column::new(LOW.into(), lows),
        Column::new(CLOSE.into(), closes),
        Column::new(VOLUME.into(), volumes),
        Column::new(CLOSE_TIME.into(), close_ms).cast(&millis)?,
    ];

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candle(open_ms: i64, o: &str, h: &str, l: &str, c: &str, v: &str) -> RawKline {
        vec![
            json!(open_ms),
            json!(o),
            json!(h),
            json!(l),
            json!(c),
            json!(v),
            json!(open_ms + 59_999),
        ]
    }

    #[test]
    fn one_candle_example() {
        let raw = vec![candle(0, "100", "110", "90", "105", "10")];
        let df = klines_to_table(&raw).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.get_column_names_str(), COLUMNS.to_vec());
        assert_eq!(df.column(OPEN).unwrap().f64().unwrap().get(0), Some(100.0));
        assert_eq!(df.column(HIGH).unwrap().f64().unwrap().get(0), Some(110.0));
        assert_eq!(df.column(LOW).unwrap().f64().unwrap().get(0), Some(90.0));
        assert_eq!(df.column(CLOSE).unwrap().f64().unwrap().get(0), Some(105.0));
        assert_eq!(df.column(VOLUME).unwrap().f64().unwrap().get(0), Some(10.0));
    }

    #[test]
    fn time_columns_are_millisecond_datetimes() {
        let raw = vec![candle(60_000, "1", "2", "0.5", "1.5", "3")];
        let df = klines_to_table(&raw).unwrap();

        let millis = DataType::Datetime(TimeUnit::Milliseconds, None);
        assert_eq!(df.column(OPEN_TIME).unwrap().dtype(), &millis);
        assert_eq!(df.column(CLOSE_TIME).unwrap().dtype(), &millis);
        for name in [OPEN, HIGH, LOW, CLOSE, VOLUME] {
            assert_eq!(df.column(name).unwrap().dtype(), &DataType::Float64);
        }
    }

    #[test]
    fn n_rows_in_input_order() {
        let raw: Vec<RawKline> = (0..5)
            .map(|i| {
                let px = format!("{}", 100 + i);
                candle(i * 60_000, &px, &px, &px, &px, "1")
            })
            .collect();
        let df = klines_to_table(&raw).unwrap();

        assert_eq!(df.height(), 5);
        let closes: Vec<f64> = df
            .column(CLOSE)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(closes, vec![100.0, 101.0, 102.0, 103.0, 104.0]);
    }

    #[test]
    fn conversion_is_deterministic() {
        let raw = vec![
            candle(0, "100", "110", "90", "105", "10"),
            candle(60_000, "105", "112", "101", "108", "7"),
        ];
        let a = klines_to_table(&raw).unwrap();
        let b = klines_to_table(&raw).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn empty_input_yields_an_empty_table_with_the_schema() {
        let df = klines_to_table(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.get_column_names_str(), COLUMNS.to_vec());
    }

    #[test]
    fn malformed_row_fails_with_its_index() {
        let raw = vec![
            candle(0, "100", "110", "90", "105", "10"),
            vec![json!(60_000), json!("bad")],
        ];
        match klines_to_table(&raw).unwrap_err() {
            ShapingError::MalformedRecord { index, .. } => assert_eq!(index, 1),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }
}
