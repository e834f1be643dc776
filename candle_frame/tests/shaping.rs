//! End-to-end shaping properties: raw rows in, annotated table out.

use candle_frame::{IndicatorKind, IndicatorSpec, add_indicators, klines_to_table};
use exchange_client::RawKline;
use serde_json::json;

fn raw_series(closes: &[f64]) -> Vec<RawKline> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let open_ms = i as i64 * 60_000;
            vec![
                json!(open_ms),
                json!(close.to_string()),
                json!((close + 1.0).to_string()),
                json!((close - 1.0).to_string()),
                json!(close.to_string()),
                json!("10"),
                json!(open_ms + 59_999),
            ]
        })
        .collect()
}

#[test]
fn indicators_append_without_touching_existing_columns() {
    let raw = raw_series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
    let table = klines_to_table(&raw).unwrap();
    let before = table.clone();

    let specs = [
        IndicatorSpec::new(IndicatorKind::Sma, 3),
        IndicatorSpec::new(IndicatorKind::Ema, 3),
        IndicatorSpec::new(IndicatorKind::Rsi, 3),
    ];
    let annotated = add_indicators(&table, &specs).unwrap();

    // The input frame is untouched.
    assert!(table.equals(&before));

    // Original columns survive in order, new ones follow.
    assert_eq!(
        annotated.get_column_names_str(),
        vec![
            "open_time", "open", "high", "low", "close", "volume", "close_time",
            "sma_3", "ema_3", "rsi_3",
        ]
    );
    assert_eq!(annotated.height(), table.height());
    assert!(
        annotated
            .select(["open_time", "open", "high", "low", "close", "volume", "close_time"])
            .unwrap()
            .equals(&table)
    );
}

#[test]
fn sma_column_has_window_minus_one_leading_nulls() {
    let raw = raw_series(&[10.0, 20.0, 30.0, 40.0]);
    let table = klines_to_table(&raw).unwrap();
    let annotated =
        add_indicators(&table, &[IndicatorSpec::new(IndicatorKind::Sma, 3)]).unwrap();

    let sma = annotated.column("sma_3").unwrap().f64().unwrap();
    assert_eq!(sma.get(0), None);
    assert_eq!(sma.get(1), None);
    assert_eq!(sma.get(2), Some(20.0));
    assert_eq!(sma.get(3), Some(30.0));
}

#[test]
fn unsupported_kind_fails_before_any_column_is_named() {
    let err = "FOO:7".parse::<IndicatorSpec>().unwrap_err();
    assert!(matches!(
        err,
        candle_frame::ShapingError::UnsupportedIndicator { kind } if kind == "foo"
    ));
}

#[test]
fn zero_window_is_rejected() {
    let raw = raw_series(&[1.0, 2.0]);
    let table = klines_to_table(&raw).unwrap();
    let err =
        add_indicators(&table, &[IndicatorSpec::new(IndicatorKind::Sma, 0)]).unwrap_err();
    assert!(matches!(
        err,
        candle_frame::ShapingError::InvalidWindow { window: 0 }
    ));
}

#[test]
fn tables_without_a_close_column_are_rejected() {
    use polars::prelude::*;
    let table = df!["price" => [1.0_f64, 2.0]].unwrap();
    let err = add_indicators(&table, &[IndicatorSpec::new(IndicatorKind::Sma, 2)]).unwrap_err();
    assert!(matches!(err, candle_frame::ShapingError::MissingColumn(_)));
}

#[test]
fn shaping_is_deterministic_end_to_end() {
    let raw = raw_series(&[5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    let specs = [
        IndicatorSpec::new(IndicatorKind::Sma, 2),
        IndicatorSpec::new(IndicatorKind::Rsi, 2),
    ];
    let a = add_indicators(&klines_to_table(&raw).unwrap(), &specs).unwrap();
    let b = add_indicators(&klines_to_table(&raw).unwrap(), &specs).unwrap();
    assert!(a.equals_missing(&b));
}
