use chrono::TimeDelta;

use super::*;
use crate::storage::tests::{declarations, stock_info, trades_schema};
use crate::storage::Error;

fn declared() -> Declarations {
    Declarations::new(declarations())
}

#[test]
fn test_parse_plain_and_instance_names() {
    assert_eq!(SeriesName::parse("/trades/MSFT").unwrap(), SeriesName::Plain("/trades/MSFT"));
    assert_eq!(
        SeriesName::parse("stockInfo:/trades/MSFT").unwrap(),
        SeriesName::Instance {
            aggregation: "stockInfo",
            target: "/trades/MSFT"
        }
    );
    assert_eq!(
        SeriesName::parse("stockInfo:/trades/MSFT").unwrap().to_string(),
        "stockInfo:/trades/MSFT"
    );
    assert!(matches!(SeriesName::parse("stockInfo:"), Err(Error::InvalidName(_))));
}

#[test]
fn test_pattern_lookups() {
    let decls = declared();

    assert_eq!(decls.find_series_decl("/trades/MSFT").unwrap().schema, trades_schema());
    assert!(decls.find_series_decl("/quotes/MSFT").is_none());
    assert_eq!(decls.find_aggregation("stockInfo").unwrap().target, "/trades/");
    assert!(decls.find_aggregation("bars").is_none());
    assert_eq!(
        decls.applicable_aggregations("/trades/AAPL"),
        vec!["stockInfo:/trades/AAPL".to_string()]
    );
}

#[test]
fn test_first_matching_declaration_wins() {
    let decls = Declarations::new(vec![
        SeriesDeclaration::TimeSeries(TimeSeriesDecl {
            pattern: "/trades/MSFT".into(),
            schema: Schema::new(vec![FieldDeclaration::new("note", FieldType::String)]),
            retention: Retention::KeepForever,
        }),
        SeriesDeclaration::TimeSeries(TimeSeriesDecl {
            pattern: "/trades/".into(),
            schema: trades_schema(),
            retention: Retention::KeepForever,
        }),
    ]);

    assert_eq!(decls.find_series_decl("/trades/MSFT").unwrap().schema.len(), 1);
    assert_eq!(decls.find_series_decl("/trades/AAPL").unwrap().schema, trades_schema());
}

#[test]
fn test_derive_stock_info_schema() {
    let schema = derive_schema(&stock_info(TimeDelta::minutes(15)), &trades_schema()).unwrap();
    let types: Vec<_> = schema.fields().iter().map(|f| f.field_type).collect();
    assert_eq!(
        types,
        vec![
            FieldType::fixed(10, 4),
            FieldType::fixed(10, 4),
            FieldType::fixed(10, 4),
            FieldType::fixed(10, 4),
            FieldType::Integer,
        ]
    );
}

#[test]
fn test_derive_field_types() {
    assert_eq!(derive_field_type(Method::Sum, FieldType::fixed(12, 2)).unwrap(), FieldType::fixed(12, 2));
    assert_eq!(derive_field_type(Method::Min, FieldType::String).unwrap(), FieldType::String);
    assert!(matches!(
        derive_field_type(Method::Sum, FieldType::String),
        Err(Error::DerivationError(_))
    ));
}

fn with_fields(fields: Vec<AggField>) -> AggregationDecl {
    AggregationDecl {
        schema: AggregationSchema::new(fields),
        ..stock_info(TimeDelta::minutes(1))
    }
}

#[test]
fn test_sum_over_string_fails() {
    let target = Schema::new(vec![FieldDeclaration::new("headline", FieldType::String)]);
    let decl = with_fields(vec![AggField::new(
        "all",
        Method::Sum,
        "headline",
        MissingPolicy::Lag { field: "all".into(), periods: 1 },
    )]);
    assert!(matches!(derive_schema(&decl, &target), Err(Error::DerivationError(_))));
}

#[test]
fn test_unresolved_reference_fails() {
    let decl = with_fields(vec![AggField::new(
        "close",
        Method::Last,
        "price",
        MissingPolicy::UseField("open".into()),
    )]);
    assert!(matches!(derive_schema(&decl, &trades_schema()), Err(Error::DerivationError(_))));
}

#[test]
fn test_unknown_source_fails() {
    let decl = with_fields(vec![AggField::new(
        "close",
        Method::Last,
        "bid",
        MissingPolicy::Lag { field: "close".into(), periods: 1 },
    )]);
    assert!(matches!(derive_schema(&decl, &trades_schema()), Err(Error::DerivationError(_))));
}

#[test]
fn test_reference_of_other_type_fails() {
    let decl = with_fields(vec![
        AggField::new("close", Method::Last, "price", MissingPolicy::Lag { field: "close".into(), periods: 1 }),
        AggField::new("vol", Method::Sum, "vol", MissingPolicy::UseField("close".into())),
    ]);
    assert!(matches!(derive_schema(&decl, &trades_schema()), Err(Error::DerivationError(_))));
}

#[test]
fn test_same_period_cycle_fails() {
    let decl = with_fields(vec![
        AggField::new("low", Method::Min, "price", MissingPolicy::UseField("high".into())),
        AggField::new("high", Method::Max, "price", MissingPolicy::Lag { field: "low".into(), periods: 0 }),
    ]);
    assert!(matches!(derive_schema(&decl, &trades_schema()), Err(Error::DerivationError(_))));
    assert!(matches!(resolution_order(&decl.schema), Err(Error::DerivationError(_))));
}

#[test]
fn test_lag_does_not_constrain_order() {
    // open lags close, close falls back to open in the same period.
    let order = resolution_order(&stock_info_schema_only()).unwrap();
    let position = |i: usize| order.iter().position(|&o| o == i).unwrap();
    assert!(position(0) < position(1));
    assert!(position(0) < position(2));
    assert!(position(0) < position(3));
}

fn stock_info_schema_only() -> AggregationSchema {
    stock_info(TimeDelta::minutes(1)).schema
}

#[test]
fn test_non_positive_period_fails() {
    let decl = stock_info(TimeDelta::zero());
    assert!(matches!(derive_schema(&decl, &trades_schema()), Err(Error::DerivationError(_))));
}

#[test]
fn test_declarations_deserialize() {
    let json = r#"[
        {"TimeSeries": {"pattern": "/trades/", "schema": [
            {"name": "price", "field_type": {"Fixed": {"precision": 10, "decimals": 4}}},
            {"name": "vol", "field_type": "Integer"}
        ]}},
        {"Aggregation": {"name": "stockInfo", "target": "/trades/", "schema": [
            {"name": "close", "method": "Last", "source": "price",
             "missing": {"Lag": {"field": "close", "periods": 1}}}
        ], "period": 900000000000, "frequency": 60000000000, "retention": {"Keep": 5}}}
    ]"#;
    let decls: Declarations = serde_json::from_str(json).unwrap();

    let ts = decls.find_series_decl("/trades/X").unwrap();
    assert_eq!(ts.schema, trades_schema());
    assert_eq!(ts.retention, Retention::KeepForever);
    let agg = decls.find_aggregation("stockInfo").unwrap();
    assert_eq!(agg.period, TimeDelta::minutes(15));
    assert_eq!(agg.frequency, TimeDelta::minutes(1));
    assert_eq!(agg.retention, Retention::Keep(5));
}
