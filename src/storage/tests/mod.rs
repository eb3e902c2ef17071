
use super::*;
use crate::schema::{
    AggField, AggregationDecl, AggregationSchema, FieldDeclaration, FieldType, Method,
    MissingPolicy, Retention, Schema, SeriesDeclaration, TimeSeriesDecl,
};
use crate::Timestamp;
use chrono::{TimeDelta, TimeZone, Utc};

pub const MSFT: &str = "/trades/MSFT";
pub const MSFT_INFO: &str = "stockInfo:/trades/MSFT";

/// Time of day on a fixed test date.
pub fn at(hour: u32, min: u32, sec: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 2, hour, min, sec).single().unwrap()
}

pub fn trades_schema() -> Schema {
    Schema::new(vec![
        FieldDeclaration::new("price", FieldType::fixed(10, 4)),
        FieldDeclaration::new("vol", FieldType::Integer),
    ])
}

pub fn stock_info_schema() -> AggregationSchema {
    AggregationSchema::new(vec![
        AggField::new("open", Method::First, "price", MissingPolicy::Lag { field: "close".into(), periods: 1 }),
        AggField::new("low", Method::Min, "price", MissingPolicy::UseField("open".into())),
        AggField::new("high", Method::Max, "price", MissingPolicy::UseField("open".into())),
        AggField::new("close", Method::Last, "price", MissingPolicy::UseField("open".into())),
        AggField::new("cVol", Method::Sum, "vol", MissingPolicy::Lag { field: "cVol".into(), periods: 1 }),
    ])
}

pub fn stock_info(period: TimeDelta) -> AggregationDecl {
    AggregationDecl {
        name: "stockInfo".to_string(),
        target: "/trades/".to_string(),
        schema: stock_info_schema(),
        period,
        frequency: period,
        retention: Retention::Keep(100),
    }
}

pub fn declarations() -> Vec<SeriesDeclaration> {
    vec![
        SeriesDeclaration::TimeSeries(TimeSeriesDecl {
            pattern: "/trades/".to_string(),
            schema: trades_schema(),
            retention: Retention::KeepForever,
        }),
        SeriesDeclaration::TimeSeries(TimeSeriesDecl {
            pattern: "/news/".to_string(),
            schema: Schema::new(vec![FieldDeclaration::new("headline", FieldType::String)]),
            retention: Retention::Keep(10),
        }),
        SeriesDeclaration::Aggregation(stock_info(TimeDelta::minutes(15))),
    ]
}

pub fn test_store() -> Store {
    Store::new(declarations(), StoreConfig::default())
}

pub fn trade(price: i64, vol: i64) -> Vec<Datum> {
    vec![Datum::Fixed(price), Datum::Integer(vol)]
}

/// `/trades/MSFT` holding the four ticks used throughout the tests.
pub fn msft_store() -> Store {
    let store = test_store();
    store.create_series(MSFT).unwrap();
    for (time, price, vol) in msft_ticks() {
        store.append_datum(MSFT, time, trade(price, vol)).unwrap();
    }
    store
}

pub fn msft_ticks() -> Vec<(Timestamp, i64, i64)> {
    vec![
        (at(0, 0, 0), 4_500_000, 55),
        (at(0, 1, 0), 4_200_000, 54),
        (at(0, 1, 30), 4_900_000, 20),
        (at(0, 4, 0), 4_890_000, 10),
    ]
}

/// Asserts that `times` and every column have the same length.
pub fn assert_aligned(series: &Series) {
    for column in series.columns() {
        assert_eq!(column.len(), series.times().len());
    }
}
