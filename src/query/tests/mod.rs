pub mod missing;

use chrono::TimeDelta;

use crate::schema::{
    AggField, AggregationDecl, AggregationSchema, Method, MissingPolicy, Retention,
    SeriesDeclaration, TimeSeriesDecl,
};
use crate::storage::tests::{at, msft_store, stock_info, trade, trades_schema, MSFT, MSFT_INFO};
use crate::storage::{Datum, Error, Series, Store, StoreConfig};

/// Store whose only aggregation is `decl`, with an empty `/trades/MSFT`.
fn store_with(decl: AggregationDecl) -> Store {
    let store = Store::new(
        vec![
            SeriesDeclaration::TimeSeries(TimeSeriesDecl {
                pattern: "/trades/".to_string(),
                schema: trades_schema(),
                retention: Retention::KeepForever,
            }),
            SeriesDeclaration::Aggregation(decl),
        ],
        StoreConfig::default(),
    );
    store.create_series(MSFT).unwrap();
    store
}

fn decl_with(period: TimeDelta, fields: Vec<AggField>) -> AggregationDecl {
    AggregationDecl {
        schema: AggregationSchema::new(fields),
        ..stock_info(period)
    }
}

fn column_values(series: &Series, field: &str) -> Vec<Datum> {
    series.column(field).unwrap().datums().collect()
}

fn fixed(values: &[i64]) -> Vec<Datum> {
    values.iter().copied().map(Datum::Fixed).collect()
}

fn integers(values: &[i64]) -> Vec<Datum> {
    values.iter().copied().map(Datum::Integer).collect()
}
