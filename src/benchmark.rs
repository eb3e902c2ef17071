use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use hquant::{
    AggField, AggregationDecl, AggregationSchema, Datum, FieldDeclaration, FieldType, Method,
    MissingPolicy, Retention, Schema, SeriesDeclaration, Store, StoreConfig, TimeSeriesDecl,
};
use rand::Rng;

const NUM_ROWS: usize = 200_000;
const SERIES: &str = "/trades/BENCH";
const TICK_MS: i64 = 250;

pub fn run_benchmarks() {
    println!("Running benchmarks with {} rows...", NUM_ROWS);

    let store = setup_store();
    let (timestamps, prices, volumes) = generate_test_data();

    let ingest_time = benchmark_ingest(&store, &timestamps, &prices, &volumes);
    let query_time = benchmark_query(&store, &timestamps);
    let (aggregate_time, bars) = benchmark_aggregate(&store, &timestamps);
    let snapshot_time = benchmark_snapshot_reads(&store, &timestamps);

    println!("\nBenchmark Results:");
    println!("-----------------");
    println!("Ingest: {:.2}ms ({:.0} rows/s)", ingest_time, NUM_ROWS as f64 / (ingest_time / 1000.0));
    println!("Range query (middle half): {:.2}ms", query_time);
    println!("Aggregate into {} bars: {:.2}ms", bars, aggregate_time);
    println!("Reads against a held snapshot during writes: {:.2}ms", snapshot_time);
}

fn setup_store() -> Store {
    let trades = SeriesDeclaration::TimeSeries(TimeSeriesDecl {
        pattern: "/trades/".to_string(),
        schema: Schema::new(vec![
            FieldDeclaration::new("price", FieldType::fixed(10, 4)),
            FieldDeclaration::new("vol", FieldType::Integer),
        ]),
        retention: Retention::KeepForever,
    });
    let bars = SeriesDeclaration::Aggregation(AggregationDecl {
        name: "bars".to_string(),
        target: "/trades/".to_string(),
        schema: AggregationSchema::new(vec![
            AggField::new("open", Method::First, "price", MissingPolicy::Lag { field: "close".into(), periods: 1 }),
            AggField::new("low", Method::Min, "price", MissingPolicy::UseField("open".into())),
            AggField::new("high", Method::Max, "price", MissingPolicy::UseField("open".into())),
            AggField::new("close", Method::Last, "price", MissingPolicy::UseField("open".into())),
            AggField::new("cVol", Method::Sum, "vol", MissingPolicy::Lag { field: "cVol".into(), periods: 1 }),
        ]),
        period: TimeDelta::minutes(1),
        frequency: TimeDelta::minutes(1),
        retention: Retention::Keep(1_000),
    });

    let store = Store::new(vec![trades, bars], StoreConfig::default());
    store.create_series(SERIES).expect("Failed to create benchmark series");
    store
}

fn generate_test_data() -> (Vec<DateTime<Utc>>, Vec<i64>, Vec<i64>) {
    let mut rng = rand::rng();
    let start = DateTime::<Utc>::UNIX_EPOCH;

    let timestamps = (0..NUM_ROWS)
        .map(|i| start + TimeDelta::milliseconds(i as i64 * TICK_MS))
        .collect();
    let prices = (0..NUM_ROWS).map(|_| rng.random_range(4_000_000..5_000_000)).collect();
    let volumes = (0..NUM_ROWS).map(|_| rng.random_range(1..500)).collect();

    (timestamps, prices, volumes)
}

fn benchmark_ingest(store: &Store, timestamps: &[DateTime<Utc>], prices: &[i64], volumes: &[i64]) -> f64 {
    let start = Instant::now();
    for ((time, price), vol) in timestamps.iter().zip(prices).zip(volumes) {
        store
            .append_datum(SERIES, *time, vec![Datum::Fixed(*price), Datum::Integer(*vol)])
            .expect("Failed to append");
    }
    start.elapsed().as_secs_f64() * 1000.0
}

fn benchmark_query(store: &Store, timestamps: &[DateTime<Utc>]) -> f64 {
    let from = timestamps[NUM_ROWS / 4];
    let to = timestamps[NUM_ROWS * 3 / 4];

    let start = Instant::now();
    let rows = store.query_range(SERIES, from, to).expect("Failed to query").len();
    let elapsed = start.elapsed().as_secs_f64() * 1000.0;

    assert_eq!(rows, NUM_ROWS / 2);
    elapsed
}

fn benchmark_aggregate(store: &Store, timestamps: &[DateTime<Utc>]) -> (f64, usize) {
    let from = timestamps[0];
    let to = timestamps[NUM_ROWS - 1] + TimeDelta::milliseconds(TICK_MS);

    let start = Instant::now();
    let bars = store.aggregate("bars", SERIES, from, to).expect("Failed to aggregate").len();
    (start.elapsed().as_secs_f64() * 1000.0, bars)
}

fn benchmark_snapshot_reads(store: &Store, timestamps: &[DateTime<Utc>]) -> f64 {
    let snapshot = store.snapshot();
    let last = timestamps[NUM_ROWS - 1];

    let start = Instant::now();
    for i in 1..=1_000 {
        store
            .append_datum(SERIES, last + TimeDelta::milliseconds(i), vec![Datum::Fixed(4_500_000), Datum::Integer(1)])
            .expect("Failed to append");
        let held = snapshot.series(SERIES).expect("Series missing from snapshot").len();
        assert_eq!(held, NUM_ROWS);
    }
    start.elapsed().as_secs_f64() * 1000.0
}
