//! An embeddable time-series store.
//!
//! Series are schema-typed columnar tables keyed by hierarchical names.
//! Declared aggregations roll a target series up into fixed periods, with
//! per-field fallbacks for periods that have no data. All state lives in a
//! single [`HQuantState`] value served by a single-writer [`Store`].

pub mod query;
pub mod schema;
pub mod storage;

/// Point in time of a row, UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub use schema::{
    AggField, AggregationDecl, AggregationSchema, Declarations, FieldDeclaration, FieldType,
    Method, MissingPolicy, Retention, Schema, SeriesDeclaration, SeriesName, TimeSeriesDecl,
};
pub use storage::{
    ActionId, Column, Datum, Error, HQuantState, Series, SeriesStats, Snapshot, Store,
    StoreConfig, TimeOrdering,
};
