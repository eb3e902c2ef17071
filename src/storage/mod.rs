//! Columnar series storage and the transactional store built on it

mod chunked;
mod column;
mod errors;
mod export;
mod series;
mod state;
mod store;

#[cfg(test)]
pub(crate) mod tests;

pub use chunked::{ChunkedVec, CHUNK_ROWS};
pub use column::{Column, Datum};
pub use errors::Error;
pub use series::{Series, SeriesStats};
pub use state::{ActionId, HQuantState};
pub use store::{Snapshot, Store};

/// Whether appends must keep a series' timestamps non-decreasing.
///
/// Range queries and deletions assume ascending timestamps; `Unchecked`
/// leaves that precondition to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeOrdering {
    #[default]
    Enforced,
    Unchecked,
}

/// Configuration for the storage engine
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    pub time_ordering: TimeOrdering,
}
