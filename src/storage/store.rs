use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use super::{ActionId, Datum, Error, HQuantState, Series, SeriesStats, StoreConfig};
use crate::schema::{Declarations, SeriesDeclaration};
use crate::Timestamp;

/// An immutable view of the store as of the moment it was taken.
pub type Snapshot = Arc<HQuantState>;

/// Single-writer, many-reader front for an [`HQuantState`].
///
/// Writers are serialized by `writer`; each one builds the next state from
/// a shallow clone and publishes it with a pointer swap. Readers only clone
/// the current `Arc`, so they never wait on a write in progress and a
/// failed write leaves the published state untouched.
pub struct Store {
    current: RwLock<Snapshot>,
    writer: Mutex<()>,
    config: StoreConfig,
}

impl Store {
    pub fn new(declarations: impl Into<Declarations>, config: StoreConfig) -> Self {
        Self::from_state(HQuantState::new(declarations), config)
    }

    /// Resumes from a state rebuilt by the persistence layer.
    pub fn from_state(state: HQuantState, config: StoreConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(state)),
            writer: Mutex::new(()),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.current.read())
    }

    /// Runs `f` against a consistent snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&HQuantState) -> R) -> R {
        let snapshot = self.snapshot();
        f(&snapshot)
    }

    /// Runs `f` as one atomic write transaction.
    ///
    /// The new state is published only if `f` succeeds.
    pub fn write<R>(&self, f: impl FnOnce(&mut HQuantState) -> Result<R, Error>) -> Result<R, Error> {
        let _writer = self.writer.lock();
        let mut next = HQuantState::clone(&self.snapshot());
        let out = f(&mut next)?;
        *self.current.write() = Arc::new(next);
        Ok(out)
    }

    pub fn list_declarations(&self) -> Vec<SeriesDeclaration> {
        self.read(|state| state.declarations().as_slice().to_vec())
    }

    pub fn list_series_names(&self) -> Vec<String> {
        self.read(HQuantState::series_names)
    }

    pub fn applicable_aggregations(&self, name: &str) -> Vec<String> {
        self.read(|state| state.applicable_aggregations(name))
    }

    pub fn series_stats(&self, name: &str) -> Result<SeriesStats, Error> {
        self.read(|state| Ok(state.series(name)?.stats()))
    }

    pub fn create_series(&self, name: &str) -> Result<(), Error> {
        self.write(|state| state.create_series(name))?;
        debug!("created series {}", name);
        Ok(())
    }

    pub fn delete_series(&self, name: &str) -> Result<(), Error> {
        self.write(|state| state.delete_series(name))?;
        debug!("deleted series {}", name);
        Ok(())
    }

    pub fn append_datum(&self, name: &str, time: Timestamp, datums: Vec<Datum>) -> Result<(), Error> {
        let ordering = self.config.time_ordering;
        match self.write(|state| state.append_datum(name, time, datums, ordering)) {
            Ok(()) => {
                debug!("appended row to {} at {}", name, time);
                Ok(())
            }
            Err(Error::OutOfOrder(msg)) => {
                warn!("rejected append to {}: {}", name, msg);
                Err(Error::OutOfOrder(msg))
            }
            Err(e) => Err(e),
        }
    }

    pub fn query_range(&self, name: &str, from: Timestamp, to: Timestamp) -> Result<Series, Error> {
        self.read(|state| state.query_range(name, from, to))
    }

    pub fn delete_range(&self, name: &str, from: Timestamp, to: Timestamp) -> Result<usize, Error> {
        let removed = self.write(|state| state.delete_range(name, from, to))?;
        debug!("deleted {} rows from {} in [{}, {})", removed, name, from, to);
        Ok(removed)
    }

    pub fn aggregate(
        &self,
        aggregation: &str,
        target: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Series, Error> {
        self.read(|state| state.aggregate(aggregation, target, start, end))
    }

    pub fn materialize_aggregation(
        &self,
        aggregation: &str,
        target: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<usize, Error> {
        let ordering = self.config.time_ordering;
        let appended = self.write(|state| {
            state.materialize_aggregation(aggregation, target, start, end, ordering)
        })?;
        info!(
            "materialized {} periods of {}:{} over [{}, {})",
            appended, aggregation, target, start, end
        );
        Ok(appended)
    }

    pub fn last_action_run(&self, action: &ActionId) -> Result<Timestamp, Error> {
        self.read(|state| state.last_action_run(action))
    }

    pub fn record_action_run(&self, action: ActionId, time: Timestamp) -> Result<(), Error> {
        self.write(|state| {
            state.record_action_run(action.clone(), time);
            Ok(())
        })?;
        debug!("recorded run of {} at {}", action, time);
        Ok(())
    }
}
