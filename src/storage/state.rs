use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Datum, Error, Series, TimeOrdering};
use crate::query;
use crate::schema::{
    derive_schema, instance_name, matches_pattern, Declarations, Schema, SeriesDeclaration,
    SeriesName,
};
use crate::Timestamp;

/// Identity of a scheduled action. The store assigns it no meaning.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The whole store as one value.
///
/// Cloning is shallow: series sit behind `Arc`s and their columns share
/// chunks, so a writer can derive the next version from a clone while
/// readers keep the previous one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HQuantState {
    declarations: Declarations,
    series: BTreeMap<String, Arc<Series>>,
    actions_last_run: BTreeMap<ActionId, Timestamp>,
}

impl HQuantState {
    pub fn new(declarations: impl Into<Declarations>) -> Self {
        Self {
            declarations: declarations.into(),
            series: BTreeMap::new(),
            actions_last_run: BTreeMap::new(),
        }
    }

    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    /// Materialized series names in sorted order.
    pub fn series_names(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    pub fn series(&self, name: &str) -> Result<&Series, Error> {
        self.series
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| Error::NotFound(format!("series `{name}`")))
    }

    pub fn applicable_aggregations(&self, name: &str) -> Vec<String> {
        self.declarations.applicable_aggregations(name)
    }

    /// Schema a series called `name` would be created with.
    pub fn resolve_schema(&self, name: &str) -> Result<Schema, Error> {
        match SeriesName::parse(name)? {
            SeriesName::Plain(path) => self
                .declarations
                .find_series_decl(path)
                .map(|decl| decl.schema.clone())
                .ok_or_else(|| Error::NotConfigured(format!("no series declaration matches `{path}`"))),
            SeriesName::Instance { aggregation, target } => {
                let decl = self.declarations.find_aggregation(aggregation).ok_or_else(|| {
                    Error::NotConfigured(format!("no aggregation named `{aggregation}`"))
                })?;
                if !matches_pattern(target, &decl.target) {
                    return Err(Error::AggregationNotApplicable(format!(
                        "`{aggregation}` targets `{}`, not `{target}`",
                        decl.target
                    )));
                }
                let target_series = self.series(target)?;
                derive_schema(decl, target_series.schema())
            }
        }
    }

    pub fn create_series(&mut self, name: &str) -> Result<(), Error> {
        let schema = self.resolve_schema(name)?;
        if self.series.contains_key(name) {
            return Err(Error::AlreadyExists(format!("series `{name}`")));
        }
        self.series.insert(name.to_string(), Arc::new(Series::new(schema)));
        Ok(())
    }

    pub fn delete_series(&mut self, name: &str) -> Result<(), Error> {
        self.series
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("series `{name}`")))
    }

    /// Appends one row, creating an aggregation instance series on first write.
    pub fn append_datum(
        &mut self,
        name: &str,
        time: Timestamp,
        datums: Vec<Datum>,
        ordering: TimeOrdering,
    ) -> Result<(), Error> {
        if let Some(series) = self.series.get_mut(name) {
            series.check_row(time, &datums, ordering)?;
            return Arc::make_mut(series).append(time, datums, ordering);
        }

        let is_instance = SeriesName::parse(name).is_ok_and(|parsed| parsed.is_instance());
        if !is_instance {
            return Err(Error::NotFound(format!("series `{name}`")));
        }
        let schema = self.resolve_schema(name).map_err(|e| match e {
            Error::InvalidName(msg) | Error::NotConfigured(msg) => Error::NotFound(msg),
            other => other,
        })?;
        let mut series = Series::new(schema);
        series.append(time, datums, ordering)?;
        self.series.insert(name.to_string(), Arc::new(series));
        Ok(())
    }

    /// Rows of `name` with `from <= t < to`.
    pub fn query_range(&self, name: &str, from: Timestamp, to: Timestamp) -> Result<Series, Error> {
        Ok(self.series(name)?.range(from, to))
    }

    /// Removes the rows of `name` with `from <= t < to`, returning how many were removed.
    pub fn delete_range(&mut self, name: &str, from: Timestamp, to: Timestamp) -> Result<usize, Error> {
        if self.series(name)?.matching_span(from, to).is_none() {
            return Ok(0);
        }
        let series = self
            .series
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(format!("series `{name}`")))?;
        Ok(Arc::make_mut(series).delete_range(from, to))
    }

    /// Rolls `target` up per the aggregation `aggregation` over `[start, end)`.
    pub fn aggregate(
        &self,
        aggregation: &str,
        target: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Series, Error> {
        let decl = self
            .declarations
            .find_aggregation(aggregation)
            .ok_or_else(|| Error::NotFound(format!("aggregation `{aggregation}`")))?;
        let target_series = self.series(target)?;
        let output = match self.series.get(&instance_name(aggregation, target)) {
            Some(instance) => instance.schema().clone(),
            None => derive_schema(decl, target_series.schema())?,
        };
        query::aggregate(decl, target_series, &output, start, end)
    }

    /// Writes the complete periods of `[start, end)` into the instance series.
    ///
    /// A period counts only once its full length fits before `end`. Stored
    /// rows from the first complete period up to the end of the last one are
    /// replaced with the fresh values, so rows computed before late data
    /// arrived get corrected. Returns how many periods were new.
    pub fn materialize_aggregation(
        &mut self,
        aggregation: &str,
        target: &str,
        start: Timestamp,
        end: Timestamp,
        ordering: TimeOrdering,
    ) -> Result<usize, Error> {
        let period = self
            .declarations
            .find_aggregation(aggregation)
            .map(|decl| decl.period)
            .ok_or_else(|| Error::NotFound(format!("aggregation `{aggregation}`")))?;
        let rolled = self.aggregate(aggregation, target, start, end)?;
        let complete: Vec<(Timestamp, Vec<Datum>)> = rolled
            .rows()
            .filter(|(time, _)| time.checked_add_signed(period).is_some_and(|close| close <= end))
            .collect();

        let name = instance_name(aggregation, target);
        if !self.series.contains_key(&name) {
            self.create_series(&name)?;
        }
        let (Some((first, _)), Some((last, _))) = (complete.first(), complete.last()) else {
            return Ok(0);
        };
        let (first, covered_to) = (*first, *last + period);
        let instance = self
            .series
            .get_mut(&name)
            .ok_or_else(|| Error::NotFound(format!("series `{name}`")))?;
        let previous_last = instance.last_time();
        let added = complete
            .iter()
            .filter(|(time, _)| previous_last.is_none_or(|last| *time > last))
            .count();

        let series = Arc::make_mut(instance);
        let later = series.range(covered_to, Timestamp::MAX_UTC);
        series.delete_range(first, Timestamp::MAX_UTC);
        for (time, row) in complete {
            series.append(time, row, ordering)?;
        }
        for (time, row) in later.rows() {
            series.append(time, row, ordering)?;
        }
        Ok(added)
    }

    pub fn last_action_run(&self, action: &ActionId) -> Result<Timestamp, Error> {
        self.actions_last_run
            .get(action)
            .copied()
            .ok_or_else(|| Error::NeverRun(action.to_string()))
    }

    pub fn record_action_run(&mut self, action: ActionId, time: Timestamp) {
        self.actions_last_run.insert(action, time);
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(encoded: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(encoded)?)
    }
}

impl From<Vec<SeriesDeclaration>> for HQuantState {
    fn from(declarations: Vec<SeriesDeclaration>) -> Self {
        Self::new(declarations)
    }
}
