use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::{ChunkedVec, Column, Datum, Error, TimeOrdering};
use crate::schema::Schema;
use crate::Timestamp;

/// A schema-typed table of timestamps plus one column per field.
///
/// `times` and every column always have the same length; rows are only
/// ever appended or spliced out across all of them together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct Series {
    schema: Schema,
    times: ChunkedVec<Timestamp>,
    columns: Vec<Column>,
    /// Whether `times` is non-decreasing.
    #[serde(skip)]
    ordered: bool,
}

// Decoded form, checked for alignment before it becomes a `Series`.
#[derive(Deserialize)]
struct RawSeries {
    schema: Schema,
    times: ChunkedVec<Timestamp>,
    columns: Vec<Column>,
}

impl TryFrom<RawSeries> for Series {
    type Error = Error;

    fn try_from(raw: RawSeries) -> Result<Self, Error> {
        Series::from_parts(raw.schema, raw.times, raw.columns)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeriesStats {
    pub rows: usize,
    pub first: Option<Timestamp>,
    pub last: Option<Timestamp>,
}

impl Series {
    pub fn new(schema: Schema) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|field| Column::empty(field.field_type))
            .collect();
        Self {
            schema,
            times: ChunkedVec::new(),
            columns,
            ordered: true,
        }
    }

    /// Assembles a series from already-aligned parts.
    pub(crate) fn from_parts(
        schema: Schema,
        times: ChunkedVec<Timestamp>,
        columns: Vec<Column>,
    ) -> Result<Self, Error> {
        if columns.len() != schema.len() {
            return Err(Error::SchemaMismatch(format!(
                "{} columns for a schema of {} fields",
                columns.len(),
                schema.len()
            )));
        }
        for (field, column) in schema.fields().iter().zip(&columns) {
            if !column.holds(field.field_type) || column.len() != times.len() {
                return Err(Error::SchemaMismatch(format!(
                    "column `{}` does not line up with its schema",
                    field.name
                )));
            }
        }
        Ok(Self {
            ordered: is_ascending(&times),
            schema,
            times,
            columns,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn times(&self) -> &ChunkedVec<Timestamp> {
        &self.times
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let (index, _) = self.schema.field(name)?;
        self.columns.get(index)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last_time(&self) -> Option<Timestamp> {
        self.times.last().copied()
    }

    pub fn stats(&self) -> SeriesStats {
        SeriesStats {
            rows: self.len(),
            first: self.times.first().copied(),
            last: self.last_time(),
        }
    }

    pub fn row(&self, index: usize) -> Option<Vec<Datum>> {
        self.columns.iter().map(|column| column.get(index)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = (Timestamp, Vec<Datum>)> + '_ {
        self.times
            .iter()
            .enumerate()
            .filter_map(|(index, time)| Some((*time, self.row(index)?)))
    }

    /// Validates a row against the schema without touching the series.
    pub fn check_row(
        &self,
        time: Timestamp,
        datums: &[Datum],
        ordering: TimeOrdering,
    ) -> Result<(), Error> {
        if datums.len() != self.columns.len() {
            return Err(Error::SchemaMismatch(format!(
                "expected {} values, got {}",
                self.columns.len(),
                datums.len()
            )));
        }
        for ((field, column), datum) in self.schema.fields().iter().zip(&self.columns).zip(datums) {
            if !column.accepts(datum) {
                return Err(Error::SchemaMismatch(format!(
                    "field `{}` is {}, got a {} value",
                    field.name,
                    column.kind(),
                    datum.kind()
                )));
            }
        }
        if ordering == TimeOrdering::Enforced {
            if let Some(last) = self.last_time().filter(|last| time < *last) {
                return Err(Error::OutOfOrder(format!("{time} is before last row at {last}")));
            }
        }
        Ok(())
    }

    /// Appends one row. Nothing is written unless the whole row is valid.
    pub(crate) fn append(
        &mut self,
        time: Timestamp,
        datums: Vec<Datum>,
        ordering: TimeOrdering,
    ) -> Result<(), Error> {
        self.check_row(time, &datums, ordering)?;
        self.ordered &= self.last_time().is_none_or(|last| last <= time);
        self.times.push(time);
        for (column, datum) in self.columns.iter_mut().zip(datums) {
            column.push(datum)?;
        }
        Ok(())
    }

    /// Index span from the first to the last row with `from <= t < to`.
    ///
    /// Ascending timestamps are binary searched. Otherwise every row is
    /// scanned and the span may cover rows outside the interval.
    pub fn matching_span(&self, from: Timestamp, to: Timestamp) -> Option<Range<usize>> {
        if self.ordered {
            let first = self.times.partition_point(|time| *time < from);
            let end = self.times.partition_point(|time| *time < to);
            return (first < end).then_some(first..end);
        }

        let mut span: Option<(usize, usize)> = None;
        for (index, time) in self.times.iter().enumerate() {
            if from <= *time && *time < to {
                span = Some(span.map_or((index, index), |(first, _)| (first, index)));
            }
        }
        span.map(|(first, last)| first..last + 1)
    }

    /// Rows in `[from, to)` as a detached series with the same schema.
    pub fn range(&self, from: Timestamp, to: Timestamp) -> Series {
        match self.matching_span(from, to) {
            Some(span) => {
                let times = self.times.slice(span.clone());
                Series {
                    schema: self.schema.clone(),
                    ordered: self.ordered || is_ascending(&times),
                    times,
                    columns: self.columns.iter().map(|c| c.slice(span.clone())).collect(),
                }
            }
            None => Series::new(self.schema.clone()),
        }
    }

    /// Splices out the rows in `[from, to)`, returning how many were removed.
    pub(crate) fn delete_range(&mut self, from: Timestamp, to: Timestamp) -> usize {
        let Some(span) = self.matching_span(from, to) else {
            return 0;
        };
        self.times.remove_range(span.clone());
        for column in &mut self.columns {
            column.remove_range(span.clone());
        }
        self.ordered = self.ordered || is_ascending(&self.times);
        span.len()
    }
}

fn is_ascending(times: &ChunkedVec<Timestamp>) -> bool {
    times.iter().zip(times.iter().skip(1)).all(|(a, b)| a <= b)
}
