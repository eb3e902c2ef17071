use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::{ChunkedVec, Error};
use crate::schema::FieldType;

/// A single positional value supplied at ingestion.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    /// Scaled integer of a `Fixed` field.
    Fixed(i64),
    Integer(i64),
    String(String),
}

impl Datum {
    pub fn kind(&self) -> &'static str {
        match self {
            Datum::Fixed(_) => "fixed",
            Datum::Integer(_) => "integer",
            Datum::String(_) => "string",
        }
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::String(value.to_string())
    }
}

/// A typed column of a series, aligned by index with its timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    Fixed { decimals: u8, values: ChunkedVec<i64> },
    Integer(ChunkedVec<i64>),
    String(ChunkedVec<String>),
}

impl Column {
    /// An empty column able to hold values of `field_type`.
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Fixed { decimals, .. } => Column::Fixed {
                decimals,
                values: ChunkedVec::new(),
            },
            FieldType::Integer => Column::Integer(ChunkedVec::new()),
            FieldType::String => Column::String(ChunkedVec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Fixed { values, .. } => values.len(),
            Column::Integer(values) => values.len(),
            Column::String(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Fixed { .. } => "fixed",
            Column::Integer(_) => "integer",
            Column::String(_) => "string",
        }
    }

    /// True when this column stores values of `field_type`.
    pub fn holds(&self, field_type: FieldType) -> bool {
        match (self, field_type) {
            (Column::Fixed { decimals, .. }, FieldType::Fixed { decimals: d, .. }) => *decimals == d,
            (Column::Integer(_), FieldType::Integer) => true,
            (Column::String(_), FieldType::String) => true,
            _ => false,
        }
    }

    pub fn accepts(&self, datum: &Datum) -> bool {
        matches!(
            (self, datum),
            (Column::Fixed { .. }, Datum::Fixed(_))
                | (Column::Integer(_), Datum::Integer(_))
                | (Column::String(_), Datum::String(_))
        )
    }

    pub fn get(&self, index: usize) -> Option<Datum> {
        match self {
            Column::Fixed { values, .. } => values.get(index).copied().map(Datum::Fixed),
            Column::Integer(values) => values.get(index).copied().map(Datum::Integer),
            Column::String(values) => values.get(index).cloned().map(Datum::String),
        }
    }

    pub fn datums(&self) -> Box<dyn Iterator<Item = Datum> + '_> {
        match self {
            Column::Fixed { values, .. } => Box::new(values.iter().copied().map(Datum::Fixed)),
            Column::Integer(values) => Box::new(values.iter().copied().map(Datum::Integer)),
            Column::String(values) => Box::new(values.iter().cloned().map(Datum::String)),
        }
    }

    pub(crate) fn push(&mut self, datum: Datum) -> Result<(), Error> {
        match (self, datum) {
            (Column::Fixed { values, .. }, Datum::Fixed(v)) => values.push(v),
            (Column::Integer(values), Datum::Integer(v)) => values.push(v),
            (Column::String(values), Datum::String(v)) => values.push(v),
            (column, datum) => {
                return Err(Error::SchemaMismatch(format!(
                    "{} value pushed into {} column",
                    datum.kind(),
                    column.kind()
                )));
            }
        }
        Ok(())
    }

    pub fn slice(&self, range: Range<usize>) -> Self {
        match self {
            Column::Fixed { decimals, values } => Column::Fixed {
                decimals: *decimals,
                values: values.slice(range),
            },
            Column::Integer(values) => Column::Integer(values.slice(range)),
            Column::String(values) => Column::String(values.slice(range)),
        }
    }

    pub(crate) fn remove_range(&mut self, range: Range<usize>) {
        match self {
            Column::Fixed { values, .. } => values.remove_range(range),
            Column::Integer(values) => values.remove_range(range),
            Column::String(values) => values.remove_range(range),
        }
    }
}
