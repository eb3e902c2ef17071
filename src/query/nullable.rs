use crate::storage::{ChunkedVec, Column, Datum, Error};

/// One reduced value per period, `None` where the period had no value.
#[derive(Debug)]
pub(crate) enum Nullable {
    Fixed { decimals: u8, values: Vec<Option<i64>> },
    Integer(Vec<Option<i64>>),
    String(Vec<Option<String>>),
}

impl Nullable {
    pub fn is_missing(&self, period: usize) -> bool {
        match self {
            Nullable::Fixed { values, .. } | Nullable::Integer(values) => {
                values.get(period).is_none_or(Option::is_none)
            }
            Nullable::String(values) => values.get(period).is_none_or(Option::is_none),
        }
    }

    pub fn get(&self, period: usize) -> Option<Datum> {
        match self {
            Nullable::Fixed { values, .. } => values.get(period).copied().flatten().map(Datum::Fixed),
            Nullable::Integer(values) => values.get(period).copied().flatten().map(Datum::Integer),
            Nullable::String(values) => values.get(period).cloned().flatten().map(Datum::String),
        }
    }

    pub fn fill(&mut self, period: usize, datum: Datum) -> Result<(), Error> {
        let kind = datum.kind();
        let slot_kind = self.kind();
        let filled = match (self, datum) {
            (Nullable::Fixed { values, .. }, Datum::Fixed(v)) => values.get_mut(period).map(|s| *s = Some(v)),
            (Nullable::Integer(values), Datum::Integer(v)) => values.get_mut(period).map(|s| *s = Some(v)),
            (Nullable::String(values), Datum::String(v)) => values.get_mut(period).map(|s| *s = Some(v)),
            _ => {
                return Err(Error::SchemaMismatch(format!(
                    "cannot fill a {slot_kind} field with a {kind} value"
                )));
            }
        };
        filled.ok_or_else(|| Error::SchemaMismatch(format!("period {period} out of range")))
    }

    fn kind(&self) -> &'static str {
        match self {
            Nullable::Fixed { .. } => "fixed",
            Nullable::Integer(_) => "integer",
            Nullable::String(_) => "string",
        }
    }

    /// Column holding the values of the periods in `keep`, which must all be present.
    pub fn into_column(self, keep: &[usize]) -> Column {
        match self {
            Nullable::Fixed { decimals, values } => Column::Fixed {
                decimals,
                values: select(values, keep),
            },
            Nullable::Integer(values) => Column::Integer(select(values, keep)),
            Nullable::String(values) => Column::String(select(values, keep)),
        }
    }
}

fn select<T: Clone>(values: Vec<Option<T>>, keep: &[usize]) -> ChunkedVec<T> {
    keep.iter()
        .filter_map(|&period| values.get(period).cloned().flatten())
        .collect()
}
