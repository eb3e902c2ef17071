use super::Nullable;
use crate::schema::Method;
use crate::storage::{Column, Error};

/// Raw values of one source column, split into per-period buckets.
#[derive(Debug)]
pub(crate) enum Grouped {
    Fixed { decimals: u8, buckets: Vec<Vec<i64>> },
    Integer(Vec<Vec<i64>>),
    String(Vec<Vec<String>>),
}

impl Grouped {
    pub fn collect(column: &Column, buckets: &[Vec<usize>]) -> Self {
        match column {
            Column::Fixed { decimals, values } => Grouped::Fixed {
                decimals: *decimals,
                buckets: gather(buckets, |row| values.get(row).copied()),
            },
            Column::Integer(values) => {
                Grouped::Integer(gather(buckets, |row| values.get(row).copied()))
            }
            Column::String(values) => {
                Grouped::String(gather(buckets, |row| values.get(row).cloned()))
            }
        }
    }

    /// Reduces every bucket. An empty bucket is missing for every method.
    pub fn reduce(self, method: Method) -> Result<Nullable, Error> {
        Ok(match self {
            Grouped::Fixed { decimals, buckets } => Nullable::Fixed {
                decimals,
                values: buckets
                    .iter()
                    .map(|b| reduce_numeric(b, method))
                    .collect::<Result<_, _>>()?,
            },
            Grouped::Integer(buckets) => Nullable::Integer(
                buckets
                    .iter()
                    .map(|b| reduce_numeric(b, method))
                    .collect::<Result<_, _>>()?,
            ),
            Grouped::String(buckets) => Nullable::String(
                buckets
                    .into_iter()
                    .map(|b| reduce_text(b, method))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn gather<T>(buckets: &[Vec<usize>], value: impl Fn(usize) -> Option<T>) -> Vec<Vec<T>> {
    buckets
        .iter()
        .map(|rows| rows.iter().filter_map(|&row| value(row)).collect())
        .collect()
}

fn reduce_numeric(bucket: &[i64], method: Method) -> Result<Option<i64>, Error> {
    Ok(match method {
        Method::First => bucket.first().copied(),
        Method::Last => bucket.last().copied(),
        Method::Min => bucket.iter().min().copied(),
        Method::Max => bucket.iter().max().copied(),
        Method::Sum if bucket.is_empty() => None,
        Method::Sum => Some(
            bucket
                .iter()
                .try_fold(0i64, |acc, v| acc.checked_add(*v))
                .ok_or_else(|| Error::Overflow(format!("sum of {} values exceeds i64", bucket.len())))?,
        ),
    })
}

fn reduce_text(bucket: Vec<String>, method: Method) -> Result<Option<String>, Error> {
    Ok(match method {
        Method::First => bucket.into_iter().next(),
        Method::Last => bucket.into_iter().last(),
        Method::Min => bucket.into_iter().min(),
        Method::Max => bucket.into_iter().max(),
        Method::Sum => {
            return Err(Error::DerivationError(
                "cannot sum a string field".to_string(),
            ));
        }
    })
}
