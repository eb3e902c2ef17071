//! Windowed aggregation over a target series.
//!
//! An aggregation splits `[start, end)` into periods, buckets the target's
//! rows into them, reduces every bucket per field, fills empty periods from
//! the declared missing-value policies and keeps the periods for which every
//! field ended up with a value.

use crate::schema::{resolution_order, AggregationDecl, AggregationSchema, MissingPolicy, Schema};
use crate::storage::{ChunkedVec, Error, Series};
use crate::Timestamp;

mod grouped;
mod nullable;
mod periods;

#[cfg(test)]
mod tests;

use grouped::Grouped;
use nullable::Nullable;
pub use periods::{bucket_rows, periods};

/// Aggregates `target` over `[start, end)` into a series shaped like `output`.
///
/// `output` is the schema of the aggregation instance series; it is taken
/// as given rather than re-derived.
pub fn aggregate(
    decl: &AggregationDecl,
    target: &Series,
    output: &Schema,
    start: Timestamp,
    end: Timestamp,
) -> Result<Series, Error> {
    let order = resolution_order(&decl.schema)?;
    let periods = periods(start, end, decl.period)?;
    if periods.is_empty() {
        return Ok(Series::new(output.clone()));
    }

    let buckets = bucket_rows(target.times(), &periods);
    let mut columns = Vec::with_capacity(decl.schema.len());
    for field in decl.schema.fields() {
        let source = target.column(&field.source).ok_or_else(|| {
            Error::DerivationError(format!(
                "source field `{}` of `{}.{}` is not in the target schema",
                field.source, decl.name, field.name
            ))
        })?;
        columns.push(Grouped::collect(source, &buckets).reduce(field.method)?);
    }

    resolve_missing(&decl.schema, &order, &mut columns, periods.len())?;

    let complete: Vec<usize> = (0..periods.len())
        .filter(|&period| columns.iter().all(|column| !column.is_missing(period)))
        .collect();
    let times: ChunkedVec<Timestamp> = complete.iter().map(|&period| periods[period].0).collect();
    let columns = columns
        .into_iter()
        .map(|column| column.into_column(&complete))
        .collect();
    Series::from_parts(output.clone(), times, columns)
}

/// Fills missing values period by period, visiting fields in `order`.
///
/// Periods are resolved chronologically, so a `Lag` always reads a final
/// value; `order` guarantees the same for same-period references.
fn resolve_missing(
    schema: &AggregationSchema,
    order: &[usize],
    columns: &mut [Nullable],
    periods: usize,
) -> Result<(), Error> {
    for period in 0..periods {
        for &index in order {
            if !columns[index].is_missing(period) {
                continue;
            }
            let field = &schema.fields()[index];
            let source_period = match &field.missing {
                MissingPolicy::UseField(_) => Some(period),
                MissingPolicy::Lag { periods: lag, .. } => period.checked_sub(*lag),
            };
            let Some(source_period) = source_period else {
                continue;
            };
            let reference = field.missing.reference();
            let source = schema.position(reference).ok_or_else(|| {
                Error::DerivationError(format!(
                    "field `{}` refers to unknown field `{reference}`",
                    field.name
                ))
            })?;
            if let Some(value) = columns[source].get(source_period) {
                columns[index].fill(period, value)?;
            }
        }
    }
    Ok(())
}
