use std::collections::HashSet;

use chrono::TimeDelta;

use super::{AggregationDecl, AggregationSchema, FieldDeclaration, FieldType, Method, Schema};
use crate::storage::Error;

/// Output type of `method` applied to a column of type `source`.
///
/// `Sum` keeps the numeric type and scale of its source.
pub fn derive_field_type(method: Method, source: FieldType) -> Result<FieldType, Error> {
    match (method, source) {
        (Method::Sum, FieldType::String) => Err(Error::DerivationError(
            "cannot sum a string field".to_string(),
        )),
        (_, source) => Ok(source),
    }
}

/// Concrete schema of the instance series of `decl` over a target with schema `target`.
pub fn derive_schema(decl: &AggregationDecl, target: &Schema) -> Result<Schema, Error> {
    if decl.period <= TimeDelta::zero() {
        return Err(Error::DerivationError(format!(
            "aggregation `{}` has a non-positive period",
            decl.name
        )));
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(decl.schema.len());
    for agg_field in decl.schema.fields() {
        if !seen.insert(agg_field.name.as_str()) {
            return Err(Error::DerivationError(format!(
                "field `{}` declared twice in `{}`",
                agg_field.name, decl.name
            )));
        }
        let (_, source) = target.field(&agg_field.source).ok_or_else(|| {
            Error::DerivationError(format!(
                "source field `{}` of `{}.{}` is not in the target schema",
                agg_field.source, decl.name, agg_field.name
            ))
        })?;
        let field_type = derive_field_type(agg_field.method, source.field_type).map_err(|_| {
            Error::DerivationError(format!(
                "`{}.{}` cannot apply {:?} to string field `{}`",
                decl.name, agg_field.name, agg_field.method, agg_field.source
            ))
        })?;
        fields.push(FieldDeclaration::new(agg_field.name.clone(), field_type));
    }

    for (agg_field, derived) in decl.schema.fields().iter().zip(&fields) {
        let reference = agg_field.missing.reference();
        let index = decl.schema.position(reference).ok_or_else(|| {
            Error::DerivationError(format!(
                "missing policy of `{}.{}` refers to unknown field `{reference}`",
                decl.name, agg_field.name
            ))
        })?;
        if fields[index].field_type != derived.field_type {
            return Err(Error::DerivationError(format!(
                "missing policy of `{}.{}` refers to `{reference}` of a different type",
                decl.name, agg_field.name
            )));
        }
    }

    resolution_order(&decl.schema)?;
    Ok(Schema::new(fields))
}

/// Field indices ordered so that every same-period missing-value reference
/// is resolved before the field that reads it.
pub fn resolution_order(schema: &AggregationSchema) -> Result<Vec<usize>, Error> {
    let mut depends_on = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let dependency = if field.missing.is_same_period() {
            let reference = field.missing.reference();
            Some(schema.position(reference).ok_or_else(|| {
                Error::DerivationError(format!(
                    "field `{}` refers to unknown field `{reference}`",
                    field.name
                ))
            })?)
        } else {
            None
        };
        depends_on.push(dependency);
    }

    let mut placed = vec![false; schema.len()];
    let mut order = Vec::with_capacity(schema.len());
    while order.len() < schema.len() {
        let before = order.len();
        for (index, dependency) in depends_on.iter().enumerate() {
            if !placed[index] && dependency.is_none_or(|d| placed[d]) {
                placed[index] = true;
                order.push(index);
            }
        }
        if order.len() == before {
            let cycle: Vec<&str> = schema
                .fields()
                .iter()
                .zip(&placed)
                .filter(|(_, placed)| !**placed)
                .map(|(field, _)| field.name.as_str())
                .collect();
            return Err(Error::DerivationError(format!(
                "missing policies form a cycle between {}",
                cycle.join(", ")
            )));
        }
    }
    Ok(order)
}
