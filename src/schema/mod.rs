//! Field types, series/aggregation declarations and the lookups over them.
//!
//! Declarations are produced by an external configuration loader and are
//! read-only for the lifetime of a store. Series names are matched against
//! declaration patterns by prefix.

use std::sync::Arc;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

mod derive;
mod name;

#[cfg(test)]
mod tests;

pub use derive::{derive_field_type, derive_schema, resolution_order};
pub use name::{instance_name, matches_pattern, SeriesName};

/// Storage type of a single column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Decimal stored as an integer scaled by `10^decimals`.
    Fixed { precision: u8, decimals: u8 },
    Integer,
    String,
}

impl FieldType {
    pub fn fixed(precision: u8, decimals: u8) -> Self {
        FieldType::Fixed { precision, decimals }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldType::String)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type }
    }
}

/// Ordered column layout of a series. Column order is fixed once a series exists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<FieldDeclaration>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDeclaration>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position and declaration of the field called `name`.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDeclaration)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// Reduction applied to the raw values falling into one period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    First,
    Min,
    Max,
    Last,
    Sum,
}

/// Fallback used when a period reduces to no value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingPolicy {
    /// Take the resolved value of another field for the same period.
    UseField(String),
    /// Take the resolved value of a field `periods` periods earlier.
    Lag { field: String, periods: usize },
}

impl MissingPolicy {
    /// Name of the aggregation field this policy reads from.
    pub fn reference(&self) -> &str {
        match self {
            MissingPolicy::UseField(field) => field,
            MissingPolicy::Lag { field, .. } => field,
        }
    }

    /// True when the policy reads a value of the period being resolved.
    pub fn is_same_period(&self) -> bool {
        matches!(self, MissingPolicy::UseField(_) | MissingPolicy::Lag { periods: 0, .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggField {
    pub name: String,
    pub method: Method,
    pub source: String,
    pub missing: MissingPolicy,
}

impl AggField {
    pub fn new(
        name: impl Into<String>,
        method: Method,
        source: impl Into<String>,
        missing: MissingPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            source: source.into(),
            missing,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationSchema {
    fields: Vec<AggField>,
}

impl AggregationSchema {
    pub fn new(fields: Vec<AggField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[AggField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// How long the archival collaborator keeps data for a declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Retention {
    #[default]
    KeepForever,
    Keep(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesDecl {
    pub pattern: String,
    pub schema: Schema,
    #[serde(default)]
    pub retention: Retention,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationDecl {
    pub name: String,
    /// Prefix pattern of the series this aggregation applies to.
    pub target: String,
    pub schema: AggregationSchema,
    #[serde(with = "nanos")]
    pub period: TimeDelta,
    /// Cadence at which the scheduler is expected to run the aggregation.
    #[serde(with = "nanos")]
    pub frequency: TimeDelta,
    #[serde(default)]
    pub retention: Retention,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesDeclaration {
    TimeSeries(TimeSeriesDecl),
    Aggregation(AggregationDecl),
}

/// Immutable, ordered list of declarations shared by every state version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Declarations(Arc<Vec<SeriesDeclaration>>);

impl Declarations {
    pub fn new(declarations: Vec<SeriesDeclaration>) -> Self {
        Self(Arc::new(declarations))
    }

    pub fn as_slice(&self) -> &[SeriesDeclaration] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesDeclaration> {
        self.0.iter()
    }

    /// First aggregation declared under `name`.
    pub fn find_aggregation(&self, name: &str) -> Option<&AggregationDecl> {
        self.0.iter().find_map(|decl| match decl {
            SeriesDeclaration::Aggregation(agg) if agg.name == name => Some(agg),
            _ => None,
        })
    }

    /// First time-series declaration whose pattern matches `name`.
    pub fn find_series_decl(&self, name: &str) -> Option<&TimeSeriesDecl> {
        self.0.iter().find_map(|decl| match decl {
            SeriesDeclaration::TimeSeries(ts) if matches_pattern(name, &ts.pattern) => Some(ts),
            _ => None,
        })
    }

    /// Instance names (`agg:name`) of every aggregation whose target pattern matches `name`.
    pub fn applicable_aggregations(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|decl| match decl {
                SeriesDeclaration::Aggregation(agg) if matches_pattern(name, &agg.target) => {
                    Some(instance_name(&agg.name, name))
                }
                _ => None,
            })
            .collect()
    }
}

impl From<Vec<SeriesDeclaration>> for Declarations {
    fn from(declarations: Vec<SeriesDeclaration>) -> Self {
        Self::new(declarations)
    }
}

/// Durations are encoded as signed nanosecond counts.
mod nanos {
    use chrono::TimeDelta;
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = delta
            .num_nanoseconds()
            .ok_or_else(|| ser::Error::custom("duration exceeds nanosecond range"))?;
        serializer.serialize_i64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        if nanos == i64::MIN {
            return Err(de::Error::custom("duration out of range"));
        }
        Ok(TimeDelta::nanoseconds(nanos))
    }
}
