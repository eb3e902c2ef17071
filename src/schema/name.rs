use std::fmt;

use crate::storage::Error;

/// A parsed series name, borrowing from the original string.
///
/// Plain names are paths such as `/trades/MSFT`. Aggregation instances are
/// written `aggregation:/target/path`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesName<'a> {
    Plain(&'a str),
    Instance { aggregation: &'a str, target: &'a str },
}

impl<'a> SeriesName<'a> {
    pub fn parse(name: &'a str) -> Result<Self, Error> {
        match name.split_once(':') {
            None if is_path(name) => Ok(SeriesName::Plain(name)),
            Some((aggregation, target)) if is_aggregation_name(aggregation) && is_path(target) => {
                Ok(SeriesName::Instance { aggregation, target })
            }
            _ => Err(Error::InvalidName(format!(
                "`{name}` is neither `/path` nor `aggregation:/path`"
            ))),
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, SeriesName::Instance { .. })
    }
}

impl fmt::Display for SeriesName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesName::Plain(path) => f.write_str(path),
            SeriesName::Instance { aggregation, target } => write!(f, "{aggregation}:{target}"),
        }
    }
}

/// Name of the series holding `aggregation` rolled up over `target`.
pub fn instance_name(aggregation: &str, target: &str) -> String {
    format!("{aggregation}:{target}")
}

pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    name.starts_with(pattern)
}

fn is_path(s: &str) -> bool {
    s.len() > 1
        && s.starts_with('/')
        && !s.contains(':')
        && !s.chars().any(|c| c.is_whitespace() || c.is_control())
}

fn is_aggregation_name(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c == '/' || c.is_whitespace() || c.is_control())
}
