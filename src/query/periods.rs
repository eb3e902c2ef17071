use chrono::TimeDelta;

use crate::storage::{ChunkedVec, Error};
use crate::Timestamp;

/// Consecutive `[start, end)` windows of length `period` covering `[start, end)`.
///
/// The last window is cut short at `end`.
pub fn periods(
    start: Timestamp,
    end: Timestamp,
    period: TimeDelta,
) -> Result<Vec<(Timestamp, Timestamp)>, Error> {
    if period <= TimeDelta::zero() {
        return Err(Error::DerivationError(format!(
            "aggregation period must be positive, got {period}"
        )));
    }

    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let next = cursor
            .checked_add_signed(period)
            .map_or(end, |next| next.min(end));
        windows.push((cursor, next));
        cursor = next;
    }
    Ok(windows)
}

/// Row indices of `times` falling into each window.
///
/// A single forward scan: rows before the current window are skipped and
/// never revisited, so `times` is expected to be ascending.
pub fn bucket_rows(times: &ChunkedVec<Timestamp>, windows: &[(Timestamp, Timestamp)]) -> Vec<Vec<usize>> {
    let mut buckets = vec![Vec::new(); windows.len()];
    let mut current = 0;
    for (row, time) in times.iter().enumerate() {
        while current < windows.len() && *time >= windows[current].1 {
            current += 1;
        }
        if current == windows.len() {
            break;
        }
        if *time >= windows[current].0 {
            buckets[current].push(row);
        }
    }
    buckets
}
