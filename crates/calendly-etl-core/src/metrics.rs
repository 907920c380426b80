//! Per-name aggregation of the raw extract.

use std::collections::BTreeMap;

use crate::error::{EtlError, EtlResult};
use crate::record::{EventRecord, MetricRecord};
use crate::time::parse_timestamp;

#[derive(Default)]
struct Accumulator {
    count: u64,
    invitees: u64,
    minutes: f64,
}

/// Summarises `records` into one [`MetricRecord`] per distinct name.
///
/// Output is ordered by name. Missing invitee counts contribute 0. A record
/// whose start or end cannot be parsed fails the whole aggregation with
/// [`EtlError::MetricsComputationFailed`]; nothing is skipped.
pub fn aggregate(records: &[EventRecord]) -> EtlResult<Vec<MetricRecord>> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for record in records {
        let minutes = duration_minutes(record)?;
        let acc = groups.entry(record.name.as_str()).or_default();
        acc.count += 1;
        acc.invitees += record.invitees.unwrap_or(0);
        acc.minutes += minutes;
    }

    Ok(groups
        .into_iter()
        .map(|(name, acc)| MetricRecord {
            name: name.to_string(),
            scheduled_events: acc.count,
            total_invitees: acc.invitees,
            avg_duration: acc.minutes / acc.count as f64,
        })
        .collect())
}

/// Returns `end_time - start_time` in (fractional) minutes.
fn duration_minutes(record: &EventRecord) -> EtlResult<f64> {
    let start = parse_timestamp(&record.start_time).ok_or_else(|| {
        EtlError::metrics(format!(
            "event `{}` has malformed start_time {:?}",
            record.event_id, record.start_time
        ))
    })?;
    let end = parse_timestamp(&record.end_time).ok_or_else(|| {
        EtlError::metrics(format!(
            "event `{}` has malformed end_time {:?}",
            record.event_id, record.end_time
        ))
    })?;

    let millis = (end - start).num_milliseconds();
    Ok(millis as f64 / 60_000.0)
}
