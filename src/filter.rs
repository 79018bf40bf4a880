use crate::types::{FilterSpec, LogRecord};
use tracing::debug;

/// Narrow the full record set down to what the dashboard is looking at.
///
/// A record survives when its area, unit, supervisor and date all match.
/// An empty unit set matches every unit. The input is never touched; the
/// result is a fresh list, possibly empty.
pub fn apply(records: &[LogRecord], spec: &FilterSpec) -> Vec<LogRecord> {
    let subset: Vec<LogRecord> = records
        .iter()
        .filter(|r| matches(r, spec))
        .cloned()
        .collect();
    debug!(
        total = records.len(),
        kept = subset.len(),
        "applied dashboard filter"
    );
    subset
}

pub fn matches(record: &LogRecord, spec: &FilterSpec) -> bool {
    spec.area.matches(&record.parent_area_id)
        && (spec.units.is_empty() || spec.units.contains(&record.location_id))
        && spec.supervisor.matches(&record.supervisor_id)
        && in_range(record, spec)
}

fn in_range(record: &LogRecord, spec: &FilterSpec) -> bool {
    spec.date_from <= record.date && record.date <= spec.date_to
}

/// Records inside an inclusive date range, ignoring every other selection.
/// Export and review screens scope their data this way.
pub fn date_range(
    records: &[LogRecord],
    date_from: chrono::NaiveDate,
    date_to: chrono::NaiveDate,
) -> Vec<LogRecord> {
    apply(records, &FilterSpec::for_range(date_from, date_to))
}
