use crate::error::LoadError;
use crate::hierarchy::HierarchySnapshot;
use crate::types::{LogRecord, RawLogRecord, UNASSIGNED};
use crate::util::{parse_date_safe, to_flag, to_non_negative_number, to_text};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

/// Everything one engine invocation reads: the logs and the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Vec<LogRecord>,
    pub hierarchy: HierarchySnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Load a snapshot from a `.json` or `.csv` file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<(Snapshot, LoadReport), LoadError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => {
            let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_json(&text)
        }
        Some("csv") => {
            let rdr = ReaderBuilder::new()
                .flexible(true)
                .trim(csv::Trim::All)
                .from_path(path)?;
            parse_csv(rdr)
        }
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Parse a JSON snapshot: either a bare array of logs, or an object with a
/// `logs` array and an optional `hierarchy` object.
pub fn parse_json(text: &str) -> Result<(Snapshot, LoadReport), LoadError> {
    let value: Value = serde_json::from_str(text)?;
    let (logs, hierarchy) = match value {
        Value::Array(items) => (items, HierarchySnapshot::default()),
        Value::Object(mut map) => {
            let logs = match map.remove("logs") {
                Some(Value::Array(items)) => items,
                _ => return Err(LoadError::MissingLogs),
            };
            let hierarchy = match map.remove("hierarchy") {
                Some(h) => serde_json::from_value(h)?,
                None => HierarchySnapshot::default(),
            };
            (logs, hierarchy)
        }
        _ => return Err(LoadError::MissingLogs),
    };

    let mut report = LoadReport::default();
    let mut records = Vec::with_capacity(logs.len());
    for item in logs {
        report.total_rows += 1;
        // A log that is not even an object cannot carry a date.
        let raw: RawLogRecord = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                warn!(row = report.total_rows, error = %e, "skipping malformed log entry");
                report.skipped_rows += 1;
                continue;
            }
        };
        push_clean(raw, &mut records, &mut report);
    }
    Ok((Snapshot { records, hierarchy }, report))
}

/// CSV cells are read as text and handed to the same coercion as JSON
/// strings, so ids like `007` keep their leading zeros.
fn parse_csv<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
) -> Result<(Snapshot, LoadReport), LoadError> {
    let headers = rdr.headers()?.clone();
    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = report.total_rows, error = %e, "skipping malformed CSV row");
                report.skipped_rows += 1;
                continue;
            }
        };
        let fields: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        let raw: RawLogRecord = match serde_json::from_value(Value::Object(fields)) {
            Ok(r) => r,
            Err(e) => {
                warn!(row = report.total_rows, error = %e, "skipping malformed CSV row");
                report.skipped_rows += 1;
                continue;
            }
        };
        push_clean(raw, &mut records, &mut report);
    }
    Ok((
        Snapshot {
            records,
            hierarchy: HierarchySnapshot::default(),
        },
        report,
    ))
}

fn push_clean(raw: RawLogRecord, records: &mut Vec<LogRecord>, report: &mut LoadReport) {
    match clean(raw) {
        Some(r) => {
            records.push(r);
            report.loaded_rows += 1;
        }
        None => {
            warn!(row = report.total_rows, "skipping log entry without a valid date");
            report.skipped_rows += 1;
        }
    }
}

/// Coerce one raw entry. Only an unreadable date rejects the entry; every
/// other field degrades to zero, `false` or empty text.
pub fn clean(raw: RawLogRecord) -> Option<LogRecord> {
    let date = parse_date_safe(Some(to_text(raw.date.as_ref()).as_str()))?;
    let supervisor_id = match to_text(raw.supervisor_id.as_ref()) {
        s if s.is_empty() => UNASSIGNED.to_string(),
        s => s,
    };
    Some(LogRecord {
        date,
        location_id: to_text(raw.block_id.as_ref()),
        location_name: to_text(raw.block_name.as_ref()),
        parent_area_id: to_text(raw.ward_id.as_ref()),
        parent_area_name: to_text(raw.ward_name.as_ref()),
        supervisor_id,
        supervisor_name: to_text(raw.supervisor_name.as_ref()),
        households_covered: to_non_negative_number(raw.hh_covered.as_ref()),
        households_giving: to_non_negative_number(raw.hh_giving.as_ref()),
        households_segregating: to_non_negative_number(raw.hh_segregating.as_ref()),
        no_collection: to_flag(raw.no_collection.as_ref()),
        gap_reason: to_text(raw.reason.as_ref()),
    })
}
