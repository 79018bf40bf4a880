// Spreadsheet export.
//
// The layout is fixed: raw rows, a blank line, then the four rollup tables.
// Rows are joined with `\n` and there is no trailing newline.
use crate::filter;
use crate::hierarchy::HierarchySnapshot;
use crate::rates::{covered, effective_giving, effective_segregating};
use crate::reports::rollup_all;
use crate::types::{LogRecord, PeriodType, RollupSet};
use chrono::NaiveDate;
use tracing::debug;

pub const RECORD_HEADERS: [&str; 9] = [
    "Reporting Date",
    "Ward",
    "Block",
    "Supervisor",
    "HH Covered",
    "Giving Waste",
    "Segregating",
    "Status",
    "Reason",
];
pub const SUMMARY_TITLE: &str = "AVERAGE PERFORMANCE SUMMARY";
pub const SUMMARY_HEADERS: [&str; 4] = [
    "Period Type",
    "Summary Period",
    "Avg Giving %",
    "Avg Segregation %",
];

/// Records in `[from, to]`, oldest first. Equal dates keep input order.
pub fn export_scope(records: &[LogRecord], from: NaiveDate, to: NaiveDate) -> Vec<LogRecord> {
    let mut scoped = filter::date_range(records, from, to);
    scoped.sort_by(|a, b| a.date.cmp(&b.date));
    scoped
}

/// Build the full report for `[from, to]` with summary rates at `precision`
/// decimals.
///
/// Returns `None` when nothing falls in the range; the caller reports
/// "no data" and skips the download.
pub fn generate(
    records: &[LogRecord],
    from: NaiveDate,
    to: NaiveDate,
    hierarchy: &HierarchySnapshot,
    precision: u32,
) -> Option<String> {
    let scoped = export_scope(records, from, to);
    if scoped.is_empty() {
        debug!(%from, %to, "export range has no records");
        return None;
    }
    let rollups = rollup_all(&scoped, precision);
    Some(render(&scoped, &rollups, hierarchy, precision))
}

/// Render already-scoped, already-sorted records and their rollups.
pub fn render(
    records: &[LogRecord],
    rollups: &RollupSet,
    hierarchy: &HierarchySnapshot,
    precision: u32,
) -> String {
    let decimals = precision as usize;
    let mut lines: Vec<String> = Vec::with_capacity(records.len() + 16);
    lines.push(join(RECORD_HEADERS.iter().map(|h| field(h))));

    for r in records {
        let names = hierarchy.display_names(r);
        let (status, reason) = if r.no_collection {
            ("Absent", quoted(&r.gap_reason))
        } else {
            ("Collected", String::new())
        };
        lines.push(join([
            r.date.format("%Y-%m-%d").to_string(),
            field(&names.area),
            field(&names.unit),
            field(&names.supervisor),
            covered(r).to_string(),
            effective_giving(r).to_string(),
            effective_segregating(r).to_string(),
            status.to_string(),
            reason,
        ]));
    }

    lines.push(String::new());
    lines.push(SUMMARY_TITLE.to_string());
    lines.push(join(SUMMARY_HEADERS.iter().map(|h| field(h))));
    for period in PeriodType::ALL {
        for row in rollups.get(period) {
            lines.push(join([
                period.section_label().to_string(),
                field(&row.label),
                format!("{:.*}", decimals, row.giving_pct),
                format!("{:.*}", decimals, row.seg_pct),
            ]));
        }
    }

    debug!(rows = lines.len(), "rendered export report");
    lines.join("\n")
}

/// Quote a field only when it would otherwise break the row.
pub fn field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        quoted(s)
    } else {
        s.to_string()
    }
}

/// Always quote; embedded quotes are doubled.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn join<I>(fields: I) -> String
where
    I: IntoIterator<Item = String>,
{
    fields.into_iter().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::EXPORT_PRECISION;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn records() -> Vec<LogRecord> {
        let base = |date: &str| {
            LogRecord::new(d(date), "b1")
                .with_area("w1", "Ward 12")
                .with_location_name("Block A")
                .with_supervisor("s1", "Asha")
        };
        vec![
            base("2024-03-08").with_counts(100.0, 90.0, 50.0),
            base("2024-03-02").with_gap("Vehicle breakdown"),
            base("2024-03-01").with_counts(100.0, 80.0, 40.0),
        ]
    }

    fn march(records: &[LogRecord], precision: u32) -> Option<String> {
        generate(
            records,
            d("2024-03-01"),
            d("2024-03-31"),
            &HierarchySnapshot::default(),
            precision,
        )
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(field("Block A"), "Block A");
        assert_eq!(field("Ward 1, North"), "\"Ward 1, North\"");
        assert_eq!(field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quoted("Vehicle breakdown"), "\"Vehicle breakdown\"");
        assert_eq!(quoted(""), "\"\"");
    }

    #[test]
    fn empty_range_produces_nothing() {
        let out = generate(
            &records(),
            d("2025-01-01"),
            d("2025-01-31"),
            &HierarchySnapshot::default(),
            EXPORT_PRECISION,
        );
        assert!(out.is_none());
        assert!(march(&[], EXPORT_PRECISION).is_none());
    }

    #[test]
    fn full_report_layout() {
        let report = march(&records(), EXPORT_PRECISION).unwrap();
        let expected = [
            "Reporting Date,Ward,Block,Supervisor,HH Covered,Giving Waste,Segregating,Status,Reason",
            "2024-03-01,Ward 12,Block A,Asha,100,80,40,Collected,",
            "2024-03-02,Ward 12,Block A,Asha,0,0,0,Absent,\"Vehicle breakdown\"",
            "2024-03-08,Ward 12,Block A,Asha,100,90,50,Collected,",
            "",
            "AVERAGE PERFORMANCE SUMMARY",
            "Period Type,Summary Period,Avg Giving %,Avg Segregation %",
            "Weekly Average,Week starting 2024-02-25,80.00,50.00",
            "Weekly Average,Week starting 2024-03-03,90.00,55.56",
            "Monthly Average,March 2024,85.00,52.94",
            "Quarterly Average,Q1 2024,85.00,52.94",
            "Yearly Average,2024,85.00,52.94",
        ]
        .join("\n");
        assert_eq!(report, expected);
    }

    #[test]
    fn summary_rates_follow_requested_precision() {
        let report = march(&records(), 1).unwrap();
        assert!(report.contains("Weekly Average,Week starting 2024-03-03,90.0,55.6"));
        assert!(report.contains("Monthly Average,March 2024,85.0,52.9"));
    }

    #[test]
    fn gap_rows_zero_stored_counts() {
        let scoped = vec![LogRecord::new(d("2024-03-02"), "b1")
            .with_counts(120.0, 60.0, 30.0)
            .with_gap("Collection staff not available, again")];
        let rollups = rollup_all(&scoped, EXPORT_PRECISION);
        let out = render(
            &scoped,
            &rollups,
            &HierarchySnapshot::default(),
            EXPORT_PRECISION,
        );
        let row = out.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "2024-03-02,N/A,N/A,Unassigned,120,0,0,Absent,\"Collection staff not available, again\""
        );
    }

    #[test]
    fn same_input_renders_same_bytes() {
        let a = march(&records(), EXPORT_PRECISION);
        let b = march(&records(), EXPORT_PRECISION);
        assert_eq!(a, b);
    }
}
