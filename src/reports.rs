use crate::rates::{
    covered, effective_giving, effective_segregating, participation_rate, segregation_rate,
    SCREEN_PRECISION,
};
use crate::types::{
    DashboardStats, GapReasonRow, LogRecord, PeriodType, ReviewRow, RollupRow, RollupSet,
};
use crate::util::{month_start, quarter_of, quarter_start, week_start, year_start};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Start date and label of the period of type `period` that holds `date`.
///
/// The start date orders the rollup rows; the label is what the report
/// shows. Weeks use the same Sunday start as the dashboard series.
pub fn period_key(date: NaiveDate, period: PeriodType) -> (NaiveDate, String) {
    match period {
        PeriodType::Week => {
            let start = week_start(date);
            (start, format!("Week starting {}", start.format("%Y-%m-%d")))
        }
        PeriodType::Month => (month_start(date), date.format("%B %Y").to_string()),
        PeriodType::Quarter => (
            quarter_start(date),
            format!("Q{} {}", quarter_of(date), date.year()),
        ),
        PeriodType::Year => (year_start(date), date.year().to_string()),
    }
}

/// Group `records` into periods of one type and compute each period's rates
/// at `precision` decimals. Every record lands in exactly one row.
pub fn rollup(records: &[LogRecord], period: PeriodType, precision: u32) -> Vec<RollupRow> {
    #[derive(Default)]
    struct Acc {
        label: String,
        records: usize,
        covered: f64,
        giving: f64,
        segregating: f64,
    }

    let mut map: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for r in records {
        let (start, label) = period_key(r.date, period);
        let e = map.entry(start).or_insert_with(|| Acc {
            label,
            ..Acc::default()
        });
        e.records += 1;
        e.covered += covered(r);
        e.giving += effective_giving(r);
        e.segregating += effective_segregating(r);
    }

    map.into_iter()
        .map(|(period_start, acc)| RollupRow {
            period_type: period,
            period_start,
            label: acc.label,
            records: acc.records,
            covered: acc.covered,
            giving: acc.giving,
            segregating: acc.segregating,
            giving_pct: participation_rate(acc.covered, acc.giving, precision),
            seg_pct: segregation_rate(acc.giving, acc.segregating, precision),
        })
        .collect()
}

/// Run the four independent rollup passes over one export scope.
pub fn rollup_all(records: &[LogRecord], precision: u32) -> RollupSet {
    let set = RollupSet {
        weekly: rollup(records, PeriodType::Week, precision),
        monthly: rollup(records, PeriodType::Month, precision),
        quarterly: rollup(records, PeriodType::Quarter, precision),
        yearly: rollup(records, PeriodType::Year, precision),
    };
    debug!(
        records = records.len(),
        weeks = set.weekly.len(),
        months = set.monthly.len(),
        quarters = set.quarterly.len(),
        years = set.yearly.len(),
        "computed period rollups"
    );
    set
}

/// Headline numbers shown above the dashboard charts.
pub fn dashboard_stats(records: &[LogRecord], precision: u32) -> DashboardStats {
    let mut stats = DashboardStats::default();
    for r in records {
        stats.covered += covered(r);
        stats.giving += effective_giving(r);
        stats.segregating += effective_segregating(r);
        if r.no_collection {
            stats.absences += 1;
        }
    }
    stats.participation_pct = participation_rate(stats.covered, stats.giving, precision);
    stats.segregation_pct = segregation_rate(stats.giving, stats.segregating, precision);
    stats
}

/// Count service gaps per reason, most frequent first.
pub fn gap_reasons(records: &[LogRecord]) -> Vec<GapReasonRow> {
    let mut map: HashMap<String, usize> = HashMap::new();
    for r in records.iter().filter(|r| r.no_collection) {
        let reason = match r.gap_reason.trim() {
            "" => "Unspecified".to_string(),
            s => s.to_string(),
        };
        *map.entry(reason).or_default() += 1;
    }
    let mut rows: Vec<GapReasonRow> = map
        .into_iter()
        .map(|(reason, incidents)| GapReasonRow { reason, incidents })
        .collect();
    rows.sort_by(|a, b| match b.incidents.cmp(&a.incidents) {
        Ordering::Equal => a.reason.cmp(&b.reason),
        other => other,
    });
    rows
}

/// Audit table of raw entries in `[from, to]`, newest first.
pub fn review_rows(records: &[LogRecord], from: NaiveDate, to: NaiveDate) -> Vec<ReviewRow> {
    let mut scoped: Vec<&LogRecord> = records
        .iter()
        .filter(|r| from <= r.date && r.date <= to)
        .collect();
    scoped.sort_by(|a, b| b.date.cmp(&a.date));

    scoped
        .into_iter()
        .map(|r| {
            let giving = effective_giving(r);
            let segregating = effective_segregating(r);
            let (given_pct, segregated_pct) = if r.no_collection {
                ("-".to_string(), "-".to_string())
            } else {
                (
                    format!("{:.1}%", participation_rate(covered(r), giving, SCREEN_PRECISION)),
                    format!("{:.1}%", segregation_rate(giving, segregating, SCREEN_PRECISION)),
                )
            };
            ReviewRow {
                date: r.date.format("%Y-%m-%d").to_string(),
                block: r.location_name.clone(),
                supervisor: r.supervisor_name.clone(),
                status: if r.no_collection { "Gap" } else { "Active" }.to_string(),
                covered: covered(r),
                giving,
                segregating,
                given_pct,
                segregated_pct,
            }
        })
        .collect()
}
