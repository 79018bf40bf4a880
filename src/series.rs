// Chart series for the dashboard.
//
// Buckets are keyed by a sortable key, labelled for humans, and ordered by
// the earliest raw date seen in each bucket. Labels are never used for
// ordering: "Jan 2025" sorts before "Feb 2024" as text.
use crate::rates::{effective_giving, effective_segregating, segregation_rate};
use crate::types::{Granularity, LogRecord, SeriesBucket};
use crate::util::week_start;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Sortable key and display label of the bucket holding `date`.
pub fn bucket_of(date: NaiveDate, granularity: Granularity) -> (String, String) {
    match granularity {
        Granularity::Daily => {
            let iso = date.format("%Y-%m-%d").to_string();
            (iso.clone(), iso)
        }
        Granularity::Weekly => {
            let start = week_start(date);
            (
                start.format("%Y-%m-%d").to_string(),
                start.format("Week of %-d %b").to_string(),
            )
        }
        Granularity::Monthly => (
            date.format("%Y-%m").to_string(),
            date.format("%b %Y").to_string(),
        ),
    }
}

pub fn build(records: &[LogRecord], granularity: Granularity) -> Vec<SeriesBucket> {
    struct Acc {
        label: String,
        giving: f64,
        segregating: f64,
        raw_date: NaiveDate,
    }

    let mut groups: HashMap<String, Acc> = HashMap::new();
    for r in records {
        let (key, label) = bucket_of(r.date, granularity);
        let e = groups.entry(key).or_insert_with(|| Acc {
            label,
            giving: 0.0,
            segregating: 0.0,
            raw_date: r.date,
        });
        e.giving += effective_giving(r);
        e.segregating += effective_segregating(r);
        e.raw_date = e.raw_date.min(r.date);
    }

    let mut ordered: Vec<(String, Acc)> = groups.into_iter().collect();
    ordered.sort_by(|a, b| a.1.raw_date.cmp(&b.1.raw_date).then_with(|| a.0.cmp(&b.0)));
    debug!(%granularity, buckets = ordered.len(), "built chart series");

    ordered
        .into_iter()
        .map(|(_, acc)| SeriesBucket {
            label: acc.label,
            giving: acc.giving,
            segregating: acc.segregating,
        })
        .collect()
}

impl SeriesBucket {
    pub fn segregation_pct(&self, precision: u32) -> f64 {
        segregation_rate(self.giving, self.segregating, precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rec(date: &str, giving: f64, seg: f64) -> LogRecord {
        LogRecord::new(d(date), "b1").with_counts(100.0, giving, seg)
    }

    #[test]
    fn daily_buckets_follow_dates() {
        let records = vec![
            rec("2024-03-08", 90.0, 50.0),
            rec("2024-03-01", 80.0, 40.0),
            rec("2024-03-02", 70.0, 30.0).with_gap("Vehicle breakdown"),
        ];
        let out = build(&records, Granularity::Daily);
        let labels: Vec<_> = out.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-03-01", "2024-03-02", "2024-03-08"]);
        assert_eq!(out[1].giving, 0.0);
        assert_eq!(out[1].segregating, 0.0);
    }

    #[test]
    fn weekly_buckets_start_on_sunday() {
        let records = vec![
            rec("2024-03-01", 80.0, 40.0),
            rec("2024-03-02", 10.0, 5.0),
            rec("2024-03-03", 90.0, 50.0),
        ];
        let out = build(&records, Granularity::Weekly);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "Week of 25 Feb");
        assert_eq!(out[0].giving, 90.0);
        assert_eq!(out[1].label, "Week of 3 Mar");
    }

    #[test]
    fn monthly_order_is_chronological_not_alphabetical() {
        let records = vec![
            rec("2025-01-15", 1.0, 1.0),
            rec("2024-02-10", 2.0, 1.0),
            rec("2024-12-31", 3.0, 1.0),
            rec("2024-02-20", 4.0, 1.0),
        ];
        let out = build(&records, Granularity::Monthly);
        let labels: Vec<_> = out.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Feb 2024", "Dec 2024", "Jan 2025"]);
        assert_eq!(out[0].giving, 6.0);
    }

    #[test]
    fn same_month_in_different_years_stays_apart() {
        let records = vec![rec("2023-05-01", 1.0, 0.0), rec("2024-05-01", 1.0, 0.0)];
        assert_eq!(build(&records, Granularity::Monthly).len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(build(&[], Granularity::Weekly).is_empty());
    }

    #[test]
    fn rates_are_derived_from_raw_sums() {
        let records = vec![rec("2024-03-01", 3.0, 1.0), rec("2024-03-02", 3.0, 1.0)];
        let out = build(&records, Granularity::Monthly);
        assert_eq!(out[0].segregation_pct(1), 33.3);
    }
}
