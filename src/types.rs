use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tabled::Tabled;

/// Supervisor id used by the store when a unit has nobody assigned.
pub const UNASSIGNED: &str = "unassigned";

/// A log entry as it arrives from the document store. Every field is kept
/// loosely typed; the loader coerces it into a [`LogRecord`].
#[derive(Debug, Default, Deserialize)]
pub struct RawLogRecord {
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default, rename = "wardId", alias = "parentAreaId")]
    pub ward_id: Option<Value>,
    #[serde(default, rename = "wardName", alias = "parentAreaName")]
    pub ward_name: Option<Value>,
    #[serde(default, rename = "blockId", alias = "locationId")]
    pub block_id: Option<Value>,
    #[serde(default, rename = "blockName", alias = "locationName")]
    pub block_name: Option<Value>,
    #[serde(default, rename = "supervisorId")]
    pub supervisor_id: Option<Value>,
    #[serde(default, rename = "supervisorName")]
    pub supervisor_name: Option<Value>,
    #[serde(default, rename = "hhCovered", alias = "householdsCovered")]
    pub hh_covered: Option<Value>,
    #[serde(default, rename = "hhGiving", alias = "householdsGiving")]
    pub hh_giving: Option<Value>,
    #[serde(default, rename = "hhSegregating", alias = "householdsSegregating")]
    pub hh_segregating: Option<Value>,
    #[serde(default, rename = "noCollection", alias = "noCollectionFlag")]
    pub no_collection: Option<Value>,
    #[serde(default, alias = "gapReason")]
    pub reason: Option<Value>,
}

/// One observation of one unit on one calendar day.
///
/// The household counts are stored exactly as reported. Consumers must go
/// through [`crate::rates::effective_giving`] and
/// [`crate::rates::effective_segregating`], which zero them on service-gap
/// days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub date: NaiveDate,
    pub location_id: String,
    pub location_name: String,
    pub parent_area_id: String,
    pub parent_area_name: String,
    pub supervisor_id: String,
    pub supervisor_name: String,
    pub households_covered: f64,
    pub households_giving: f64,
    pub households_segregating: f64,
    pub no_collection: bool,
    pub gap_reason: String,
}

impl LogRecord {
    pub fn new(date: NaiveDate, location_id: impl Into<String>) -> Self {
        Self {
            date,
            location_id: location_id.into(),
            location_name: String::new(),
            parent_area_id: String::new(),
            parent_area_name: String::new(),
            supervisor_id: UNASSIGNED.to_string(),
            supervisor_name: String::new(),
            households_covered: 0.0,
            households_giving: 0.0,
            households_segregating: 0.0,
            no_collection: false,
            gap_reason: String::new(),
        }
    }

    pub fn with_area(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.parent_area_id = id.into();
        self.parent_area_name = name.into();
        self
    }

    pub fn with_location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = name.into();
        self
    }

    pub fn with_supervisor(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.supervisor_id = id.into();
        self.supervisor_name = name.into();
        self
    }

    pub fn with_counts(mut self, covered: f64, giving: f64, segregating: f64) -> Self {
        self.households_covered = covered;
        self.households_giving = giving;
        self.households_segregating = segregating;
        self
    }

    pub fn with_gap(mut self, reason: impl Into<String>) -> Self {
        self.no_collection = true;
        self.gap_reason = reason.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Only(String),
}

impl Scope {
    pub fn matches(&self, id: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::Only(wanted) => wanted == id,
        }
    }
}

/// Dashboard filter selections. The date range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub area: Scope,
    /// Empty means every unit.
    pub units: HashSet<String>,
    pub supervisor: Scope,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl FilterSpec {
    pub fn for_range(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            area: Scope::All,
            units: HashSet::new(),
            supervisor: Scope::All,
            date_from,
            date_to,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PeriodType {
    Week,
    Month,
    Quarter,
    Year,
}

impl PeriodType {
    pub const ALL: [PeriodType; 4] = [
        PeriodType::Week,
        PeriodType::Month,
        PeriodType::Quarter,
        PeriodType::Year,
    ];

    /// Prefix written before every summary row of this period type.
    pub fn section_label(&self) -> &'static str {
        match self {
            PeriodType::Week => "Weekly Average",
            PeriodType::Month => "Monthly Average",
            PeriodType::Quarter => "Quarterly Average",
            PeriodType::Year => "Yearly Average",
        }
    }
}

/// One point of a dashboard chart. Rates are derived by the caller from the
/// raw sums so rounding never compounds.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct SeriesBucket {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub label: String,
    #[serde(rename = "Giving")]
    #[tabled(rename = "Giving")]
    pub giving: f64,
    #[serde(rename = "Segregating")]
    #[tabled(rename = "Segregating")]
    pub segregating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupRow {
    pub period_type: PeriodType,
    pub period_start: NaiveDate,
    pub label: String,
    pub records: usize,
    pub covered: f64,
    pub giving: f64,
    pub segregating: f64,
    pub giving_pct: f64,
    pub seg_pct: f64,
}

/// The four rollup tables of one export, each computed in its own pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RollupSet {
    pub weekly: Vec<RollupRow>,
    pub monthly: Vec<RollupRow>,
    pub quarterly: Vec<RollupRow>,
    pub yearly: Vec<RollupRow>,
}

impl RollupSet {
    pub fn get(&self, period: PeriodType) -> &[RollupRow] {
        match period {
            PeriodType::Week => &self.weekly,
            PeriodType::Month => &self.monthly,
            PeriodType::Quarter => &self.quarterly,
            PeriodType::Year => &self.yearly,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub covered: f64,
    pub giving: f64,
    pub segregating: f64,
    pub absences: usize,
    pub participation_pct: f64,
    pub segregation_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct GapReasonRow {
    #[serde(rename = "Reason")]
    #[tabled(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Incidents")]
    #[tabled(rename = "Incidents")]
    pub incidents: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ReviewRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Block")]
    #[tabled(rename = "Block")]
    pub block: String,
    #[serde(rename = "Supervisor")]
    #[tabled(rename = "Supervisor")]
    pub supervisor: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Covered")]
    #[tabled(rename = "Covered")]
    pub covered: f64,
    #[serde(rename = "WasteGiven")]
    #[tabled(rename = "Waste Given")]
    pub giving: f64,
    #[serde(rename = "WasteSegregated")]
    #[tabled(rename = "Waste Segregated")]
    pub segregating: f64,
    #[serde(rename = "GivenPct")]
    #[tabled(rename = "Given %")]
    pub given_pct: String,
    #[serde(rename = "SegregatedPct")]
    #[tabled(rename = "Segregated %")]
    pub segregated_pct: String,
}
