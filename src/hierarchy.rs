// Read-only view of the state → ward → block → supervisor hierarchy.
//
// Records already carry denormalized names, so aggregation never needs
// this. It only backs names that were blank when a record was written.
use crate::types::LogRecord;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Lookup tables for blank record names. Other keys in the stored
/// hierarchy, such as states and parent links, are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchySnapshot {
    #[serde(default)]
    pub wards: Vec<Named>,
    #[serde(default)]
    pub blocks: Vec<Named>,
    #[serde(default)]
    pub supervisors: Vec<Named>,
}

/// Names printed for a record in exported rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNames {
    pub area: String,
    pub unit: String,
    pub supervisor: String,
}

impl HierarchySnapshot {
    pub fn ward_name(&self, id: &str) -> Option<&str> {
        self.wards
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.name.as_str())
            .filter(|n| !n.trim().is_empty())
    }

    pub fn block_name(&self, id: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.name.as_str())
            .filter(|n| !n.trim().is_empty())
    }

    pub fn supervisor_name(&self, id: &str) -> Option<&str> {
        self.supervisors
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
            .filter(|n| !n.trim().is_empty())
    }

    /// Record name first, then the hierarchy, then a fixed placeholder.
    pub fn display_names(&self, record: &LogRecord) -> DisplayNames {
        fn pick(own: &str, looked_up: Option<&str>, fallback: &str) -> String {
            if !own.trim().is_empty() {
                own.to_string()
            } else {
                looked_up.unwrap_or(fallback).to_string()
            }
        }
        DisplayNames {
            area: pick(
                &record.parent_area_name,
                self.ward_name(&record.parent_area_id),
                "N/A",
            ),
            unit: pick(
                &record.location_name,
                self.block_name(&record.location_id),
                "N/A",
            ),
            supervisor: pick(
                &record.supervisor_name,
                self.supervisor_name(&record.supervisor_id),
                "Unassigned",
            ),
        }
    }
}
