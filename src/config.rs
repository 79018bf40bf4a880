// Runtime settings for the interactive driver.
//
// Defaults match the dashboard's behaviour; each can be overridden from the
// environment. Precisions are handed to the rate functions per call.
use crate::rates::{EXPORT_PRECISION, SCREEN_PRECISION};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub snapshot_path: PathBuf,
    pub output_dir: PathBuf,
    pub window_days: i64,
    pub screen_precision: u32,
    pub export_precision: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("swm_snapshot.json"),
            output_dir: PathBuf::from("."),
            window_days: 14,
            screen_precision: SCREEN_PRECISION,
            export_precision: EXPORT_PRECISION,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(p) = lookup("SWM_SNAPSHOT").filter(|s| !s.trim().is_empty()) {
            cfg.snapshot_path = PathBuf::from(p.trim());
        }
        if let Some(p) = lookup("SWM_OUTPUT_DIR").filter(|s| !s.trim().is_empty()) {
            cfg.output_dir = PathBuf::from(p.trim());
        }
        if let Some(days) = lookup("SWM_WINDOW_DAYS").and_then(|s| s.trim().parse::<i64>().ok()) {
            if days >= 0 {
                cfg.window_days = days;
            }
        }
        cfg
    }

    /// Download name for an export covering `[from, to]`.
    pub fn report_path(&self, from: &str, to: &str) -> PathBuf {
        self.output_dir.join(format!("SWM_Report_{}_to_{}.csv", from, to))
    }
}
