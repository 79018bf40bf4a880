// Reporting and aggregation engine for household waste-collection logs.
//
// The engine modules (`rates`, `filter`, `series`, `reports`, `export`) are
// pure functions over in-memory records. `loader`, `output` and `config`
// are the file and settings harness used by the binary.
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod hierarchy;
pub mod loader;
pub mod output;
pub mod rates;
pub mod reports;
pub mod series;
pub mod types;
pub mod util;

pub use error::LoadError;
pub use hierarchy::HierarchySnapshot;
pub use types::{
    FilterSpec, Granularity, LogRecord, PeriodType, RollupRow, RollupSet, Scope, SeriesBucket,
};
