// Errors raised while loading a snapshot from disk.
//
// The aggregation engine itself never fails; only the file harness does.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV snapshot: {0}")]
    Csv(#[from] csv::Error),

    #[error("Snapshot has no log list (expected an array or a \"logs\" field)")]
    MissingLogs,

    #[error("Unsupported snapshot format: {0} (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
}
