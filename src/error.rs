use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers. Data-shape problems (missing labels,
/// unparsable numbers) never end up here; they are defaulted in place.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("unknown category id: {0}")]
    UnknownCategory(String),

    #[error("labels/values length mismatch: {labels} labels, {values} values")]
    LengthMismatch { labels: usize, values: usize },

    #[error("no records for chart {chart_id}: no chart rendered")]
    NoRecords { chart_id: String },

    #[error("render target not found: {0}")]
    MissingTarget(String),

    #[error("invalid navigation transition: {0}")]
    InvalidTransition(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, DashError>;
