use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bird dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The source had a header (or nothing at all) but no data rows.
    #[error("Source contains no observation rows")]
    EmptySource,

    /// The source could not be parsed as semicolon-delimited text.
    #[error("Malformed source: {0}")]
    MalformedSource(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither a user-supplied file nor the fallback source exists.
    #[error("Observation source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The last-used parameters could not be serialised.
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// `true` for errors that block the whole session until a valid source
    /// is supplied.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            DashboardError::EmptySource
                | DashboardError::MalformedSource(_)
                | DashboardError::FileRead { .. }
                | DashboardError::SourceNotFound(_)
        )
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
