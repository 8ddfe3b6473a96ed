//! Source resolution and loading.
//!
//! [`SourceManager`] decides which observation log to read (the user's file
//! or the fallback) and runs it through the loader. Every call to
//! [`SourceManager::load`] reads the file afresh; nothing is cached.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::RecordSet;
use dashboard_data::reader;

/// Default fallback file name inside the data directory.
pub const FALLBACK_FILE_NAME: &str = "observations.csv";

// ── Public types ──────────────────────────────────────────────────────────────

/// Which file was picked, before it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub path: PathBuf,
    /// `true` when no user file was given and the fallback is used.
    pub is_fallback: bool,
}

/// Where the current record set came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub is_fallback: bool,
    /// Number of normalized observation rows.
    pub record_count: usize,
    /// When the file was read.
    pub loaded_at: DateTime<Utc>,
}

impl SourceIdentity {
    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A freshly loaded record set together with its identity.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub identity: SourceIdentity,
    pub records: RecordSet,
}

// ── SourceManager ─────────────────────────────────────────────────────────────

/// Picks and loads the observation source for a session.
///
/// # Example
/// ```no_run
/// use std::path::PathBuf;
/// use dashboard_runtime::data_manager::SourceManager;
///
/// let mgr = SourceManager::new(None, PathBuf::from("observations.csv"));
/// let loaded = mgr.load().expect("source loads");
/// println!("{} observations", loaded.identity.record_count);
/// ```
pub struct SourceManager {
    /// File supplied by the user, if any.
    file: Option<PathBuf>,
    /// Path used when `file` is `None`.
    fallback: PathBuf,
}

impl SourceManager {
    pub fn new(file: Option<PathBuf>, fallback: PathBuf) -> Self {
        Self { file, fallback }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Choose the source path without reading it.
    ///
    /// A user file that does not exist is a [`DashboardError::FileRead`]; a
    /// missing fallback is a [`DashboardError::SourceNotFound`].
    pub fn resolve(&self) -> Result<ResolvedSource> {
        match &self.file {
            Some(path) => {
                if !path.is_file() {
                    return Err(DashboardError::FileRead {
                        path: path.clone(),
                        source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
                    });
                }
                Ok(ResolvedSource {
                    path: path.clone(),
                    is_fallback: false,
                })
            }
            None => {
                if !self.fallback.is_file() {
                    return Err(DashboardError::SourceNotFound(self.fallback.clone()));
                }
                tracing::warn!(path = %self.fallback.display(), "no file given, using fallback source");
                Ok(ResolvedSource {
                    path: self.fallback.clone(),
                    is_fallback: true,
                })
            }
        }
    }

    /// Resolve and read the source into a fresh [`RecordSet`].
    pub fn load(&self) -> Result<LoadedSource> {
        let result = self.resolve().and_then(|resolved| {
            let records = reader::load_file(&resolved.path)?;
            Ok(LoadedSource {
                identity: SourceIdentity {
                    path: resolved.path,
                    is_fallback: resolved.is_fallback,
                    record_count: records.len(),
                    loaded_at: Utc::now(),
                },
                records,
            })
        });

        match &result {
            Ok(loaded) => {
                tracing::info!(
                    path = %loaded.identity.path.display(),
                    records = loaded.identity.record_count,
                    fallback = loaded.identity.is_fallback,
                    "observation source loaded"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "observation source failed to load");
            }
        }

        result
    }

    /// The path that would be read when no user file is given.
    pub fn fallback_path(&self) -> &Path {
        &self.fallback
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
