//! The analysis artifact and its read-through cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{write_atomic, StorageError};
use crate::models::AnalysisReport;

/// Write the report as pretty JSON, atomically.
pub async fn write_report(path: &Path, report: &AnalysisReport) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(report)?;
    write_atomic(path, &json).await?;
    info!(
        path = %path.display(),
        rows = report.tierlist.len(),
        matches = report.total_matches,
        "Analysis written"
    );
    Ok(())
}

pub async fn read_report(path: &Path) -> Result<AnalysisReport, StorageError> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

struct Loaded {
    at: Instant,
    report: Arc<AnalysisReport>,
}

/// Serves the artifact from memory, reloading it from disk once the
/// freshness window has passed.
pub struct AnalysisCache {
    path: PathBuf,
    ttl: Duration,
    loaded: RwLock<Option<Loaded>>,
}

impl AnalysisCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            loaded: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current report, or `None` when no readable artifact exists.
    pub async fn get(&self) -> Option<Arc<AnalysisReport>> {
        {
            let loaded = self.loaded.read().await;
            if let Some(loaded) = loaded.as_ref() {
                if loaded.at.elapsed() < self.ttl {
                    return Some(loaded.report.clone());
                }
            }
        }

        let mut loaded = self.loaded.write().await;
        // Another reader may have reloaded while we waited for the lock.
        if let Some(current) = loaded.as_ref() {
            if current.at.elapsed() < self.ttl {
                return Some(current.report.clone());
            }
        }

        match read_report(&self.path).await {
            Ok(report) => {
                debug!(path = %self.path.display(), "Analysis reloaded");
                let report = Arc::new(report);
                *loaded = Some(Loaded {
                    at: Instant::now(),
                    report: report.clone(),
                });
                Some(report)
            }
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No analysis available yet");
                *loaded = None;
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load analysis");
                *loaded = None;
                None
            }
        }
    }

    /// Drop the in-memory copy so the next read goes to disk.
    pub async fn invalidate(&self) {
        *self.loaded.write().await = None;
    }
}
