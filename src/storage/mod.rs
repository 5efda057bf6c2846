//! Filesystem persistence.
//!
//! Two things live under the data directory:
//! - Cached Riot records, one JSON file per record
//! - The analysis artifact consumed by the HTTP surface

mod analysis;
mod records;

pub use analysis::{read_report, write_report, AnalysisCache};
pub use records::{CachedRecord, RecordKind, RecordStore};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Distinguishes temp files of concurrent writers in one process.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }

    pub fn analysis_path(&self) -> PathBuf {
        self.data_dir.join("top_tier_analysis.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Write `contents` to `path` via a sibling temp file and rename, so readers
/// never observe a half-written file. Each call gets its own temp file;
/// concurrent writers of one path race only on the rename and the last one
/// wins.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(path.to_path_buf()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| StorageError::InvalidPath(path.to_path_buf()))?;

    tokio::fs::create_dir_all(parent).await?;

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp_path = parent.join(tmp_name);

    tokio::fs::write(&tmp_path, contents).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
