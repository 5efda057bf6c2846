//! Cached Riot records.
//!
//! Each record is a JSON file at `{root}/{kind}/{hash}.json`, where the hash
//! is derived from the record key. Freshness is decided by the caller, since
//! each kind has its own lifetime.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{write_atomic, StorageError};

/// Kind of cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Account,
    Summoner,
    LeagueEntry,
    Masteries,
    Match,
}

impl RecordKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            RecordKind::Account => "accounts",
            RecordKind::Summoner => "summoners",
            RecordKind::LeagueEntry => "league_entries",
            RecordKind::Masteries => "masteries",
            RecordKind::Match => "matches",
        }
    }
}

/// A stored value and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRecord<T> {
    pub key: String,
    pub fetched_at: DateTime<Utc>,
    pub value: T,
}

impl<T> CachedRecord<T> {
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.fetched_at)
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age().num_milliseconds() < ttl.as_millis() as i64
    }
}

/// File-backed record store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read a record. A missing file is `None`; so is an unreadable one,
    /// which is logged and then treated as a cache miss.
    pub async fn get<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        key: &str,
    ) -> Result<Option<CachedRecord<T>>, StorageError> {
        let path = self.path_for(kind, key);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<CachedRecord<T>>(&contents) {
            Ok(record) if record.key == key => Ok(Some(record)),
            Ok(record) => {
                warn!(kind = kind.dir_name(), key, stored = %record.key, "Record key collision");
                Ok(None)
            }
            Err(e) => {
                warn!(kind = kind.dir_name(), key, error = %e, "Discarding unreadable record");
                Ok(None)
            }
        }
    }

    /// Insert or replace a record, stamped with the current time.
    pub async fn upsert<T: Serialize>(
        &self,
        kind: RecordKind,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let record = CachedRecord {
            key: key.to_string(),
            fetched_at: Utc::now(),
            value,
        };
        let json = serde_json::to_vec(&record)?;
        write_atomic(&self.path_for(kind, key), &json).await?;
        debug!(kind = kind.dir_name(), key, "Record stored");
        Ok(())
    }

    fn path_for(&self, kind: RecordKind, key: &str) -> PathBuf {
        self.root
            .join(kind.dir_name())
            .join(format!("{}.json", key_hash(key)))
    }
}

/// Hash a record key to a short file-safe string.
fn key_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
