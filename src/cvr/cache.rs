//! In-memory CVR record cache with checksummed JSON snapshots.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::format::Cvr;
use super::record::CvrRecord;
use crate::core::{AuditConfig, AuditorError, Freshness};

const SNAPSHOT_VERSION: u32 = 1;

/// On-disk form of the cache: the records as a JSON string plus the
/// SHA-256 of that string.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    data: String,
    checksum: String,
}

impl Snapshot {
    fn new(data: String) -> Self {
        let checksum = checksum(&data);
        Self {
            version: SNAPSHOT_VERSION,
            data,
            checksum,
        }
    }

    fn is_valid(&self) -> bool {
        checksum(&self.data) == self.checksum
    }
}

fn checksum(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Last known registry status per CVR number.
///
/// Shared between concurrent audits behind an `Arc`. Reads do not block
/// on writes to other keys, and each `put` replaces a whole record, so a
/// reader sees either the old record or the new one.
///
/// Stale records are kept: they serve as the fallback when the registry
/// cannot be reached. Once `capacity` records are held, the least recently
/// used one is evicted to admit a new lookup. Snapshots larger than the
/// capacity are refused by [`CvrCache::restore`].
pub struct CvrCache {
    records: Cache<Cvr, Arc<CvrRecord>>,
    freshness: Freshness,
}

impl std::fmt::Debug for CvrCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CvrCache")
            .field("entries", &self.records.entry_count())
            .field("freshness", &self.freshness)
            .finish()
    }
}

impl CvrCache {
    pub fn new(capacity: u64, freshness: Freshness) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            freshness,
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.cache_capacity, config.freshness)
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn capacity(&self) -> u64 {
        self.records.policy().max_capacity().unwrap_or(u64::MAX)
    }

    pub fn get(&self, cvr: &Cvr) -> Option<Arc<CvrRecord>> {
        self.records.get(cvr)
    }

    /// Store a record, replacing any previous record for the same number.
    pub fn put(&self, record: CvrRecord) {
        self.records.insert(record.cvr.clone(), Arc::new(record));
    }

    /// Whether `record` may be used at `now` without asking the registry.
    pub fn is_fresh(&self, record: &CvrRecord, now: DateTime<Utc>) -> bool {
        self.freshness.is_fresh(record.fetched_at, now)
    }

    pub fn len(&self) -> u64 {
        self.records.run_pending_tasks();
        self.records.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, ordered by CVR number.
    pub fn records(&self) -> Vec<CvrRecord> {
        let mut records: Vec<CvrRecord> = self
            .records
            .iter()
            .map(|(_, record)| CvrRecord::clone(&record))
            .collect();
        records.sort_by(|a, b| a.cvr.cmp(&b.cvr));
        records
    }

    /// Serialize all records into a checksummed snapshot.
    pub fn to_snapshot(&self) -> Result<String, AuditorError> {
        let data = serde_json::to_string(&self.records())
            .map_err(|e| AuditorError::CacheSnapshot(e.to_string()))?;
        serde_json::to_string_pretty(&Snapshot::new(data))
            .map_err(|e| AuditorError::CacheSnapshot(e.to_string()))
    }

    /// Insert every record from a snapshot, verifying its checksum first.
    /// Returns the number of records held afterwards.
    ///
    /// Nothing is inserted if the snapshot is invalid or holds more records
    /// than the cache capacity.
    pub fn restore(&self, snapshot: &str) -> Result<usize, AuditorError> {
        let snapshot: Snapshot = serde_json::from_str(snapshot)
            .map_err(|e| AuditorError::CacheSnapshot(format!("unreadable snapshot: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AuditorError::CacheSnapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if !snapshot.is_valid() {
            return Err(AuditorError::CacheSnapshot(format!(
                "checksum mismatch (expected {})",
                snapshot.checksum
            )));
        }
        let records: Vec<CvrRecord> = serde_json::from_str(&snapshot.data)
            .map_err(|e| AuditorError::CacheSnapshot(format!("invalid records: {e}")))?;

        if records.len() as u64 > self.capacity() {
            return Err(AuditorError::CacheSnapshot(format!(
                "snapshot holds {} records but cache capacity is {}",
                records.len(),
                self.capacity()
            )));
        }
        for record in records {
            self.put(record);
        }
        Ok(self.len() as usize)
    }

    /// Load a cache from a snapshot file. A missing file yields an empty cache.
    pub fn load(path: impl AsRef<Path>, config: &AuditConfig) -> Result<Self, AuditorError> {
        let path = path.as_ref();
        let cache = Self::from_config(config);
        if !path.exists() {
            tracing::info!(path = %path.display(), "no CVR cache snapshot, starting empty");
            return Ok(cache);
        }
        let text = std::fs::read_to_string(path)?;
        let count = cache.restore(&text)?;
        tracing::info!(path = %path.display(), records = count, "loaded CVR cache snapshot");
        Ok(cache)
    }

    /// Write a snapshot file. The file is replaced atomically via rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AuditorError> {
        let path = path.as_ref();
        let snapshot = self.to_snapshot()?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, snapshot)?;
        std::fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), records = self.len(), "saved CVR cache snapshot");
        Ok(())
    }
}
