//! Out-of-vocabulary bookkeeping.
//!
//! Every token the transcriber cannot pronounce is recorded here with an
//! occurrence count, so the most frequent failures (usually slang) can be
//! surfaced for manual rule authoring. Records are only ever added or
//! incremented.
//!
//! Backends:
//! - `InMemoryUnseen`: thread-safe map, the default.
//! - `RedbUnseen`: persistent counts in a `redb` database.
//! - `UnseenLog::Disabled`: a no-op for tests and hosts that opt out.
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Result;

/// A token that could not be transcribed and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnseenRecord {
    pub token: String,
    pub count: u64,
}

fn sorted_records(map: HashMap<String, u64>) -> Vec<UnseenRecord> {
    let mut out: Vec<UnseenRecord> = map
        .into_iter()
        .map(|(token, count)| UnseenRecord { token, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
    out
}

/// A thread-safe in-memory unseen-token table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUnseen {
    inner: Arc<RwLock<HashMap<String, u64>>>,
}

impl InMemoryUnseen {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Increment a token's miss count by `delta`.
    ///
    /// A poisoned lock is recovered rather than dropping the update: the
    /// map itself is always left consistent by `entry`.
    pub fn record_with_count(&self, token: &str, delta: u64) {
        if delta == 0 {
            return;
        }
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let entry = map.entry(token.to_string()).or_insert(0);
        *entry = entry.saturating_add(delta);
    }

    pub fn record(&self, token: &str) {
        self.record_with_count(token, 1);
    }

    pub fn count(&self, token: &str) -> u64 {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(token).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Redb-backed unseen-token table.
///
/// Each `record` is its own write transaction, so counts survive crashes at
/// the cost of throughput; the table is only written on transcription misses.
pub struct RedbUnseen {
    db: redb::Database,
    path: std::path::PathBuf,
}

impl std::fmt::Debug for RedbUnseen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbUnseen").field("path", &self.path).finish()
    }
}

impl RedbUnseen {
    const TABLE_DEF: redb::TableDefinition<'static, &'static str, u64> =
        redb::TableDefinition::new("unseen_tokens");

    /// Create or open a redb database at `path`.
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path.as_ref())?;
        // make sure the table exists so read transactions never fail on a fresh file
        let write_txn = db.begin_write()?;
        write_txn.open_table(Self::TABLE_DEF)?;
        write_txn.commit()?;
        Ok(RedbUnseen {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn record_with_count(&self, token: &str, delta: u64) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(Self::TABLE_DEF)?;
            let current = table.get(token)?.map(|v| v.value()).unwrap_or(0);
            table.insert(token, current.saturating_add(delta))?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn record(&self, token: &str) -> Result<()> {
        self.record_with_count(token, 1)
    }

    pub fn count(&self, token: &str) -> Result<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::TABLE_DEF)?;
        Ok(table.get(token)?.map(|v| v.value()).unwrap_or(0))
    }

    pub fn snapshot(&self) -> Result<HashMap<String, u64>> {
        let mut out = HashMap::new();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::TABLE_DEF)?;
        for item in table.iter()? {
            let (k, v) = item?;
            out.insert(k.value().to_string(), v.value());
        }
        Ok(out)
    }
}

/// Backend switch for unseen-token recording.
#[derive(Debug, Clone)]
pub enum UnseenLog {
    InMemory(InMemoryUnseen),
    Redb(Arc<RedbUnseen>),
    Disabled,
}

impl Default for UnseenLog {
    fn default() -> Self {
        UnseenLog::new_in_memory()
    }
}

impl UnseenLog {
    pub fn new_in_memory() -> Self {
        UnseenLog::InMemory(InMemoryUnseen::new())
    }

    /// Open (or create) a persistent log at `path`.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(UnseenLog::Redb(Arc::new(RedbUnseen::new(path)?)))
    }

    /// Record one failed transcription of `token`.
    pub fn record(&self, token: &str) {
        match self {
            UnseenLog::InMemory(m) => m.record(token),
            UnseenLog::Redb(r) => {
                if let Err(e) = r.record(token) {
                    tracing::warn!(token, error = %e, "failed to persist unseen token");
                }
            }
            UnseenLog::Disabled => {}
        }
    }

    pub fn count(&self, token: &str) -> u64 {
        match self {
            UnseenLog::InMemory(m) => m.count(token),
            UnseenLog::Redb(r) => r.count(token).unwrap_or(0),
            UnseenLog::Disabled => 0,
        }
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        match self {
            UnseenLog::InMemory(m) => m.snapshot(),
            UnseenLog::Redb(r) => r.snapshot().unwrap_or_default(),
            UnseenLog::Disabled => HashMap::new(),
        }
    }

    /// All records, most frequent first (ties by token).
    pub fn export(&self) -> Vec<UnseenRecord> {
        sorted_records(self.snapshot())
    }

    /// Add every count from `other` into this log.
    pub fn merge_from(&self, other: &UnseenLog) {
        for (token, count) in other.snapshot() {
            match self {
                UnseenLog::InMemory(m) => m.record_with_count(&token, count),
                UnseenLog::Redb(r) => {
                    if let Err(e) = r.record_with_count(&token, count) {
                        tracing::warn!(token = %token, error = %e, "failed to merge unseen token");
                    }
                }
                UnseenLog::Disabled => return,
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, UnseenLog::Disabled)
    }
}
