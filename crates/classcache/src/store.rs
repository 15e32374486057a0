// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable backing for the class cache (§4.1 Storage).
//!
//! A persistable implementation MUST support at least `(name, digest) ->
//! bytes` and a table of live-snapshot indices. Live snapshots themselves
//! are deliberately NOT persisted here (§1 Non-goals: no persistent job
//! recovery across server restarts) — only the content-addressed entries
//! and deprecation refcounts survive a restart.

use std::io::Write;
use std::path::PathBuf;

use dcp_core::{ClassEntry, Digest};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Serializable projection of [`crate::manager::ClassManager`]'s state.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PersistedState {
    pub entries: Vec<ClassEntry>,
    pub current: std::collections::HashMap<String, Digest>,
    /// (name, digest, refcount) triples for deprecated-but-referenced entries.
    pub deprecated: Vec<(String, Digest, u64)>,
    pub next_snapshot_index: u64,
}

/// Backing store for a [`crate::manager::ClassManager`].
pub trait CacheStore {
    fn load(&self) -> Option<PersistedState>;
    fn save(&self, state: &PersistedState) -> Result<(), StoreError>;
}

/// Keeps nothing; every restart starts from an empty cache. Used in tests
/// and by any deployment that accepts losing the class cache on restart.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryCacheStore;

impl CacheStore for InMemoryCacheStore {
    fn load(&self) -> Option<PersistedState> {
        None
    }

    fn save(&self, _state: &PersistedState) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Persists the whole cache state to a single zstd-compressed JSON file on
/// every mutation. Simple rather than incremental: the class cache is
/// expected to be small relative to job/task churn, so a full rewrite per
/// mutation is an acceptable trade against a WAL's complexity.
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Option<PersistedState> {
        let compressed = std::fs::read(&self.path).ok()?;
        let json = zstd::decode_all(compressed.as_slice())
            .map_err(|err| tracing::warn!(%err, path = %self.path.display(), "class cache: decompress failed"))
            .ok()?;
        serde_json::from_slice(&json)
            .map_err(|err| tracing::warn!(%err, path = %self.path.display(), "class cache: corrupt state file"))
            .ok()
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let json = serde_json::to_vec(state)?;
        let compressed = zstd::encode_all(json.as_slice(), 0).map_err(|e| StoreError::Compression(e.to_string()))?;
        let tmp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(&compressed)?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
