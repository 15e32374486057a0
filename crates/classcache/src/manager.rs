// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Code Cache (C1) and Versioned Class Manager (C2): a content-addressed
//! store of class definitions with per-job snapshot isolation (§4.1).

use std::collections::{HashMap, VecDeque};

use dcp_core::{ClassEntry, Digest};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::store::{CacheStore, PersistedState};

/// Opaque handle returned by [`ClassManager::create_snapshot`]. Internally
/// just the snapshot's creation index; `Copy` so callers can hold it freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotHandle(u64);

#[derive(Debug, Clone, Default)]
struct SnapshotRecord {
    /// name -> digest captured at creation time.
    captured: HashMap<String, Digest>,
    /// Per-snapshot overrides installed via `set_for_snapshot`, shadowing
    /// `captured` for the same name.
    overrides: HashMap<String, Digest>,
}

/// Refcounted entry no longer the current version for its name, but still
/// referenced by at least one live snapshot.
#[derive(Debug, Clone, Copy)]
struct Deprecated {
    refcount: u64,
}

#[derive(Debug, Default)]
struct State {
    /// All definitions ever stored, keyed by (name, digest). Pruned only via
    /// the pending-deletion path below.
    entries: HashMap<(String, Digest), ClassEntry>,
    /// Current digest for each name.
    current: HashMap<String, Digest>,
    /// (name, digest) pairs that have been superseded by a newer `put` but
    /// are still referenced by a live snapshot.
    deprecated: HashMap<(String, Digest), Deprecated>,
    /// Live snapshots by handle.
    snapshots: HashMap<SnapshotHandle, SnapshotRecord>,
    next_snapshot_index: u64,
    /// Entries whose refcount has dropped to zero and await physical removal.
    /// Drained synchronously at the end of every mutating operation; kept as
    /// an explicit queue (rather than deleting inline) so a future backing
    /// store can batch physical deletes.
    pending_deletions: VecDeque<(String, Digest)>,
}

impl State {
    fn drain_pending_deletions(&mut self) {
        while let Some(key) = self.pending_deletions.pop_front() {
            // A name can be re-deprecated before the queue drains; only
            // delete if it is still at refcount zero and not current.
            if self.deprecated.get(&key).is_some_and(|d| d.refcount == 0)
                && self.current.get(&key.0) != Some(&key.1)
            {
                self.deprecated.remove(&key);
                self.entries.remove(&key);
            }
        }
    }

    fn release_reference(&mut self, name: &str, digest: Digest) {
        let key = (name.to_string(), digest);
        if let Some(dep) = self.deprecated.get_mut(&key) {
            dep.refcount = dep.refcount.saturating_sub(1);
            if dep.refcount == 0 {
                self.pending_deletions.push_back(key);
            }
        }
    }

    fn to_persisted(&self) -> PersistedState {
        PersistedState {
            entries: self.entries.values().cloned().collect(),
            current: self.current.clone(),
            deprecated: self
                .deprecated
                .iter()
                .map(|((name, digest), dep)| (name.clone(), *digest, dep.refcount))
                .collect(),
            next_snapshot_index: self.next_snapshot_index,
        }
    }

    fn from_persisted(p: PersistedState) -> Self {
        let mut entries = HashMap::new();
        for entry in p.entries {
            entries.insert((entry.name.clone(), entry.digest), entry);
        }
        let deprecated = p
            .deprecated
            .into_iter()
            .map(|(name, digest, refcount)| ((name, digest), Deprecated { refcount }))
            .collect();
        State {
            entries,
            current: p.current,
            deprecated,
            snapshots: HashMap::new(),
            next_snapshot_index: p.next_snapshot_index,
            pending_deletions: VecDeque::new(),
        }
    }
}

/// Content-addressed, snapshot-isolated class cache (C1 + C2).
///
/// Live snapshots are intentionally NOT part of the durable state: a
/// snapshot only makes sense while its owning job is live, and a job does
/// not survive a server restart (§1 Non-goals: no persistent job recovery).
pub struct ClassManager<S: CacheStore> {
    state: Mutex<State>,
    store: S,
}

impl<S: CacheStore> ClassManager<S> {
    pub fn new(store: S) -> Self {
        let state = store.load().map(State::from_persisted).unwrap_or_default();
        Self { state: Mutex::new(state), store }
    }

    /// `put(name, bytes) -> digest` (§4.1).
    pub fn put(&self, name: &str, definition: Vec<u8>) -> Digest {
        let entry = ClassEntry::new(name, definition);
        let digest = entry.digest;
        let mut state = self.state.lock();

        if let Some(old_digest) = state.current.get(name).copied() {
            if old_digest != digest {
                // The old entry is no longer current. It survives only if a
                // live snapshot already captured or overrode it.
                let refcount = state
                    .snapshots
                    .values()
                    .filter(|s| {
                        s.captured.get(name) == Some(&old_digest)
                            || s.overrides.get(name) == Some(&old_digest)
                    })
                    .count() as u64;
                if refcount > 0 {
                    state.deprecated.insert((name.to_string(), old_digest), Deprecated { refcount });
                } else {
                    state.entries.remove(&(name.to_string(), old_digest));
                }
            }
        }

        state.entries.insert((name.to_string(), digest), entry.clone());
        state.current.insert(name.to_string(), digest);
        state.drain_pending_deletions();
        self.persist(&state);
        digest
    }

    pub fn get_current_digest(&self, name: &str) -> Option<Digest> {
        self.state.lock().current.get(name).copied()
    }

    pub fn get_definition(&self, name: &str, digest: Digest) -> Option<Vec<u8>> {
        self.state.lock().entries.get(&(name.to_string(), digest)).map(|e| e.definition.clone())
    }

    /// `createSnapshot() -> SnapshotHandle` (§4.1).
    pub fn create_snapshot(&self) -> SnapshotHandle {
        let mut state = self.state.lock();
        let index = state.next_snapshot_index;
        state.next_snapshot_index += 1;
        let handle = SnapshotHandle(index);

        let captured = state.current.clone();
        for (name, digest) in &captured {
            if let Some(dep) = state.deprecated.get_mut(&(name.clone(), *digest)) {
                dep.refcount += 1;
            }
        }
        state.snapshots.insert(handle, SnapshotRecord { captured, overrides: HashMap::new() });
        self.persist(&state);
        handle
    }

    /// `releaseSnapshot(handle)` (§4.1). Idempotent: releasing an unknown or
    /// already-released handle is a no-op.
    pub fn release_snapshot(&self, handle: SnapshotHandle) {
        let mut state = self.state.lock();
        let Some(record) = state.snapshots.remove(&handle) else { return };
        for (name, digest) in record.captured.iter().chain(record.overrides.iter()) {
            state.release_reference(name, *digest);
        }
        state.drain_pending_deletions();
        self.persist(&state);
    }

    /// `getDigest(name)` scoped to `handle`: the entry current when the
    /// snapshot was created, unless overridden for this snapshot (§4.1).
    pub fn get_digest_in_snapshot(&self, handle: SnapshotHandle, name: &str) -> Option<Digest> {
        let state = self.state.lock();
        let record = state.snapshots.get(&handle)?;
        record.overrides.get(name).or_else(|| record.captured.get(name)).copied()
    }

    pub fn get_definition_in_snapshot(&self, handle: SnapshotHandle, name: &str) -> Option<Vec<u8>> {
        let digest = self.get_digest_in_snapshot(handle, name)?;
        self.get_definition(name, digest)
    }

    /// `setForSnapshot(handle, name, bytes)`: per-snapshot override that
    /// shadows the parent entry without touching global `current` state.
    pub fn set_for_snapshot(&self, handle: SnapshotHandle, name: &str, definition: Vec<u8>) -> Option<Digest> {
        let entry = ClassEntry::new(name, definition);
        let digest = entry.digest;
        let mut state = self.state.lock();
        let Some(record) = state.snapshots.get_mut(&handle) else {
            return None;
        };
        let previous_override = record.overrides.insert(name.to_string(), digest);
        state.entries.insert((name.to_string(), digest), entry);

        state.deprecated.entry((name.to_string(), digest)).or_insert(Deprecated { refcount: 0 }).refcount += 1;
        if let Some(prev) = previous_override {
            if prev != digest {
                state.release_reference(name, prev);
            }
        }
        state.drain_pending_deletions();
        self.persist(&state);
        Some(digest)
    }

    /// Number of entries physically retained; exposed for tests asserting
    /// deprecation cleanup (scenario 6).
    pub fn entry_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn persist(&self, state: &State) {
        if let Err(err) = self.store.save(&state.to_persisted()) {
            tracing::warn!(%err, "class cache: failed to persist snapshot of state");
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
