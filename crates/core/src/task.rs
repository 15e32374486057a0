// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task descriptions and records (§3).

use crate::job::JobId;
use crate::id::TaskId;
use serde::{Deserialize, Serialize};

/// A task handed to a worker in response to `requestTask` (§3, §6).
///
/// A `TaskDescription` with `job_id = None` is an **idle directive**: its
/// payload encodes the number of seconds the worker should sleep (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescription {
    pub job_id: Option<JobId>,
    pub task_id: TaskId,
    pub payload: Vec<u8>,
}

impl TaskDescription {
    pub fn for_task(job_id: JobId, task_id: TaskId, payload: Vec<u8>) -> Self {
        Self {
            job_id: Some(job_id),
            task_id,
            payload,
        }
    }

    /// Build an idle directive telling the worker to sleep `seconds`.
    pub fn idle(seconds: u64) -> Self {
        Self {
            job_id: None,
            task_id: TaskId::WILDCARD,
            payload: seconds.to_le_bytes().to_vec(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.job_id.is_none()
    }

    /// Decode the idle-directive sleep duration. Returns `None` if this is
    /// not an idle directive or the payload isn't a valid encoded `u64`.
    pub fn idle_seconds(&self) -> Option<u64> {
        if !self.is_idle() {
            return None;
        }
        let bytes: [u8; 8] = self.payload.as_slice().try_into().ok()?;
        Some(u64::from_le_bytes(bytes))
    }
}

/// Server-side bookkeeping for a dispatched-or-pending task (§3).
///
/// Removed when results arrive or on cancellation (I1: every `TaskRecord`
/// held by the scheduler implies a live Running job).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub payload: Vec<u8>,
    pub dispatched: bool,
}

impl TaskRecord {
    pub fn new(task_id: TaskId, payload: Vec<u8>) -> Self {
        Self {
            task_id,
            payload,
            dispatched: false,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
