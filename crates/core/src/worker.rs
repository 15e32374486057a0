// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identifier and per-worker state (§3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one worker routine within a worker host's pool. Assigned
/// sequentially starting at zero as the pool grows (§4.6 compares a
/// worker's id against `maxWorkers` to decide whether it should terminate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Per-worker lifecycle state (§3 Lifecycle).
///
/// Idle (no task) → Waiting (task requested, awaiting response) → Running
/// (executing task) → back to Idle on submission or cancellation. A
/// cancellation signal is sticky until the worker returns to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Idle,
    Waiting,
    Running,
    Cancelling,
}

crate::simple_display! {
    WorkerState {
        Idle => "idle",
        Waiting => "waiting",
        Running => "running",
        Cancelling => "cancelling",
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
