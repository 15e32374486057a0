// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and state machine (§3).

use serde::{Deserialize, Serialize};

crate::define_uuid_id! {
    /// Unique identifier for a job instance (128-bit UUID, §3).
    pub struct JobId;
}

/// Job lifecycle state (§3 Lifecycle).
///
/// ```text
///       create             submit
///  ∅ ─────────▶ New ──────────────▶ Running ─┬─▶ Complete (terminal)
///                                  ▲         ├─▶ Stalled  (re-enterable)
///                                  └─────────┴─▶ Cancelled(terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    New,
    Running,
    Stalled,
    Complete,
    Cancelled,
}

impl JobState {
    /// Terminal states are absorbing; class-snapshot references are released
    /// on transition into one (§3 Lifecycle).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Complete | JobState::Cancelled)
    }
}

crate::simple_display! {
    JobState {
        New => "new",
        Running => "running",
        Stalled => "stalled",
        Complete => "complete",
        Cancelled => "cancelled",
    }
}

/// Progress is a fraction in `[0, 1]`, or indeterminate (§3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Indeterminate,
    Fraction(f64),
}

impl Progress {
    pub fn fraction(self) -> Option<f64> {
        match self {
            Progress::Indeterminate => None,
            Progress::Fraction(f) => Some(f),
        }
    }

    pub fn complete() -> Self {
        Progress::Fraction(1.0)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Progress::Indeterminate
    }
}

/// Server-resident job record (§3 Entities).
///
/// The class-snapshot handle and task registry are owned by the crates that
/// implement them (`dcp-classcache`, `dcp-scheduler`) and are threaded
/// through by the job manager rather than embedded here, keeping `dcp-core`
/// free of a dependency cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub description: String,
    pub priority: i32,
    pub state: JobState,
    pub progress: Progress,
    pub status: String,
    /// Monotonic submission order, used as the scheduler's FIFO tie-break
    /// (§4.3).
    pub creation_order: u64,
}

/// Default job priority (§3).
pub const DEFAULT_PRIORITY: i32 = 20;

impl Job {
    pub fn new(id: JobId, description: impl Into<String>, creation_order: u64) -> Self {
        Self {
            id,
            description: description.into(),
            priority: DEFAULT_PRIORITY,
            state: JobState::New,
            progress: Progress::Indeterminate,
            status: String::new(),
            creation_order,
        }
    }

    /// Transition to Running, capturing the class-snapshot happens in the
    /// caller (the job manager) which also releases it on transition into a
    /// terminal state (§3, I3).
    pub fn mark_running(&mut self) {
        self.state = JobState::Running;
    }

    pub fn mark_stalled(&mut self) {
        if self.state != JobState::Cancelled {
            self.state = JobState::Stalled;
        }
    }

    pub fn mark_complete(&mut self) {
        self.state = JobState::Complete;
        self.progress = Progress::complete();
    }

    pub fn mark_cancelled(&mut self) {
        self.state = JobState::Cancelled;
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobBuilder => Job {
        into {
            description: String = "test-job",
            status: String = "",
        }
        set {
            priority: i32 = DEFAULT_PRIORITY,
            state: JobState = JobState::New,
            progress: Progress = Progress::Indeterminate,
            creation_order: u64 = 0,
        }
        computed {
            id: JobId = JobId::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
