// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The user-supplied job object (§3, §4.4): the server-side counterpart to
//! a worker host's [task-worker plugin](../dcp_worker/trait.TaskPlugin.html)
//! — resolved once per job from the bytes the client submitted, then driven
//! by the production pump until it reports completion.

use async_trait::async_trait;
use dcp_core::{CoreResult, Progress};
use parking_lot::Mutex;

/// A job's own task-production and result-handling logic.
///
/// `next_task`/`is_complete`/`submit_task_results` mirror §4.4's
/// task-production loop and result-submission contract exactly;
/// `finish` runs once, when the job reaches Complete.
#[async_trait]
pub trait JobProgram: Send + Sync {
    /// Produces the next task payload to dispatch, or `None` if the job has
    /// no task ready right now (may still have more later — this is what
    /// drives a Stalled transition, not necessarily Complete).
    async fn next_task(&self) -> CoreResult<Option<Vec<u8>>>;

    /// True once this job object considers its own work done. Only
    /// consulted when zero tasks are outstanding (I5).
    fn is_complete(&self) -> bool;

    /// Applies one task's results, updating progress via `progress`.
    async fn submit_task_results(
        &self,
        task_payload: &[u8],
        result_payload: &[u8],
        progress: &ProgressSink,
    ) -> CoreResult<()>;

    /// Runs once on transition into Complete. Default no-op.
    async fn finish(&self) {}
}

/// The callback a [`JobProgram`] reports progress through during
/// `submit_task_results` (§4.4 "the job object updates progress via the
/// callback").
#[derive(Default)]
pub struct ProgressSink {
    current: Mutex<Progress>,
}

impl ProgressSink {
    pub fn report(&self, progress: Progress) {
        *self.current.lock() = progress;
    }

    pub fn current(&self) -> Progress {
        *self.current.lock()
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
