// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Scheduler (C4): round-robin over jobs ordered by `(-priority,
//! creationOrder)`, delegating task selection to each job's [`TaskRegistry`]
//! (§4.3).

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use dcp_core::{CoreError, CoreResult, JobId, TaskId, TaskIdSequence};
use parking_lot::Mutex;

use crate::registry::TaskRegistry;

/// Ordered ahead of lower-priority / later-created jobs. `Reverse(priority)`
/// makes the `BTreeSet`'s natural ascending order equal to "highest priority
/// first"; `creation_order` breaks ties FIFO (§4.3 "earlier creationOrder
/// wins").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey {
    neg_priority: Reverse<i32>,
    creation_order: u64,
    job_id: JobId,
}

struct JobEntry {
    priority: i32,
    creation_order: u64,
    registry: TaskRegistry,
    task_ids: TaskIdSequence,
}

#[derive(Default)]
struct Inner {
    order: BTreeSet<OrderKey>,
    jobs: HashMap<JobId, JobEntry>,
    next_creation_order: u64,
}

impl Inner {
    fn order_key(&self, job_id: JobId) -> Option<OrderKey> {
        let entry = self.jobs.get(&job_id)?;
        Some(OrderKey { neg_priority: Reverse(entry.priority), creation_order: entry.creation_order, job_id })
    }
}

/// A task pulled off the scheduler, paired with the job it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub payload: Vec<u8>,
}

/// The full scheduler (C4), internally single-mutex-guarded per §5's
/// "single mutex per scheduler" shared-resource policy.
#[derive(Default)]
pub struct TaskScheduler {
    inner: Mutex<Inner>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new job with the scheduler at the given priority. Must be
    /// called once, by the job manager, before any `add`/`remove` for that
    /// job id.
    pub fn register_job(&self, job_id: JobId, priority: i32) {
        let mut inner = self.inner.lock();
        if inner.jobs.contains_key(&job_id) {
            return;
        }
        let creation_order = inner.next_creation_order;
        inner.next_creation_order += 1;
        inner.jobs.insert(
            job_id,
            JobEntry { priority, creation_order, registry: TaskRegistry::new(), task_ids: TaskIdSequence::new() },
        );
        inner.order.insert(OrderKey { neg_priority: Reverse(priority), creation_order, job_id });
    }

    /// `add(jobId, payload) -> taskId` (§4.3).
    pub fn add(&self, job_id: JobId, payload: Vec<u8>) -> CoreResult<TaskId> {
        let mut inner = self.inner.lock();
        let key = inner
            .order_key(job_id)
            .ok_or_else(|| CoreError::IllegalArgument(format!("unknown job {job_id}")))?;
        let Some(entry) = inner.jobs.get_mut(&job_id) else {
            return Err(CoreError::IllegalArgument(format!("unknown job {job_id}")));
        };
        let task_id = entry.task_ids.next_id();
        entry.registry.add_task(task_id, payload);

        // A job popped from the heap (emptied, then refilled by `add`) needs
        // its order key reinserted (§4.3 "Popped jobs ... removed from the
        // heap until refilled by add"); re-inserting an already-present key
        // is a no-op.
        inner.order.insert(key);
        Ok(task_id)
    }

    /// `remove(jobId, taskId) -> payload?` (§4.3).
    pub fn remove(&self, job_id: JobId, task_id: TaskId) -> Option<Vec<u8>> {
        let mut inner = self.inner.lock();
        let entry = inner.jobs.get_mut(&job_id)?;
        entry.registry.remove_task(task_id).map(|record| record.payload)
    }

    /// `setPriority(jobId, priority)` (§4.3).
    pub fn set_priority(&self, job_id: JobId, priority: i32) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        let old_key = inner.order_key(job_id);
        let Some(entry) = inner.jobs.get_mut(&job_id) else {
            return Err(CoreError::IllegalArgument(format!("unknown job {job_id}")));
        };
        let was_present_in_heap = old_key.is_some_and(|k| inner.order.contains(&k));
        entry.priority = priority;
        if let Some(old_key) = old_key {
            if was_present_in_heap {
                inner.order.remove(&old_key);
                inner.order.insert(OrderKey { neg_priority: Reverse(priority), ..old_key });
            }
        }
        Ok(())
    }

    /// `removeJob(jobId)` (§4.3): drops the job and every outstanding task it
    /// held from the scheduler's bookkeeping.
    pub fn remove_job(&self, job_id: JobId) {
        let mut inner = self.inner.lock();
        if let Some(key) = inner.order_key(job_id) {
            inner.order.remove(&key);
        }
        inner.jobs.remove(&job_id);
    }

    pub fn outstanding_count(&self, job_id: JobId) -> usize {
        self.inner.lock().jobs.get(&job_id).map(|e| e.registry.len()).unwrap_or(0)
    }

    /// True if `(jobId, taskId)` is still outstanding (not yet completed or
    /// cancelled). Used by `getFinishedTasks` (§4.7): a task not found here
    /// is reported as finished.
    pub fn contains(&self, job_id: JobId, task_id: TaskId) -> bool {
        self.inner.lock().jobs.get(&job_id).is_some_and(|e| e.registry.contains(task_id))
    }

    /// `nextTask() -> TaskDescription | ⊥` (§4.3). Scans from the top of the
    /// heap: advances each candidate job's round-robin cursor; a job that
    /// yields nothing is popped (its tasks are exhausted) and scanning
    /// continues to the next job.
    pub fn next_task(&self) -> Option<ScheduledTask> {
        let mut inner = self.inner.lock();
        loop {
            let key = *inner.order.iter().next()?;
            let Some(entry) = inner.jobs.get_mut(&key.job_id) else {
                // `order` and `jobs` are kept in sync by every mutator; a
                // dangling key would be a bug elsewhere, not a valid state
                // to dispatch from.
                inner.order.remove(&key);
                continue;
            };
            match entry.registry.next_round_robin() {
                Some(task_id) => {
                    let Some(record) = entry.registry.get(task_id) else {
                        inner.order.remove(&key);
                        continue;
                    };
                    let payload = record.payload.clone();
                    entry.registry.mark_dispatched(task_id);
                    return Some(ScheduledTask { job_id: key.job_id, task_id, payload });
                }
                None => {
                    inner.order.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
