// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobStatus event bus (§4.4 "Progress publication"): every state or
//! progress change is published with a fresh, strictly-increasing
//! `eventId` (I4); `waitForStatusChange` blocks until something newer than
//! the caller's `lastEventId` appears, or the timeout expires.

use std::collections::HashMap;
use std::time::Duration;

use dcp_core::{EventId, JobId, JobState, JobStatus, Progress};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

struct BusState {
    next_event_id: EventId,
    latest: Option<JobStatus>,
    per_job: HashMap<JobId, JobStatus>,
}

/// Single-process pub/sub for [`JobStatus`]. One instance per server (or
/// hub) process; not itself durable — a restart loses history, matching
/// §1's "no persistent job recovery" non-goal.
pub struct EventBus {
    state: Mutex<BusState>,
    notify: Notify,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { state: Mutex::new(BusState { next_event_id: 1, latest: None, per_job: HashMap::new() }), notify: Notify::new() }
    }

    /// Publishes a new status for `job_id`, assigning it the next
    /// monotonic `eventId` (I4), and wakes every waiter so it can
    /// re-check its own condition.
    pub fn publish(
        &self,
        job_id: JobId,
        description: String,
        state: JobState,
        progress: Progress,
        status: String,
    ) -> JobStatus {
        let event = {
            let mut bus = self.state.lock();
            let event_id = bus.next_event_id;
            bus.next_event_id += 1;
            let event = JobStatus { job_id, description, state, progress, status, event_id };
            bus.latest = Some(event.clone());
            bus.per_job.insert(job_id, event.clone());
            event
        };
        self.notify.notify_waiters();
        event
    }

    pub fn latest_for(&self, job_id: JobId) -> Option<JobStatus> {
        self.state.lock().per_job.get(&job_id).cloned()
    }

    /// `waitForStatusChange(lastEventId, timeoutMs)` (§4.4), scoped to the
    /// single most-recently-published status across every job.
    pub async fn wait_for_change(&self, since_event_id: EventId, timeout: Duration) -> Option<JobStatus> {
        self.wait_inner(since_event_id, timeout, |bus| bus.latest.clone()).await
    }

    /// `waitForStatusChangeForJob`: the same contract, scoped to one job.
    pub async fn wait_for_job_change(
        &self,
        job_id: JobId,
        since_event_id: EventId,
        timeout: Duration,
    ) -> Option<JobStatus> {
        self.wait_inner(since_event_id, timeout, move |bus| bus.per_job.get(&job_id).cloned()).await
    }

    async fn wait_inner(
        &self,
        since_event_id: EventId,
        timeout: Duration,
        latest_fn: impl Fn(&BusState) -> Option<JobStatus>,
    ) -> Option<JobStatus> {
        let deadline = Instant::now() + timeout;
        loop {
            // Constructed before inspecting state, so a publish racing with
            // this check still wakes us (tokio::sync::Notify's documented
            // race-free pattern).
            let notified = self.notify.notified();
            tokio::pin!(notified);

            let current = latest_fn(&self.state.lock());
            if let Some(event) = &current {
                if event.event_id > since_event_id {
                    return current;
                }
            }

            tokio::select! {
                _ = &mut notified => continue,
                _ = tokio::time::sleep_until(deadline) => return current,
            }
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
