// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion Poller (C8, §4.7): the only server-polled interaction in
//! steady state. Periodically asks whether outstanding work has finished
//! elsewhere and cancels the corresponding local worker.

use std::sync::Arc;
use std::time::Duration;

use dcp_core::{CoreError, JobId, TaskId};

use crate::plugin::TaskPlugin;
use crate::pool::WorkerPool;
use crate::service::WorkerService;

/// Drives one polling loop for as long as it is awaited; intended to be
/// `tokio::spawn`ed alongside the [`WorkerPool`] it watches.
pub struct CompletionPoller<F>
where
    F: Fn(&[u8]) -> Result<Arc<dyn TaskPlugin>, CoreError> + Send + Sync + 'static,
{
    service: Arc<dyn WorkerService>,
    pool: Arc<WorkerPool<F>>,
    interval: Duration,
}

impl<F> CompletionPoller<F>
where
    F: Fn(&[u8]) -> Result<Arc<dyn TaskPlugin>, CoreError> + Send + Sync + 'static,
{
    pub fn new(service: Arc<dyn WorkerService>, pool: Arc<WorkerPool<F>>, interval: Duration) -> Self {
        Self { service, pool, interval }
    }

    /// Runs until `shutdown` resolves. On a transport failure, logs once
    /// and continues on the next tick rather than tearing anything down
    /// (§4.7: transient server unavailability must not cascade).
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
            }
            if *shutdown.borrow() {
                return;
            }
            self.tick().await;
        }
    }

    async fn tick(&self) {
        let outstanding = self.pool.outstanding();
        if outstanding.is_empty() {
            return;
        }
        let job_ids: Vec<JobId> = outstanding.iter().map(|(j, _)| *j).collect();
        let task_ids: Vec<TaskId> = outstanding.iter().map(|(_, t)| *t).collect();

        match self.service.get_finished_tasks(&job_ids, &task_ids).await {
            Ok(finished) => {
                for (idx, done) in finished.into_iter().enumerate() {
                    if done {
                        let (job_id, task_id) = outstanding[idx];
                        tracing::debug!(%job_id, %task_id, "completion poller: finished elsewhere, cancelling");
                        self.pool.cancel(job_id, task_id);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%err, "completion poller: getFinishedTasks failed, will retry next tick");
            }
        }
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
