// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker Pool (C7, §4.6): a supervisor owning up to `max_workers` worker
//! routines, a cluster-idle election so only one worker polls the server
//! while every upstream is quiet, and cooperative cancellation driven by
//! the Completion Poller (C8).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dcp_core::{CoreError, JobId, TaskId, WorkerId};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::courtesy::CourtesyMonitor;
use crate::plugin::{PluginRegistry, TaskPlugin};
use crate::progress::ProgressMonitor;
use crate::service::WorkerService;

/// One worker's in-flight task, tracked so the Completion Poller can
/// request cancellation by (jobId, taskId) and the pool can report a
/// snapshot of outstanding work.
struct RunningTask {
    job_id: JobId,
    task_id: TaskId,
    monitor: Arc<ProgressMonitor>,
}

/// Cluster-idle election (§4.6): the first worker to see "no task" claims
/// the `polling` flag and sleeps the server-advised duration on behalf of
/// the whole pool; everyone else parks on `wake` until it broadcasts.
struct ClusterIdle {
    polling: AtomicBool,
    wake: Notify,
}

impl ClusterIdle {
    fn new() -> Self {
        Self { polling: AtomicBool::new(false), wake: Notify::new() }
    }

    /// Attempts to become the designated poller. Returns `true` if this
    /// call won the race.
    fn try_become_poller(&self) -> bool {
        self.polling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release_and_wake(&self) {
        self.polling.store(false, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    async fn wait_for_poller(&self) {
        self.wake.notified().await;
    }
}

struct Shared {
    max_workers: AtomicUsize,
    shutdown: AtomicBool,
    cluster_idle: ClusterIdle,
    running: Mutex<HashMap<WorkerId, RunningTask>>,
}

/// The worker host's pool of concurrent task-execution routines.
pub struct WorkerPool<F>
where
    F: Fn(&[u8]) -> Result<Arc<dyn TaskPlugin>, CoreError> + Send + Sync + 'static,
{
    service: Arc<dyn WorkerService>,
    plugins: Arc<PluginRegistry<F>>,
    courtesy: Arc<dyn CourtesyMonitor>,
    shared: Arc<Shared>,
    exception_idle: Duration,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<F> WorkerPool<F>
where
    F: Fn(&[u8]) -> Result<Arc<dyn TaskPlugin>, CoreError> + Send + Sync + 'static,
{
    pub fn new(
        max_workers: usize,
        service: Arc<dyn WorkerService>,
        plugins: Arc<PluginRegistry<F>>,
        courtesy: Arc<dyn CourtesyMonitor>,
        exception_idle: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            plugins,
            courtesy,
            shared: Arc::new(Shared {
                max_workers: AtomicUsize::new(max_workers),
                shutdown: AtomicBool::new(false),
                cluster_idle: ClusterIdle::new(),
                running: Mutex::new(HashMap::new()),
            }),
            exception_idle,
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Spawns one tokio task per worker slot `0..max_workers`.
    pub fn start(self: &Arc<Self>) {
        let n = self.shared.max_workers.load(Ordering::SeqCst);
        for id in 0..n {
            self.spawn_worker(WorkerId(id as u32));
        }
    }

    fn spawn_worker(self: &Arc<Self>, id: WorkerId) {
        let pool = self.clone();
        let handle = tokio::spawn(async move { pool.worker_loop(id).await });
        self.handles.lock().push(handle);
    }

    /// Grows or shrinks the pool at runtime. Growing spawns the new
    /// workers immediately; shrinking merely lowers the bound, and the
    /// excess workers self-terminate after their current task (§4.6).
    pub fn set_max_workers(self: &Arc<Self>, n: usize) {
        let previous = self.shared.max_workers.swap(n, Ordering::SeqCst);
        if n > previous {
            for id in previous..n {
                self.spawn_worker(WorkerId(id as u32));
            }
        }
    }

    pub fn max_workers(&self) -> usize {
        self.shared.max_workers.load(Ordering::SeqCst)
    }

    /// Sets the sticky cancel flag on the worker currently running
    /// `(job_id, task_id)`, if any. Returns whether a match was found.
    pub fn cancel(&self, job_id: JobId, task_id: TaskId) -> bool {
        let running = self.shared.running.lock();
        for task in running.values() {
            if task.job_id == job_id && task.task_id == task_id {
                task.monitor.set_cancel_pending();
                return true;
            }
        }
        false
    }

    /// Snapshot of every `(jobId, taskId)` currently held by a worker, for
    /// the Completion Poller (§4.7).
    pub fn outstanding(&self) -> Vec<(JobId, TaskId)> {
        self.shared.running.lock().values().map(|t| (t.job_id, t.task_id)).collect()
    }

    /// Signals every worker to stop at its next cooperative point and
    /// joins them.
    pub async fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.cluster_idle.release_and_wake();
        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            let _ = handle.await;
        }
    }

    fn is_shutting_down(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }

    async fn worker_loop(self: Arc<Self>, id: WorkerId) {
        loop {
            if self.is_shutting_down() || id.0 as usize >= self.max_workers() {
                tracing::debug!(%id, "worker terminating");
                return;
            }

            match self.service.request_task().await {
                Ok(task) if task.is_idle() => {
                    let seconds = task.idle_seconds().unwrap_or(1);
                    self.idle_round(seconds).await;
                }
                Ok(task) => match task.job_id {
                    Some(job_id) => self.run_task(id, job_id, task.task_id, task.payload).await,
                    None => unreachable!("is_idle() already covers the no-jobId case"),
                },
                Err(err) => {
                    tracing::warn!(%id, %err, "requestTask failed, backing off");
                    tokio::time::sleep(self.exception_idle).await;
                }
            }
        }
    }

    /// Cluster-idle protocol: one worker sleeps on the server's behalf,
    /// everyone else waits to be woken (§4.6).
    async fn idle_round(&self, seconds: u64) {
        if self.shared.cluster_idle.try_become_poller() {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            self.shared.cluster_idle.release_and_wake();
        } else {
            self.shared.cluster_idle.wait_for_poller().await;
        }
    }

    async fn run_task(self: &Arc<Self>, id: WorkerId, job_id: JobId, task_id: TaskId, payload: Vec<u8>) {
        let monitor = Arc::new(ProgressMonitor::new(self.courtesy.clone()));
        self.shared
            .running
            .lock()
            .insert(id, RunningTask { job_id, task_id, monitor: monitor.clone() });

        let plugin = match self.plugins.resolve(job_id, self.service.as_ref()).await {
            Ok(plugin) => plugin,
            Err(err) => {
                tracing::warn!(%job_id, %err, "task-worker resolution failed");
                if let CoreError::ClassNotFound(_) = err {
                    let _ = self.service.report_exception(job_id, task_id, err.to_string()).await;
                }
                self.shared.running.lock().remove(&id);
                tokio::time::sleep(self.exception_idle).await;
                return;
            }
        };

        let result = plugin.perform(&payload, &monitor).await;
        self.shared.running.lock().remove(&id);

        if monitor.cancel_pending() {
            tracing::debug!(%job_id, %task_id, "task cancelled, result dropped");
            return;
        }

        match result {
            Ok(bytes) => {
                if let Err(err) = self.service.submit_task_results(job_id, task_id, bytes).await {
                    tracing::warn!(%job_id, %task_id, %err, "submitTaskResults failed");
                }
            }
            Err(err) => {
                tracing::warn!(%job_id, %task_id, %err, "task execution failed");
                let _ = self.service.report_exception(job_id, task_id, err.to_string()).await;
                tokio::time::sleep(self.exception_idle).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
