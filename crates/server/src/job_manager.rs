// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Manager (C5, §4.4): owns every [`Job`]'s lifecycle, drives its
//! production pump, and bridges result submission / exception reporting
//! between the wire surface and the Task Scheduler (C4) and Class Manager
//! (C2).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dcp_classcache::{CacheStore, ClassManager, SnapshotHandle};
use dcp_core::{
    CoreError, CoreResult, Job, JobId, JobState, Progress, ServerConfig, TaskDescription, TaskId,
};
use dcp_scheduler::TaskScheduler;
use parking_lot::Mutex;

use crate::event_bus::EventBus;
use crate::program::{JobProgram, ProgressSink};

struct JobEntry {
    job: Job,
    program: Option<Arc<dyn JobProgram>>,
    /// Raw bytes the client submitted, returned verbatim by `getTaskWorker`
    /// so a worker host can build its own `TaskPlugin` from them.
    program_payload: Option<Vec<u8>>,
    snapshot: Option<SnapshotHandle>,
    in_flight: usize,
    consecutive_exceptions: u32,
    progress: Arc<ProgressSink>,
}

/// The Job Manager (C5): single owner of every [`Job`]'s state, wired to
/// the scheduler, class cache, and event bus it shares with the rest of
/// the server.
///
/// `F` resolves the bytes a client submits with a job into a
/// [`JobProgram`] — the real platform this spec is distilled from
/// dynamically loads a class for this; that mechanism is out of scope
/// here (§1 Non-goals: no job-computation semantics), so resolution is
/// injected the same way `dcp_worker::PluginRegistry` injects its
/// `TaskPlugin` factory.
pub struct JobManager<S: CacheStore, F> {
    classes: Arc<ClassManager<S>>,
    scheduler: Arc<TaskScheduler>,
    events: Arc<EventBus>,
    program_factory: F,
    config: ServerConfig,
    jobs: Mutex<HashMap<JobId, JobEntry>>,
    next_creation_order: AtomicU64,
    idle_directive_secs: AtomicU64,
}

impl<S, F> JobManager<S, F>
where
    S: CacheStore,
    F: Fn(&[u8]) -> CoreResult<Arc<dyn JobProgram>> + Send + Sync,
{
    pub fn new(
        classes: Arc<ClassManager<S>>,
        scheduler: Arc<TaskScheduler>,
        events: Arc<EventBus>,
        program_factory: F,
        config: ServerConfig,
    ) -> Self {
        let idle_directive_secs = AtomicU64::new(config.idle_directive_secs);
        Self { classes, scheduler, events, program_factory, config, jobs: Mutex::new(HashMap::new()), next_creation_order: AtomicU64::new(0), idle_directive_secs }
    }

    /// `createJob(description) -> JobId` (§4.4): New, no program attached
    /// yet. Must be followed by `submit_job` before the scheduler will ever
    /// dispatch a task for it.
    pub fn create_job(&self, description: impl Into<String>) -> JobId {
        let job_id = JobId::new();
        let creation_order = self.next_creation_order.fetch_add(1, Ordering::SeqCst);
        let mut job = Job::new(job_id, description, creation_order);
        job.priority = self.config.default_priority;
        self.jobs.lock().insert(
            job_id,
            JobEntry {
                job,
                program: None,
                program_payload: None,
                snapshot: None,
                in_flight: 0,
                consecutive_exceptions: 0,
                progress: Arc::new(ProgressSink::default()),
            },
        );
        self.publish_status(job_id);
        job_id
    }

    /// `submit(jobId, payload)`: attaches the job object, captures a
    /// class-snapshot, transitions New -> Running, and starts the
    /// production pump (§4.4, §3 "class-snapshot ... captured at
    /// submission time").
    pub async fn submit_job(&self, job_id: JobId, payload: Vec<u8>) -> CoreResult<()> {
        let program = (self.program_factory)(&payload)?;
        {
            let mut jobs = self.jobs.lock();
            let Some(entry) = jobs.get_mut(&job_id) else {
                return Err(CoreError::IllegalArgument(format!("unknown job {job_id}")));
            };
            if entry.job.state != JobState::New {
                return Err(CoreError::IllegalArgument(format!("job {job_id} already submitted")));
            }
            entry.snapshot = Some(self.classes.create_snapshot());
            entry.job.mark_running();
            self.scheduler.register_job(job_id, entry.job.priority);
            entry.program_payload = Some(payload);
            entry.program = Some(program);
        }
        self.publish_status(job_id);
        self.pump(job_id).await;
        Ok(())
    }

    /// `SubmitJobWithDescription`: create then submit in one call.
    pub async fn create_and_submit(&self, description: impl Into<String>, payload: Vec<u8>) -> CoreResult<JobId> {
        let job_id = self.create_job(description);
        self.submit_job(job_id, payload).await?;
        Ok(job_id)
    }

    /// `cancelJob(jobId)` (§3 Lifecycle). Idempotent: cancelling an already
    /// terminal job is a no-op.
    pub fn cancel_job(&self, job_id: JobId) -> CoreResult<()> {
        let snapshot = {
            let mut jobs = self.jobs.lock();
            let Some(entry) = jobs.get_mut(&job_id) else {
                return Err(CoreError::IllegalArgument(format!("unknown job {job_id}")));
            };
            if entry.job.state.is_terminal() {
                return Ok(());
            }
            entry.job.mark_cancelled();
            entry.snapshot.take()
        };
        self.scheduler.remove_job(job_id);
        if let Some(handle) = snapshot {
            self.classes.release_snapshot(handle);
        }
        self.publish_status(job_id);
        Ok(())
    }

    /// `setPriority(jobId, priority)` (§4.3, forwarded through the
    /// scheduler).
    pub fn set_priority(&self, job_id: JobId, priority: i32) -> CoreResult<()> {
        {
            let mut jobs = self.jobs.lock();
            let Some(entry) = jobs.get_mut(&job_id) else {
                return Err(CoreError::IllegalArgument(format!("unknown job {job_id}")));
            };
            entry.job.priority = priority;
        }
        self.scheduler.set_priority(job_id, priority)?;
        self.publish_status(job_id);
        Ok(())
    }

    /// `SetIdleTime(seconds)` (§6): the duration told to a worker whose
    /// `requestTask()` finds nothing outstanding anywhere.
    pub fn set_idle_directive(&self, seconds: u64) {
        self.idle_directive_secs.store(seconds, Ordering::SeqCst);
    }

    /// `requestTask()` (§4.6, server side): pulls the next task off the
    /// scheduler, or an idle directive if nothing is ready.
    pub fn request_task(&self) -> TaskDescription {
        match self.scheduler.next_task() {
            // `in_flight` is tracked from production time (see `pump`), not
            // from dispatch time: a task sitting in the scheduler queue
            // already counts against the job's in-flight target.
            Some(scheduled) => TaskDescription::for_task(scheduled.job_id, scheduled.task_id, scheduled.payload),
            None => TaskDescription::idle(self.idle_directive_secs.load(Ordering::SeqCst)),
        }
    }

    /// `getTaskWorker(jobId)`: the raw bytes submitted with the job, so a
    /// worker host can resolve its own task-worker plugin from them.
    pub fn get_task_worker(&self, job_id: JobId) -> Option<Vec<u8>> {
        self.jobs.lock().get(&job_id).and_then(|e| e.program_payload.clone())
    }

    /// `submitTaskResults(jobId, taskId, bytes)` (§4.4). Unknown
    /// `(jobId, taskId)` is ignored — the idempotence §5 requires for
    /// duplicate completion of a re-dispatched task (I2).
    pub async fn submit_task_results(&self, job_id: JobId, task_id: TaskId, payload: Vec<u8>) -> CoreResult<()> {
        let Some(task_payload) = self.scheduler.remove(job_id, task_id) else {
            return Ok(());
        };

        let (program, progress) = {
            let mut jobs = self.jobs.lock();
            let Some(entry) = jobs.get_mut(&job_id) else { return Ok(()) };
            entry.in_flight = entry.in_flight.saturating_sub(1);
            let Some(program) = entry.program.clone() else { return Ok(()) };
            (program, entry.progress.clone())
        };

        let mut cancel = false;
        match program.submit_task_results(&task_payload, &payload, &progress).await {
            Ok(()) => {
                let mut jobs = self.jobs.lock();
                if let Some(entry) = jobs.get_mut(&job_id) {
                    entry.consecutive_exceptions = 0;
                    entry.job.progress = progress.current();
                }
            }
            Err(err) => {
                let mut jobs = self.jobs.lock();
                if let Some(entry) = jobs.get_mut(&job_id) {
                    entry.consecutive_exceptions += 1;
                    entry.job.status = format!("error: {err}");
                    // N = 0 (default) means "fail fast": the first
                    // exception already exceeds the allowance (§4.4).
                    cancel = entry.consecutive_exceptions > self.config.max_consecutive_exceptions;
                }
            }
        }

        self.publish_status(job_id);
        if cancel {
            self.cancel_job(job_id)?;
            return Ok(());
        }
        self.pump(job_id).await;
        Ok(())
    }

    /// `reportException(jobId, taskId, err)` (§4.4): removes the task so it
    /// can be re-dispatched and records the error, but does not itself
    /// transition the job.
    pub async fn report_exception(&self, job_id: JobId, task_id: TaskId, message: String) -> CoreResult<()> {
        self.scheduler.remove(job_id, task_id);
        {
            let mut jobs = self.jobs.lock();
            if let Some(entry) = jobs.get_mut(&job_id) {
                entry.in_flight = entry.in_flight.saturating_sub(1);
                entry.job.status = format!("error: {message}");
            }
        }
        self.publish_status(job_id);
        self.pump(job_id).await;
        Ok(())
    }

    /// `getFinishedTasks` (§4.7): a task absent from the scheduler (because
    /// it was submitted, reported as an exception, or its job is gone) is
    /// reported finished.
    pub fn get_finished_tasks(&self, job_ids: &[JobId], task_ids: &[TaskId]) -> CoreResult<Vec<bool>> {
        if job_ids.len() != task_ids.len() {
            return Err(CoreError::IllegalArgument("jobIds and taskIds must be the same length".into()));
        }
        Ok(job_ids.iter().zip(task_ids).map(|(job_id, task_id)| !self.scheduler.contains(*job_id, *task_id)).collect())
    }

    pub fn get_current_class_digest(&self, name: &str) -> Option<dcp_core::Digest> {
        self.classes.get_current_digest(name)
    }

    pub fn get_class_digest_for_job(&self, job_id: JobId, name: &str) -> Option<dcp_core::Digest> {
        let handle = self.jobs.lock().get(&job_id)?.snapshot?;
        self.classes.get_digest_in_snapshot(handle, name)
    }

    pub fn get_class_definition_for_job(&self, job_id: JobId, name: &str) -> Option<Vec<u8>> {
        let handle = self.jobs.lock().get(&job_id)?.snapshot?;
        self.classes.get_definition_in_snapshot(handle, name)
    }

    pub fn set_class_definition(&self, name: &str, payload: Vec<u8>) -> dcp_core::ClassEntry {
        let digest = self.classes.put(name, payload.clone());
        dcp_core::ClassEntry { name: name.to_string(), digest, definition: payload }
    }

    pub fn set_class_definition_for_job(&self, job_id: JobId, name: &str, payload: Vec<u8>) -> CoreResult<dcp_core::ClassEntry> {
        let handle = self.jobs.lock().get(&job_id).and_then(|e| e.snapshot).ok_or_else(|| {
            CoreError::IllegalArgument(format!("job {job_id} has no active snapshot"))
        })?;
        let digest = self.classes.set_for_snapshot(handle, name, payload.clone()).ok_or_else(|| {
            CoreError::IllegalArgument(format!("job {job_id} snapshot was released"))
        })?;
        Ok(dcp_core::ClassEntry { name: name.to_string(), digest, definition: payload })
    }

    pub fn job_status(&self, job_id: JobId) -> Option<dcp_core::JobStatus> {
        self.events.latest_for(job_id)
    }

    /// `waitForStatusChange(lastEventId, timeoutMs)` (§4.4), across every
    /// job on this server.
    pub async fn wait_for_status_change(
        &self,
        since_event_id: dcp_core::EventId,
        timeout: std::time::Duration,
    ) -> Option<dcp_core::JobStatus> {
        self.events.wait_for_change(since_event_id, timeout).await
    }

    /// `waitForStatusChangeForJob`: the same contract, scoped to one job.
    pub async fn wait_for_job_status_change(
        &self,
        job_id: JobId,
        since_event_id: dcp_core::EventId,
        timeout: std::time::Duration,
    ) -> Option<dcp_core::JobStatus> {
        self.events.wait_for_job_change(job_id, since_event_id, timeout).await
    }

    fn publish_status(&self, job_id: JobId) {
        let jobs = self.jobs.lock();
        let Some(entry) = jobs.get(&job_id) else { return };
        let (description, state, progress, status) =
            (entry.job.description.clone(), entry.job.state, entry.job.progress, entry.job.status.clone());
        drop(jobs);
        self.events.publish(job_id, description, state, progress, status);
    }

    /// The production pump (§4.4): keeps at most `in_flight_target` tasks
    /// outstanding for `job_id`, stalling or completing it as the job
    /// object's own production dries up.
    async fn pump(&self, job_id: JobId) {
        loop {
            let program = {
                let jobs = self.jobs.lock();
                let Some(entry) = jobs.get(&job_id) else { return };
                if entry.job.state.is_terminal() {
                    return;
                }
                if entry.in_flight >= self.config.in_flight_target {
                    return;
                }
                let Some(program) = entry.program.clone() else { return };
                program
            };

            match program.next_task().await {
                Ok(Some(payload)) => match self.scheduler.add(job_id, payload) {
                    Ok(_task_id) => {
                        let mut jobs = self.jobs.lock();
                        if let Some(entry) = jobs.get_mut(&job_id) {
                            entry.in_flight += 1;
                            if entry.job.state == JobState::Stalled {
                                entry.job.mark_running();
                            }
                        }
                        drop(jobs);
                        self.publish_status(job_id);
                    }
                    Err(err) => {
                        tracing::warn!(%job_id, %err, "job manager: scheduler rejected a produced task");
                        return;
                    }
                },
                Ok(None) => {
                    let (outstanding, complete) = {
                        let jobs = self.jobs.lock();
                        let Some(entry) = jobs.get(&job_id) else { return };
                        (entry.in_flight, entry.program.as_ref().is_some_and(|p| p.is_complete()))
                    };
                    if outstanding > 0 {
                        let mut jobs = self.jobs.lock();
                        if let Some(entry) = jobs.get_mut(&job_id) {
                            entry.job.mark_stalled();
                        }
                        drop(jobs);
                        self.publish_status(job_id);
                    } else if complete {
                        self.complete_job(job_id).await;
                    }
                    return;
                }
                Err(err) => {
                    tracing::warn!(%job_id, %err, "job manager: nextTask failed");
                    return;
                }
            }
        }
    }

    async fn complete_job(&self, job_id: JobId) {
        let (program, snapshot) = {
            let mut jobs = self.jobs.lock();
            let Some(entry) = jobs.get_mut(&job_id) else { return };
            entry.job.mark_complete();
            (entry.program.clone(), entry.snapshot.take())
        };
        if let Some(program) = program {
            program.finish().await;
        }
        self.scheduler.remove_job(job_id);
        if let Some(handle) = snapshot {
            self.classes.release_snapshot(handle);
        }
        self.publish_status(job_id);
    }
}

#[cfg(test)]
#[path = "job_manager_tests.rs"]
mod tests;
