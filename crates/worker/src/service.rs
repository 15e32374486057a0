// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The subset of the wire surface a worker host calls against a server or
//! hub (§4.6, §4.7). Abstracted behind a trait so the pool and poller can be
//! driven by an in-memory fake in tests without a real connection.

use async_trait::async_trait;
use dcp_core::{CoreResult, JobId, TaskDescription, TaskId};

/// Remote operations a worker host needs. Implemented over the wire by
/// [`crate::remote::RemoteWorkerService`]; implemented directly by test
/// fakes.
#[async_trait]
pub trait WorkerService: Send + Sync {
    /// `requestTask()` (§4.6). A reply whose task carries no jobId is an
    /// idle directive.
    async fn request_task(&self) -> CoreResult<TaskDescription>;

    /// Resolves the task-worker routine bytes for a job, so the host can
    /// build a [`crate::plugin::TaskPlugin`] from them (§4.6 "task-worker
    /// resolution").
    async fn get_task_worker(&self, job_id: JobId) -> CoreResult<Option<Vec<u8>>>;

    async fn submit_task_results(&self, job_id: JobId, task_id: TaskId, payload: Vec<u8>) -> CoreResult<()>;

    async fn report_exception(&self, job_id: JobId, task_id: TaskId, message: String) -> CoreResult<()>;

    /// `getFinishedTasks` (§4.7): bitset aligned to the input arrays.
    async fn get_finished_tasks(&self, job_ids: &[JobId], task_ids: &[TaskId]) -> CoreResult<Vec<bool>>;
}
