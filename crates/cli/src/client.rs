// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrapper over [`dcp_proxy::ReconnectingServiceProxy`] exposing the
//! §6 service operations this CLI drives. Built the same way
//! `dcp_worker::RemoteWorkerService` drives its own slice of the wire: one
//! `proxy.invoke` per call, matching the expected [`Response`] variant and
//! converting anything else into a [`CoreError`] (§7 Propagation).

use dcp_core::{CoreError, CoreResult, Digest, EventId, JobId, JobStatus, TaskId};
use dcp_proxy::{wire_error, ReconnectingServiceProxy, TcpConnector};
use dcp_wire::{Request, Response};

pub struct DcpClient {
    proxy: ReconnectingServiceProxy<TcpConnector>,
}

fn unexpected(response: Response) -> CoreError {
    CoreError::Transport(format!("unexpected response: {response:?}"))
}

impl DcpClient {
    pub fn new(addr: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        let connector = TcpConnector::new(addr, user, password);
        Self { proxy: ReconnectingServiceProxy::new(connector) }
    }

    async fn call(&self, request: Request) -> CoreResult<Response> {
        self.proxy.invoke(move |h| {
            let request = request.clone();
            async move { h.call(&request).await }
        }).await
    }

    pub async fn create_job(&self, description: impl Into<String>) -> CoreResult<JobId> {
        match self.call(Request::CreateJob { description: description.into() }).await? {
            Response::JobCreated { job_id } => Ok(job_id),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn submit_job_with_description(
        &self,
        payload: Vec<u8>,
        description: impl Into<String>,
    ) -> CoreResult<JobId> {
        let request = Request::SubmitJobWithDescription { payload, description: description.into() };
        match self.call(request).await? {
            Response::JobCreated { job_id } => Ok(job_id),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn cancel_job(&self, job_id: JobId) -> CoreResult<()> {
        self.expect_ok(Request::CancelJob { job_id }).await
    }

    pub async fn set_idle_time(&self, seconds: u64) -> CoreResult<()> {
        self.expect_ok(Request::SetIdleTime { seconds }).await
    }

    pub async fn get_job_status(&self, job_id: JobId) -> CoreResult<JobStatus> {
        match self.call(Request::GetJobStatus { job_id }).await? {
            Response::JobStatus { status } => Ok(status),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn wait_for_job_status_change(
        &self,
        job_id: JobId,
        last_event_id: EventId,
        timeout_ms: u64,
    ) -> CoreResult<JobStatus> {
        let request = Request::WaitForJobStatusChangeForJob { job_id, last_event_id, timeout_ms };
        match self.call(request).await? {
            Response::JobStatus { status } => Ok(status),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get_class_digest(&self, name: impl Into<String>) -> CoreResult<Option<Digest>> {
        match self.call(Request::GetClassDigest { name: name.into() }).await? {
            Response::ClassDigest { digest } => Ok(digest),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn set_class_definition(&self, name: impl Into<String>, payload: Vec<u8>) -> CoreResult<Digest> {
        let request = Request::SetClassDefinition { name: name.into(), payload };
        match self.call(request).await? {
            Response::ClassUploaded { entry } => Ok(entry.digest),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get_finished_tasks(&self, job_ids: &[JobId], task_ids: &[TaskId]) -> CoreResult<Vec<bool>> {
        let request = Request::GetFinishedTasks { job_ids: job_ids.to_vec(), task_ids: task_ids.to_vec() };
        match self.call(request).await? {
            Response::FinishedTasks { finished } => Ok(finished),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    async fn expect_ok(&self, request: Request) -> CoreResult<()> {
        match self.call(request).await? {
            Response::Ok => Ok(()),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }
}
