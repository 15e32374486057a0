// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`WorkerService`] implemented over the wire through a
//! [`ReconnectingServiceProxy`], so a worker host never deals with transport
//! loss directly (§4.5, §4.6).

use async_trait::async_trait;
use dcp_core::{CoreError, CoreResult, JobId, TaskDescription, TaskId};
use dcp_proxy::{wire_error, Connector, ReconnectingServiceProxy};
use dcp_wire::{Request, Response};

use crate::service::WorkerService;

/// Drives any [`Connector`] whose handle can exchange a [`Request`] for a
/// [`Response`] (in practice, `dcp_proxy::TcpConnector`'s `WireHandle`).
pub struct RemoteWorkerService<C: Connector> {
    proxy: ReconnectingServiceProxy<C>,
}

impl<C: Connector> RemoteWorkerService<C> {
    pub fn new(proxy: ReconnectingServiceProxy<C>) -> Self {
        Self { proxy }
    }
}

/// A connection handle that can round-trip one request for one response.
/// Implemented by `dcp_proxy::WireHandle`; kept as a trait here so this
/// module doesn't depend on the concrete transport.
#[async_trait]
pub trait RequestChannel: Clone + Send + Sync + 'static {
    async fn call(&self, request: &Request) -> CoreResult<Response>;
}

#[async_trait]
impl RequestChannel for dcp_proxy::WireHandle {
    async fn call(&self, request: &Request) -> CoreResult<Response> {
        self.call(request).await
    }
}

fn unexpected(response: Response) -> CoreError {
    CoreError::Transport(format!("unexpected response: {response:?}"))
}

fn into_error(kind: String, message: String, retryable: bool) -> CoreError {
    wire_error(kind, message, retryable)
}

#[async_trait]
impl<C> WorkerService for RemoteWorkerService<C>
where
    C: Connector + Send + Sync,
    C::Handle: RequestChannel,
{
    async fn request_task(&self) -> CoreResult<TaskDescription> {
        match self.proxy.invoke(|h| async move { h.call(&Request::RequestTask).await }).await? {
            Response::Task { task } => Ok(task),
            Response::Error { kind, message, retryable } => Err(into_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    async fn get_task_worker(&self, job_id: JobId) -> CoreResult<Option<Vec<u8>>> {
        let req = Request::GetTaskWorker { job_id };
        match self.proxy.invoke(move |h| { let req = req.clone(); async move { h.call(&req).await } }).await? {
            Response::TaskWorker { definition } => Ok(definition),
            Response::Error { kind, message, retryable } => Err(into_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    async fn submit_task_results(&self, job_id: JobId, task_id: TaskId, payload: Vec<u8>) -> CoreResult<()> {
        let req = Request::SubmitTaskResults { job_id, task_id, payload };
        match self.proxy.invoke(move |h| { let req = req.clone(); async move { h.call(&req).await } }).await? {
            Response::Ok => Ok(()),
            Response::Error { kind, message, retryable } => Err(into_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    async fn report_exception(&self, job_id: JobId, task_id: TaskId, message: String) -> CoreResult<()> {
        let req = Request::ReportException { job_id, task_id, message };
        match self.proxy.invoke(move |h| { let req = req.clone(); async move { h.call(&req).await } }).await? {
            Response::Ok => Ok(()),
            Response::Error { kind, message, retryable } => Err(into_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }

    async fn get_finished_tasks(&self, job_ids: &[JobId], task_ids: &[TaskId]) -> CoreResult<Vec<bool>> {
        let req = Request::GetFinishedTasks { job_ids: job_ids.to_vec(), task_ids: task_ids.to_vec() };
        match self.proxy.invoke(move |h| { let req = req.clone(); async move { h.call(&req).await } }).await? {
            Response::FinishedTasks { finished } => Ok(finished),
            Response::Error { kind, message, retryable } => Err(into_error(kind, message, retryable)),
            other => Err(unexpected(other)),
        }
    }
}
