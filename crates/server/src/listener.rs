// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP listener for the server role (§6 External Interfaces): accepts
//! connections, runs the authentication handshake, then loops
//! request-in/response-out against the [`JobManager`].

use std::sync::Arc;
use std::time::Duration;

use dcp_classcache::CacheStore;
use dcp_core::{CoreError, CoreResult};
use dcp_wire::{ProtocolError, Request, Response, AUTHENTICATION_SERVICE, PROTOCOL_VERSION_ID};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::job_manager::JobManager;
use crate::program::JobProgram;

/// Shared context handed to every connection handler.
pub struct ServerContext<S: CacheStore, F> {
    pub job_manager: Arc<JobManager<S, F>>,
}

#[derive(Debug, Error)]
enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Runs the accept loop forever, spawning one task per connection.
pub async fn run_server<S, F>(listener: TcpListener, ctx: Arc<ServerContext<S, F>>)
where
    S: CacheStore + Send + Sync + 'static,
    F: Fn(&[u8]) -> CoreResult<Arc<dyn JobProgram>> + Send + Sync + 'static,
{
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(%addr, "accepted connection");
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, &ctx).await {
                        log_connection_error(err);
                    }
                });
            }
            Err(err) => error!(%err, "accept error"),
        }
    }
}

fn log_connection_error(err: ConnectionError) {
    match &err {
        ConnectionError::Protocol(ProtocolError::Io(io)) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            debug!("client disconnected");
        }
        _ => warn!(%err, "connection error"),
    }
}

/// A connection's first request must be `Authenticate` (§6 "Client
/// connects ... resolves `AuthenticationService`"). Every request after
/// that is dispatched against the job manager until the client
/// disconnects.
async fn handle_connection<S, F>(mut stream: TcpStream, ctx: &ServerContext<S, F>) -> Result<(), ConnectionError>
where
    S: CacheStore + Send + Sync + 'static,
    F: Fn(&[u8]) -> CoreResult<Arc<dyn JobProgram>> + Send + Sync + 'static,
{
    let request = dcp_wire::read_request(&mut stream).await?;
    let Request::Authenticate { user, password: _, protocol_version_id } = request else {
        let err = CoreError::Security("connection must start with authenticate".into());
        let _ = dcp_wire::write_response(&mut stream, &Response::from(&err)).await;
        return Ok(());
    };
    if protocol_version_id != PROTOCOL_VERSION_ID {
        let err = CoreError::ProtocolVersion(format!(
            "peer sent {protocol_version_id:#034x}, expected {PROTOCOL_VERSION_ID:#034x}"
        ));
        let _ = dcp_wire::write_response(&mut stream, &Response::from(&err)).await;
        return Ok(());
    }
    if user.is_empty() {
        let err = CoreError::Security("user must not be empty".into());
        let _ = dcp_wire::write_response(&mut stream, &Response::from(&err)).await;
        return Ok(());
    }
    info!(%user, "authenticated against {}", AUTHENTICATION_SERVICE);
    let handle = dcp_wire::ServiceHandle::new(user);
    dcp_wire::write_response(&mut stream, &Response::Authenticated { handle }).await?;

    loop {
        let request = match dcp_wire::read_request(&mut stream).await {
            Ok(request) => request,
            Err(ProtocolError::Io(io)) if io.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        let response = handle_request(request, ctx).await;
        dcp_wire::write_response(&mut stream, &response).await?;
    }
}

fn result_to_response(result: CoreResult<()>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(err) => Response::from(&err),
    }
}

/// Dispatches one request to the job manager and builds its reply. Every
/// branch mirrors one row of §6's service-operations table.
async fn handle_request<S, F>(request: Request, ctx: &ServerContext<S, F>) -> Response
where
    S: CacheStore + Send + Sync + 'static,
    F: Fn(&[u8]) -> CoreResult<Arc<dyn JobProgram>> + Send + Sync + 'static,
{
    let jm = &ctx.job_manager;
    match request {
        Request::Authenticate { .. } => {
            Response::from(&CoreError::IllegalArgument("already authenticated on this connection".into()))
        }

        Request::CreateJob { description } => Response::JobCreated { job_id: jm.create_job(description) },

        Request::SubmitJobWithId { payload, job_id } => result_to_response(jm.submit_job(job_id, payload).await),

        Request::SubmitJobWithDescription { payload, description } => {
            match jm.create_and_submit(description, payload).await {
                Ok(job_id) => Response::JobCreated { job_id },
                Err(err) => Response::from(&err),
            }
        }

        Request::CancelJob { job_id } => result_to_response(jm.cancel_job(job_id)),

        Request::SetJobPriority { job_id, priority } => result_to_response(jm.set_priority(job_id, priority)),

        Request::SetIdleTime { seconds } => {
            jm.set_idle_directive(seconds);
            Response::Ok
        }

        Request::RequestTask => Response::Task { task: jm.request_task() },

        Request::SubmitTaskResults { job_id, task_id, payload } => {
            result_to_response(jm.submit_task_results(job_id, task_id, payload).await)
        }

        Request::ReportException { job_id, task_id, message } => {
            result_to_response(jm.report_exception(job_id, task_id, message).await)
        }

        Request::GetTaskWorker { job_id } => Response::TaskWorker { definition: jm.get_task_worker(job_id) },

        Request::GetClassDigest { name } => Response::ClassDigest { digest: jm.get_current_class_digest(&name) },

        Request::GetClassDigestForJob { name, job_id } => {
            Response::ClassDigest { digest: jm.get_class_digest_for_job(job_id, &name) }
        }

        Request::GetClassDefinition { name, job_id } => {
            Response::ClassDefinition { definition: jm.get_class_definition_for_job(job_id, &name) }
        }

        Request::SetClassDefinition { name, payload } => {
            Response::ClassUploaded { entry: jm.set_class_definition(&name, payload) }
        }

        Request::SetClassDefinitionForJob { name, job_id, payload } => {
            match jm.set_class_definition_for_job(job_id, &name, payload) {
                Ok(entry) => Response::ClassUploaded { entry },
                Err(err) => Response::from(&err),
            }
        }

        Request::GetFinishedTasks { job_ids, task_ids } => match jm.get_finished_tasks(&job_ids, &task_ids) {
            Ok(finished) => Response::FinishedTasks { finished },
            Err(err) => Response::from(&err),
        },

        Request::WaitForJobStatusChange { last_event_id, timeout_ms } => {
            match jm.wait_for_status_change(last_event_id, Duration::from_millis(timeout_ms)).await {
                Some(status) => Response::JobStatus { status },
                None => Response::from(&CoreError::IllegalArgument("no job status has ever been published".into())),
            }
        }

        Request::WaitForJobStatusChangeForJob { job_id, last_event_id, timeout_ms } => {
            match jm.wait_for_job_status_change(job_id, last_event_id, Duration::from_millis(timeout_ms)).await {
                Some(status) => Response::JobStatus { status },
                None => Response::from(&CoreError::IllegalArgument(format!("unknown job {job_id}"))),
            }
        }

        Request::GetJobStatus { job_id } => match jm.job_status(job_id) {
            Some(status) => Response::JobStatus { status },
            None => Response::from(&CoreError::IllegalArgument(format!("unknown job {job_id}"))),
        },
    }
}
