// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses returned by a server or hub (§6 Service operations).

use dcp_core::{ClassEntry, CoreError, Digest, JobId, JobStatus, TaskDescription};
use serde::{Deserialize, Serialize};

use crate::ServiceHandle;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success with no payload.
    Ok,

    Authenticated { handle: ServiceHandle },

    JobCreated { job_id: JobId },

    /// `requestTask()` reply; `task.job_id.is_none()` marks an idle directive.
    Task { task: TaskDescription },

    TaskWorker { definition: Option<Vec<u8>> },
    ClassDigest { digest: Option<Digest> },
    ClassDefinition { definition: Option<Vec<u8>> },
    ClassUploaded { entry: ClassEntry },

    /// Bitset aligned to the request's `job_ids`/`task_ids` arrays.
    FinishedTasks { finished: Vec<bool> },

    JobStatus { status: JobStatus },

    /// Carries one of the §7 error kinds back to the caller. `retryable`
    /// mirrors `CoreError::is_retryable` so a proxy that only has the wire
    /// form still knows whether to retry.
    Error { kind: String, message: String, retryable: bool },
}

impl From<&CoreError> for Response {
    fn from(err: &CoreError) -> Self {
        Response::Error {
            kind: core_error_kind(err).to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

fn core_error_kind(err: &CoreError) -> &'static str {
    match err {
        CoreError::IllegalArgument(_) => "IllegalArgument",
        CoreError::Security(_) => "Security",
        CoreError::ProtocolVersion(_) => "ProtocolVersion",
        CoreError::Transport(_) => "Transport",
        CoreError::JobExecution(_) => "JobExecution",
        CoreError::Delegation(_) => "Delegation",
        CoreError::ClassNotFound(_) => "ClassNotFound",
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
