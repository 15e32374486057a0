// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests sent to a server or hub (§6 Service operations).

use dcp_core::{EventId, JobId, TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op")]
pub enum Request {
    Authenticate { user: String, password: String, protocol_version_id: u128 },

    CreateJob { description: String },
    SubmitJobWithId { payload: Vec<u8>, job_id: JobId },
    SubmitJobWithDescription { payload: Vec<u8>, description: String },
    CancelJob { job_id: JobId },
    SetJobPriority { job_id: JobId, priority: i32 },
    SetIdleTime { seconds: u64 },

    RequestTask,
    SubmitTaskResults { job_id: JobId, task_id: TaskId, payload: Vec<u8> },
    ReportException { job_id: JobId, task_id: TaskId, message: String },

    GetTaskWorker { job_id: JobId },
    GetClassDigest { name: String },
    GetClassDigestForJob { name: String, job_id: JobId },
    GetClassDefinition { name: String, job_id: JobId },
    SetClassDefinition { name: String, payload: Vec<u8> },
    SetClassDefinitionForJob { name: String, job_id: JobId, payload: Vec<u8> },

    GetFinishedTasks { job_ids: Vec<JobId>, task_ids: Vec<TaskId> },

    WaitForJobStatusChange { last_event_id: EventId, timeout_ms: u64 },
    WaitForJobStatusChangeForJob { job_id: JobId, last_event_id: EventId, timeout_ms: u64 },
    GetJobStatus { job_id: JobId },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
