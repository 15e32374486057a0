// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status events (§3 Entities, I4).

use crate::job::{JobId, JobState, Progress};
use serde::{Deserialize, Serialize};

/// Strictly increasing in publication order across *all* jobs on one server
/// (I4, §5 "Status events are totally ordered by eventId across all jobs on
/// one server"). Consumers resume a subscription with `lastEventId`.
pub type EventId = i64;

/// A published change to a job's lifecycle state, progress, or status text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: JobId,
    pub description: String,
    pub state: JobState,
    pub progress: Progress,
    pub status: String,
    pub event_id: EventId,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
