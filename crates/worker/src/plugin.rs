// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-worker routines (§4.6 "task-worker resolution"). The real platform
//! this spec is distilled from dynamically loads a class from bytes; that
//! mechanism is out of scope here (§1 Non-goals: no job-computation
//! semantics), so [`TaskPlugin`] is the contract shape a host executes
//! against, and [`PluginRegistry`] is parameterized over a factory that
//! turns resolved bytes into one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dcp_core::{CoreError, CoreResult, JobId};
use tokio::sync::{Mutex, OnceCell};

use crate::progress::ProgressMonitor;
use crate::service::WorkerService;

/// A task-worker routine: given a task payload, produces a result payload.
#[async_trait]
pub trait TaskPlugin: Send + Sync {
    async fn perform(&self, payload: &[u8], progress: &ProgressMonitor) -> CoreResult<Vec<u8>>;
}

/// Per-jobId cached, lazily-resolved [`TaskPlugin`] (§4.6): resolution is
/// serialized per job (only one concurrent `get_task_worker` call per
/// jobId) via [`OnceCell`]; a resolution failure is not cached, so the next
/// worker to need this job retries.
pub struct PluginRegistry<F> {
    factory: F,
    cells: Mutex<HashMap<JobId, Arc<OnceCell<Arc<dyn TaskPlugin>>>>>,
}

impl<F> PluginRegistry<F>
where
    F: Fn(&[u8]) -> CoreResult<Arc<dyn TaskPlugin>> + Send + Sync,
{
    pub fn new(factory: F) -> Self {
        Self { factory, cells: Mutex::new(HashMap::new()) }
    }

    /// Resolves the plugin for `job_id`, fetching and constructing it on
    /// first use and sharing the result with every subsequent caller for
    /// the same job.
    pub async fn resolve(&self, job_id: JobId, service: &dyn WorkerService) -> CoreResult<Arc<dyn TaskPlugin>> {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells.entry(job_id).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };

        cell.get_or_try_init(|| async {
            let definition = service
                .get_task_worker(job_id)
                .await?
                .ok_or_else(|| CoreError::ClassNotFound(job_id.to_string()))?;
            (self.factory)(&definition)
        })
        .await
        .map(Clone::clone)
    }

    /// Drops the cached resolution, e.g. once the Completion Poller (C8)
    /// reports the job has no further outstanding work.
    pub async fn evict(&self, job_id: JobId) {
        self.cells.lock().await.remove(&job_id);
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
