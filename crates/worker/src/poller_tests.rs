// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::courtesy::Unconditional;
use crate::plugin::PluginRegistry;
use dcp_core::{JobId, TaskDescription, TaskId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::watch;

struct StubService {
    tasks: Mutex<VecDeque<TaskDescription>>,
    finished_reply: Mutex<Vec<bool>>,
    finished_calls: Mutex<u32>,
}

#[async_trait::async_trait]
impl WorkerService for StubService {
    async fn request_task(&self) -> Result<TaskDescription, CoreError> {
        Ok(self.tasks.lock().pop_front().unwrap_or_else(|| TaskDescription::idle(1)))
    }

    async fn get_task_worker(&self, _job_id: JobId) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(Some(b"plugin".to_vec()))
    }

    async fn submit_task_results(&self, _job_id: JobId, _task_id: TaskId, _payload: Vec<u8>) -> Result<(), CoreError> {
        Ok(())
    }

    async fn report_exception(&self, _job_id: JobId, _task_id: TaskId, _message: String) -> Result<(), CoreError> {
        Ok(())
    }

    async fn get_finished_tasks(&self, job_ids: &[JobId], _task_ids: &[TaskId]) -> Result<Vec<bool>, CoreError> {
        *self.finished_calls.lock() += 1;
        let reply = self.finished_reply.lock().clone();
        Ok(reply.into_iter().chain(std::iter::repeat(false)).take(job_ids.len()).collect())
    }
}

struct NeverDonePlugin;

#[async_trait::async_trait]
impl crate::plugin::TaskPlugin for NeverDonePlugin {
    async fn perform(&self, _payload: &[u8], progress: &ProgressMonitor) -> Result<Vec<u8>, CoreError> {
        loop {
            if progress.report().await {
                return Ok(Vec::new());
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }
}

#[tokio::test]
async fn finished_elsewhere_cancels_the_matching_worker() {
    let job = JobId::new();
    let task_id = TaskId(3);
    let service = Arc::new(StubService {
        tasks: Mutex::new(vec![TaskDescription::for_task(job, task_id, b"x".to_vec())].into()),
        finished_reply: Mutex::new(vec![true]),
        finished_calls: Mutex::new(0),
    });
    let plugins = Arc::new(PluginRegistry::new(|_: &[u8]| Ok(Arc::new(NeverDonePlugin) as Arc<dyn TaskPlugin>)));
    let pool = WorkerPool::new(1, service.clone(), plugins, Arc::new(Unconditional), std::time::Duration::from_millis(5));
    pool.start();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(pool.outstanding(), vec![(job, task_id)]);

    let poller = CompletionPoller::new(service.clone(), pool.clone(), std::time::Duration::from_millis(10));
    let (tx, rx) = watch::channel(false);
    let poller_task = tokio::spawn(async move { poller.run(rx).await });

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    assert!(pool.outstanding().is_empty(), "completion poller should have cancelled the finished task");

    let _ = tx.send(true);
    poller_task.await.expect("poller task exits cleanly");
    pool.shutdown().await;
}

#[tokio::test]
async fn empty_outstanding_set_skips_the_rpc() {
    let service = Arc::new(StubService {
        tasks: Mutex::new(VecDeque::new()),
        finished_reply: Mutex::new(Vec::new()),
        finished_calls: Mutex::new(0),
    });
    let plugins = Arc::new(PluginRegistry::new(|_: &[u8]| Ok(Arc::new(NeverDonePlugin) as Arc<dyn TaskPlugin>)));
    let pool = WorkerPool::new(0, service.clone(), plugins, Arc::new(Unconditional), std::time::Duration::from_millis(5));

    let poller = CompletionPoller::new(service.clone(), pool, std::time::Duration::from_millis(5));
    poller.tick().await;
    assert_eq!(*service.finished_calls.lock(), 0);
}
