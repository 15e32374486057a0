// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::courtesy::Unconditional;
use dcp_core::{JobId, TaskDescription, TaskId};
use std::collections::VecDeque;
use std::sync::atomic::AtomicU32;
use std::time::Duration;
use tokio::sync::Notify;

struct FakeService {
    queue: Mutex<VecDeque<TaskDescription>>,
    submitted: Mutex<Vec<(JobId, TaskId, Vec<u8>)>>,
    exceptions: Mutex<Vec<(JobId, TaskId, String)>>,
}

impl FakeService {
    fn new(tasks: Vec<TaskDescription>) -> Self {
        Self { queue: Mutex::new(tasks.into()), submitted: Mutex::new(Vec::new()), exceptions: Mutex::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl WorkerService for FakeService {
    async fn request_task(&self) -> Result<TaskDescription, CoreError> {
        let next = self.queue.lock().pop_front();
        Ok(next.unwrap_or_else(|| TaskDescription::idle(1)))
    }

    async fn get_task_worker(&self, _job_id: JobId) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(Some(b"plugin".to_vec()))
    }

    async fn submit_task_results(&self, job_id: JobId, task_id: TaskId, payload: Vec<u8>) -> Result<(), CoreError> {
        self.submitted.lock().push((job_id, task_id, payload));
        Ok(())
    }

    async fn report_exception(&self, job_id: JobId, task_id: TaskId, message: String) -> Result<(), CoreError> {
        self.exceptions.lock().push((job_id, task_id, message));
        Ok(())
    }

    async fn get_finished_tasks(&self, _job_ids: &[JobId], _task_ids: &[TaskId]) -> Result<Vec<bool>, CoreError> {
        unimplemented!("not exercised by pool tests")
    }
}

struct EchoPlugin;

#[async_trait::async_trait]
impl TaskPlugin for EchoPlugin {
    async fn perform(&self, payload: &[u8], _progress: &ProgressMonitor) -> Result<Vec<u8>, CoreError> {
        Ok(payload.to_vec())
    }
}

fn echo_factory(_bytes: &[u8]) -> Result<Arc<dyn TaskPlugin>, CoreError> {
    Ok(Arc::new(EchoPlugin))
}

#[tokio::test]
async fn worker_drains_queue_and_submits_each_result() {
    let job = JobId::new();
    let tasks = vec![
        TaskDescription::for_task(job, TaskId(1), b"a".to_vec()),
        TaskDescription::for_task(job, TaskId(2), b"b".to_vec()),
    ];
    let service = Arc::new(FakeService::new(tasks));
    let plugins = Arc::new(PluginRegistry::new(echo_factory));
    let pool = WorkerPool::new(1, service.clone(), plugins, Arc::new(Unconditional), Duration::from_millis(5));

    pool.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    pool.shutdown().await;

    let submitted = service.submitted.lock();
    assert_eq!(submitted.len(), 2);
    assert!(submitted.iter().any(|(_, id, payload)| *id == TaskId(1) && payload == b"a"));
    assert!(submitted.iter().any(|(_, id, payload)| *id == TaskId(2) && payload == b"b"));
}

struct SlowPlugin {
    started: Arc<Notify>,
    iterations: Arc<AtomicU32>,
}

#[async_trait::async_trait]
impl TaskPlugin for SlowPlugin {
    async fn perform(&self, _payload: &[u8], progress: &ProgressMonitor) -> Result<Vec<u8>, CoreError> {
        self.started.notify_one();
        for _ in 0..200 {
            self.iterations.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if progress.report().await {
                return Ok(Vec::new());
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        Ok(b"ran to completion".to_vec())
    }
}

#[tokio::test]
async fn cancel_stops_a_cooperative_plugin_before_submission() {
    let job = JobId::new();
    let task_id = TaskId(7);
    let service = Arc::new(FakeService::new(vec![TaskDescription::for_task(job, task_id, b"x".to_vec())]));

    let started = Arc::new(Notify::new());
    let iterations = Arc::new(AtomicU32::new(0));
    let started2 = started.clone();
    let iterations2 = iterations.clone();
    let plugins = Arc::new(PluginRegistry::new(move |_bytes: &[u8]| {
        Ok(Arc::new(SlowPlugin { started: started2.clone(), iterations: iterations2.clone() }) as Arc<dyn TaskPlugin>)
    }));

    let pool = WorkerPool::new(1, service.clone(), plugins, Arc::new(Unconditional), Duration::from_millis(5));
    pool.start();

    started.notified().await;
    assert_eq!(pool.outstanding(), vec![(job, task_id)]);
    assert!(pool.cancel(job, task_id));

    tokio::time::sleep(Duration::from_millis(50)).await;
    pool.shutdown().await;

    assert!(service.submitted.lock().is_empty(), "cancelled result must not be submitted");
    assert!(iterations.load(std::sync::atomic::Ordering::SeqCst) < 200, "plugin should have exited before its natural end");
}

#[tokio::test]
async fn cluster_idle_elects_exactly_one_poller_under_concurrency() {
    let idle = Arc::new(ClusterIdle::new());
    let concurrent = Arc::new(AtomicU32::new(0));
    let max_concurrent = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let idle = idle.clone();
        let concurrent = concurrent.clone();
        let max_concurrent = max_concurrent.clone();
        handles.push(tokio::spawn(async move {
            if idle.try_become_poller() {
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                max_concurrent.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
                idle.release_and_wake();
            } else {
                idle.wait_for_poller().await;
            }
        }));
    }

    for handle in handles {
        handle.await.expect("worker task panicked");
    }

    assert_eq!(max_concurrent.load(Ordering::SeqCst), 1, "more than one worker held the poller role at once");
}
