// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dcp_core::{JobId, TaskDescription, TaskId};
use std::sync::atomic::{AtomicU32, Ordering};

struct FlakyOnceService {
    calls: AtomicU32,
}

#[async_trait]
impl WorkerService for FlakyOnceService {
    async fn request_task(&self) -> CoreResult<TaskDescription> {
        unimplemented!("not exercised by these tests")
    }

    async fn get_task_worker(&self, _job_id: JobId) -> CoreResult<Option<Vec<u8>>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            Err(CoreError::Transport("resolve failed once".into()))
        } else {
            Ok(Some(b"plugin-bytes".to_vec()))
        }
    }

    async fn submit_task_results(&self, _job_id: JobId, _task_id: TaskId, _payload: Vec<u8>) -> CoreResult<()> {
        unimplemented!()
    }

    async fn report_exception(&self, _job_id: JobId, _task_id: TaskId, _message: String) -> CoreResult<()> {
        unimplemented!()
    }

    async fn get_finished_tasks(&self, _job_ids: &[JobId], _task_ids: &[TaskId]) -> CoreResult<Vec<bool>> {
        unimplemented!()
    }
}

struct EchoPlugin(Vec<u8>);

#[async_trait]
impl TaskPlugin for EchoPlugin {
    async fn perform(&self, _payload: &[u8], _progress: &ProgressMonitor) -> CoreResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn resolution_failure_is_not_cached_and_retries_succeed() {
    let service = FlakyOnceService { calls: AtomicU32::new(0) };
    let registry = PluginRegistry::new(|bytes: &[u8]| {
        Ok(Arc::new(EchoPlugin(bytes.to_vec())) as Arc<dyn TaskPlugin>)
    });
    let job_id = JobId::new();

    let first = registry.resolve(job_id, &service).await;
    assert!(first.is_err());

    let second = registry.resolve(job_id, &service).await.expect("retry succeeds");
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);

    let third = registry.resolve(job_id, &service).await.expect("cached");
    assert_eq!(service.calls.load(Ordering::SeqCst), 2, "second resolution must be served from cache");
    assert!(Arc::ptr_eq(&second, &third));
}

#[tokio::test]
async fn evict_forces_a_fresh_resolution() {
    let service = FlakyOnceService { calls: AtomicU32::new(1) };
    let registry = PluginRegistry::new(|bytes: &[u8]| {
        Ok(Arc::new(EchoPlugin(bytes.to_vec())) as Arc<dyn TaskPlugin>)
    });
    let job_id = JobId::new();

    registry.resolve(job_id, &service).await.expect("resolves");
    registry.evict(job_id).await;
    registry.resolve(job_id, &service).await.expect("resolves again after eviction");
    assert_eq!(service.calls.load(Ordering::SeqCst), 3);
}
