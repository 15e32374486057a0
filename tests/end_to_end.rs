// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-crate end-to-end scenarios (§8): a real `dcp-server` listener
//! bound to an ephemeral loopback port, driven over an actual TCP
//! connection through `dcp-proxy`'s `ReconnectingServiceProxy`, the same
//! transport `dcp-worker` and `dcp-cli` use.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use dcp_classcache::{ClassManager, InMemoryCacheStore};
use dcp_core::{CoreResult, JobId, JobState, Progress, ServerConfig, TaskId};
use dcp_proxy::{ReconnectingServiceProxy, TcpConnector};
use dcp_scheduler::TaskScheduler;
use dcp_server::{EventBus, JobManager, JobProgram, ProgressSink, ServerContext};
use dcp_wire::{Request, Response};
use parking_lot::Mutex;
use tokio::net::TcpListener;

/// A job object whose production is driven entirely by a fixed script of
/// `next_task` replies, mirroring §8 scenario 3's `[A, B, null, C, null,
/// null]` sequence.
struct ScriptedProgram {
    script: Mutex<VecDeque<Option<Vec<u8>>>>,
}

impl ScriptedProgram {
    fn new(script: Vec<Option<Vec<u8>>>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(script.into()) })
    }
}

#[async_trait]
impl JobProgram for ScriptedProgram {
    async fn next_task(&self) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.script.lock().pop_front().flatten())
    }

    fn is_complete(&self) -> bool {
        self.script.lock().is_empty()
    }

    async fn submit_task_results(&self, _task: &[u8], _result: &[u8], progress: &ProgressSink) -> CoreResult<()> {
        progress.report(Progress::Fraction(0.5));
        Ok(())
    }
}

/// Starts a real `dcpd`-equivalent listener on an ephemeral port and
/// returns a connected, authenticated proxy plus the job manager it talks
/// to (so the test can inspect published status directly, the way
/// `waitForJobStatusChange` normally would over the same socket).
///
/// `factory` resolves each submitted job's program from its payload bytes,
/// so a single server can hand out a different script per job.
async fn start_server<F>(
    factory: F,
) -> (ReconnectingServiceProxy<TcpConnector>, Arc<JobManager<InMemoryCacheStore, F>>)
where
    F: Fn(&[u8]) -> CoreResult<Arc<dyn JobProgram>> + Send + Sync + 'static,
{
    let classes = Arc::new(ClassManager::new(InMemoryCacheStore));
    let scheduler = Arc::new(TaskScheduler::new());
    let events = Arc::new(EventBus::new());
    let job_manager = Arc::new(JobManager::new(classes, scheduler, events, factory, ServerConfig::default()));
    let ctx = Arc::new(ServerContext { job_manager: job_manager.clone() });

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(dcp_server::run_server(listener, ctx));

    let connector = TcpConnector::new(addr.to_string(), "tester", "");
    let proxy = ReconnectingServiceProxy::new(connector);
    (proxy, job_manager)
}

async fn call(proxy: &ReconnectingServiceProxy<TcpConnector>, request: Request) -> Response {
    proxy
        .invoke(move |handle| {
            let request = request.clone();
            async move { handle.call(&request).await }
        })
        .await
        .expect("request succeeds over the wire")
}

#[tokio::test]
async fn two_job_round_robin_over_the_wire() {
    // Scenario 1: J1 (3 tasks) then J2 (3 tasks), both priority 20 — six
    // `requestTask()` calls must alternate job ids in submission order:
    // [J1, J2, J1, J2, J1, J2].
    //
    // The payload submitted with each job selects its script: every byte
    // becomes one task.
    let factory = |payload: &[u8]| -> CoreResult<Arc<dyn JobProgram>> {
        let script = payload.iter().map(|&b| Some(vec![b])).collect();
        Ok(ScriptedProgram::new(script) as Arc<dyn JobProgram>)
    };
    let (proxy, _jm) = start_server(factory).await;

    let submit = |payload: Vec<u8>, description: &'static str| {
        Request::SubmitJobWithDescription { payload, description: description.into() }
    };

    let j1 = match call(&proxy, submit(vec![1, 2, 3], "J1")).await {
        Response::JobCreated { job_id } => job_id,
        other => panic!("unexpected response: {other:?}"),
    };
    let j2 = match call(&proxy, submit(vec![1, 2, 3], "J2")).await {
        Response::JobCreated { job_id } => job_id,
        other => panic!("unexpected response: {other:?}"),
    };

    let mut order = Vec::new();
    for _ in 0..6 {
        match call(&proxy, Request::RequestTask).await {
            Response::Task { task } => order.push(task.job_id.expect("task has a job id")),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    assert_eq!(order, vec![j1, j2, j1, j2, j1, j2]);
}

#[tokio::test]
async fn stall_and_recover_over_the_wire() {
    // Scenario 3: nextTask yields [A, B, null, C, null, null].
    let script = vec![
        Some(b"A".to_vec()),
        Some(b"B".to_vec()),
        None,
        Some(b"C".to_vec()),
        None,
        None,
    ];
    let program = ScriptedProgram::new(script);
    let (proxy, jm) = start_server(move |_payload: &[u8]| Ok(program.clone() as Arc<dyn JobProgram>)).await;

    let job_id = match call(&proxy, Request::SubmitJobWithDescription { payload: Vec::new(), description: "stall-and-recover".into() }).await {
        Response::JobCreated { job_id } => job_id,
        other => panic!("unexpected response: {other:?}"),
    };

    // Two requestTask calls pull A then B, already produced by the pump
    // during submission.
    let mut dispatched = Vec::new();
    for _ in 0..2 {
        match call(&proxy, Request::RequestTask).await {
            Response::Task { task } => dispatched.push(task.task_id),
            other => panic!("unexpected response: {other:?}"),
        }
    }
    assert_eq!(dispatched.len(), 2);
    let (id_a, id_b) = (dispatched[0], dispatched[1]);

    let status = jm.job_status(job_id).expect("status published");
    assert_eq!(status.state, JobState::Stalled);
    assert!(status.progress.fraction().is_none() || status.progress.fraction() == Some(0.0));

    // Submitting A's result lets the pump produce and queue C.
    submit(&proxy, job_id, id_a).await;
    let id_c = match call(&proxy, Request::RequestTask).await {
        Response::Task { task } => task.task_id,
        other => panic!("unexpected response: {other:?}"),
    };

    submit(&proxy, job_id, id_b).await;
    submit(&proxy, job_id, id_c).await;

    let status = jm.job_status(job_id).expect("status published");
    assert_eq!(status.state, JobState::Complete);
    assert_eq!(status.progress.fraction(), Some(1.0));
}

async fn submit(proxy: &ReconnectingServiceProxy<TcpConnector>, job_id: JobId, task_id: TaskId) {
    match call(&proxy, Request::SubmitTaskResults { job_id, task_id, payload: Vec::new() }).await {
        Response::Ok => {}
        other => panic!("unexpected response: {other:?}"),
    }
}
