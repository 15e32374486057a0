// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub Router (C10, §4.9): multiplexes a set of named upstream servers
//! behind the same worker-facing surface a real server exposes
//! ([`WorkerService`]), so a worker host cannot tell it is talking to a
//! hub instead of a server.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use dcp_core::{CoreError, CoreResult, JobId, TaskDescription, TaskId};
use dcp_worker::WorkerService;
use parking_lot::Mutex;

/// One route: which upstream owns `jobId`, and how many tasks for that job
/// the hub currently has outstanding (dispatched to a worker, not yet
/// resolved). The route is eligible for eviction once this reaches zero
/// (§9 redesign note: refcounting replaces the source's weak-reference
/// route map).
struct Route {
    upstream: String,
    refcount: u64,
}

struct Inner {
    /// FIFO of upstream names; `requestTask` rotates the head to the tail
    /// before trying it (§4.9).
    order: VecDeque<String>,
    upstreams: HashMap<String, Arc<dyn WorkerService>>,
    routes: HashMap<JobId, Route>,
    /// `(jobId, taskId) -> upstream name`, for per-task forwarding and as
    /// the outstanding-task snapshot the aggregated completion poll uses.
    dispatched: HashMap<(JobId, TaskId), String>,
    /// Tasks the aggregated completion poll found finished upstream, kept
    /// after the route decays so `getFinishedTasks` still answers `true`.
    finished: HashSet<(JobId, TaskId)>,
}

/// Multiplexes `upstreams` (each a [`WorkerService`] — in production a
/// [`dcp_proxy::ReconnectingServiceProxy`]-backed remote server) behind one
/// worker-facing endpoint.
pub struct HubRouter {
    inner: Mutex<Inner>,
    idle_directive_secs: u64,
}

impl HubRouter {
    pub fn new(idle_directive_secs: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                upstreams: HashMap::new(),
                routes: HashMap::new(),
                dispatched: HashMap::new(),
                finished: HashSet::new(),
            }),
            idle_directive_secs,
        }
    }

    /// `connect(host, user, pw)` (§4.9) — registers a named upstream proxy.
    /// Takes the already-constructed service rather than dialing itself, so
    /// tests can inject a fake and production code injects a
    /// `RemoteWorkerService<TcpConnector>`.
    pub fn connect(&self, name: impl Into<String>, upstream: Arc<dyn WorkerService>) {
        let name = name.into();
        let mut inner = self.inner.lock();
        if !inner.upstreams.contains_key(&name) {
            inner.order.push_back(name.clone());
        }
        inner.upstreams.insert(name, upstream);
    }

    /// `disconnect(host)` (§4.9) — drops the upstream and invalidates every
    /// route pointing at it.
    pub fn disconnect(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.upstreams.remove(name);
        inner.order.retain(|n| n != name);
        inner.routes.retain(|_, route| route.upstream != name);
        inner.dispatched.retain(|_, upstream| upstream != name);
    }

    pub fn upstream_names(&self) -> Vec<String> {
        self.inner.lock().order.iter().cloned().collect()
    }

    pub fn route_count(&self) -> usize {
        self.inner.lock().routes.len()
    }

    fn record_dispatch(inner: &mut Inner, upstream: &str, job_id: JobId, task_id: TaskId) {
        inner
            .routes
            .entry(job_id)
            .and_modify(|r| r.refcount += 1)
            .or_insert_with(|| Route { upstream: upstream.to_string(), refcount: 1 });
        inner.dispatched.insert((job_id, task_id), upstream.to_string());
    }

    /// Releases one outstanding reference on `jobId`'s route, evicting it
    /// once the count reaches zero.
    fn release_route(inner: &mut Inner, job_id: JobId, task_id: TaskId) {
        inner.dispatched.remove(&(job_id, task_id));
        let evict = match inner.routes.get_mut(&job_id) {
            Some(route) => {
                route.refcount = route.refcount.saturating_sub(1);
                route.refcount == 0
            }
            None => false,
        };
        if evict {
            inner.routes.remove(&job_id);
        }
    }

    fn route_upstream(&self, job_id: JobId) -> Option<Arc<dyn WorkerService>> {
        let inner = self.inner.lock();
        let route = inner.routes.get(&job_id)?;
        inner.upstreams.get(&route.upstream).cloned()
    }

    /// Aggregated completion polling (§4.9): asks each upstream for the
    /// status of the tasks the hub has outstanding there, folding any
    /// upstream-complete task into the hub's own finished set.
    pub async fn poll_completions(&self) {
        let by_upstream: HashMap<String, Vec<(JobId, TaskId)>> = {
            let inner = self.inner.lock();
            let mut grouped: HashMap<String, Vec<(JobId, TaskId)>> = HashMap::new();
            for ((job_id, task_id), upstream) in inner.dispatched.iter() {
                grouped.entry(upstream.clone()).or_default().push((*job_id, *task_id));
            }
            grouped
        };

        for (name, tasks) in by_upstream {
            let upstream = { self.inner.lock().upstreams.get(&name).cloned() };
            let Some(upstream) = upstream else { continue };
            let job_ids: Vec<JobId> = tasks.iter().map(|(j, _)| *j).collect();
            let task_ids: Vec<TaskId> = tasks.iter().map(|(_, t)| *t).collect();

            match upstream.get_finished_tasks(&job_ids, &task_ids).await {
                Ok(bits) => {
                    let mut inner = self.inner.lock();
                    for ((job_id, task_id), done) in tasks.into_iter().zip(bits) {
                        if done {
                            inner.finished.insert((job_id, task_id));
                            Self::release_route(&mut inner, job_id, task_id);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(upstream = %name, %err, "hub: aggregated completion poll failed, will retry next tick");
                }
            }
        }
    }
}

#[async_trait]
impl WorkerService for HubRouter {
    /// `requestTask()` (§4.9): rotates the upstream FIFO by one position
    /// per call and tries upstreams in that rotated order until one yields
    /// a non-idle task, recording the route.
    async fn request_task(&self) -> CoreResult<TaskDescription> {
        let order: Vec<String> = {
            let mut inner = self.inner.lock();
            if let Some(front) = inner.order.pop_front() {
                inner.order.push_back(front);
            }
            inner.order.iter().cloned().collect()
        };

        for name in &order {
            let upstream = { self.inner.lock().upstreams.get(name).cloned() };
            let Some(upstream) = upstream else { continue };
            match upstream.request_task().await {
                Ok(task) if !task.is_idle() => {
                    if let Some(job_id) = task.job_id {
                        let mut inner = self.inner.lock();
                        Self::record_dispatch(&mut inner, name, job_id, task.task_id);
                    }
                    return Ok(task);
                }
                Ok(_idle) => continue,
                Err(err) => {
                    tracing::warn!(upstream = %name, %err, "hub: requestTask failed, trying next upstream");
                }
            }
        }
        Ok(TaskDescription::idle(self.idle_directive_secs))
    }

    async fn get_task_worker(&self, job_id: JobId) -> CoreResult<Option<Vec<u8>>> {
        match self.route_upstream(job_id) {
            Some(upstream) => upstream.get_task_worker(job_id).await,
            None => Ok(None),
        }
    }

    async fn submit_task_results(&self, job_id: JobId, task_id: TaskId, payload: Vec<u8>) -> CoreResult<()> {
        let Some(upstream) = self.route_upstream(job_id) else {
            tracing::debug!(%job_id, %task_id, "hub: submitTaskResults for unknown route, dropping");
            return Ok(());
        };
        let result = upstream.submit_task_results(job_id, task_id, payload).await;
        let mut inner = self.inner.lock();
        Self::release_route(&mut inner, job_id, task_id);
        result
    }

    async fn report_exception(&self, job_id: JobId, task_id: TaskId, message: String) -> CoreResult<()> {
        let Some(upstream) = self.route_upstream(job_id) else {
            tracing::debug!(%job_id, %task_id, "hub: reportException for unknown route, dropping");
            return Ok(());
        };
        let result = upstream.report_exception(job_id, task_id, message).await;
        let mut inner = self.inner.lock();
        Self::release_route(&mut inner, job_id, task_id);
        result
    }

    /// Answers from the hub's own bookkeeping rather than forwarding
    /// upstream: a task is finished if the aggregated poll already found it
    /// so, or if the hub never dispatched it (unknown-to-hub is, by the
    /// wire contract, indistinguishable from finished).
    async fn get_finished_tasks(&self, job_ids: &[JobId], task_ids: &[TaskId]) -> CoreResult<Vec<bool>> {
        if job_ids.len() != task_ids.len() {
            return Err(CoreError::IllegalArgument("jobIds and taskIds must be the same length".into()));
        }
        let inner = self.inner.lock();
        Ok(job_ids
            .iter()
            .zip(task_ids)
            .map(|(j, t)| inner.finished.contains(&(*j, *t)) || !inner.dispatched.contains_key(&(*j, *t)))
            .collect())
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
