// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Courtesy Monitor (C9, §4.8): a monotonic allow/disallow flag workers
//! consult before every progress report, so a host can make running tasks
//! yield (e.g. on battery, or when a human reclaims the machine).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

/// `allowed()` reports current state; `wait_for()` blocks until it flips to
/// `true`. Implementations: polling (external `poll()` callback), async
/// (an event sets the flag directly), unconditional (always allowed).
#[async_trait]
pub trait CourtesyMonitor: Send + Sync {
    fn allowed(&self) -> bool;

    async fn wait_for(&self);
}

/// Always allowed; the default for hosts with no courtesy policy.
pub struct Unconditional;

#[async_trait]
impl CourtesyMonitor for Unconditional {
    fn allowed(&self) -> bool {
        true
    }

    async fn wait_for(&self) {}
}

/// An externally-driven flag (e.g. set by a battery/AC sensor callback).
/// `set_allowed` wakes any worker parked in `wait_for`.
pub struct AsyncCourtesyMonitor {
    allowed: AtomicBool,
    notify: Notify,
}

impl AsyncCourtesyMonitor {
    pub fn new(initially_allowed: bool) -> Arc<Self> {
        Arc::new(Self { allowed: AtomicBool::new(initially_allowed), notify: Notify::new() })
    }

    pub fn set_allowed(&self, allowed: bool) {
        self.allowed.store(allowed, Ordering::SeqCst);
        if allowed {
            self.notify.notify_waiters();
        }
    }
}

#[async_trait]
impl CourtesyMonitor for AsyncCourtesyMonitor {
    fn allowed(&self) -> bool {
        self.allowed.load(Ordering::SeqCst)
    }

    async fn wait_for(&self) {
        while !self.allowed() {
            self.notify.notified().await;
        }
    }
}

/// Polls an external predicate (e.g. a battery-level check) on an interval
/// until it returns `true`.
pub struct PollingCourtesyMonitor<F: Fn() -> bool + Send + Sync> {
    poll: F,
    interval: std::time::Duration,
}

impl<F: Fn() -> bool + Send + Sync> PollingCourtesyMonitor<F> {
    pub fn new(interval: std::time::Duration, poll: F) -> Self {
        Self { poll, interval }
    }
}

#[async_trait]
impl<F: Fn() -> bool + Send + Sync> CourtesyMonitor for PollingCourtesyMonitor<F> {
    fn allowed(&self) -> bool {
        (self.poll)()
    }

    async fn wait_for(&self) {
        while !self.allowed() {
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
#[path = "courtesy_tests.rs"]
mod tests;
