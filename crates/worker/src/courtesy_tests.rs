// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn unconditional_is_always_allowed() {
    let m = Unconditional;
    assert!(m.allowed());
    m.wait_for().await;
}

#[tokio::test(start_paused = true)]
async fn async_monitor_wakes_waiters_on_set_allowed() {
    let monitor = AsyncCourtesyMonitor::new(false);
    assert!(!monitor.allowed());

    let waiter = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.wait_for().await })
    };

    tokio::task::yield_now().await;
    monitor.set_allowed(true);
    waiter.await.expect("waiter completes once allowed");
    assert!(monitor.allowed());
}

#[tokio::test(start_paused = true)]
async fn polling_monitor_waits_until_predicate_flips() {
    let flag = Arc::new(AtomicBool::new(false));
    let flag2 = flag.clone();
    let monitor = PollingCourtesyMonitor::new(Duration::from_millis(10), move || flag2.load(Ordering::SeqCst));

    let waiter = tokio::spawn(async move { monitor.wait_for().await });
    tokio::time::sleep(Duration::from_millis(25)).await;
    flag.store(true, Ordering::SeqCst);
    waiter.await.expect("waiter completes once predicate is true");
}
