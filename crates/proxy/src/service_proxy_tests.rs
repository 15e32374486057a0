// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use dcp_core::CoreError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A connector whose handle always connects instantly; failures are
/// simulated inside the `op` closure, not at connect time.
struct AlwaysConnects;

#[derive(Clone)]
struct Counter(Arc<AtomicU64>);

#[async_trait]
impl Connector for AlwaysConnects {
    type Handle = Counter;

    async fn connect(&self) -> CoreResult<Counter> {
        Ok(Counter(Arc::new(AtomicU64::new(0))))
    }
}

#[tokio::test]
async fn logical_error_surfaces_without_retry() {
    let proxy = ReconnectingServiceProxy::new(AlwaysConnects);
    let attempts = Arc::new(AtomicU64::new(0));
    let attempts2 = attempts.clone();

    let result: CoreResult<()> = proxy
        .invoke(move |_handle| {
            let attempts = attempts2.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CoreError::IllegalArgument("bad job id".into()))
            }
        })
        .await;

    assert!(matches!(result, Err(CoreError::IllegalArgument(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1, "logical errors must not retry");
}

#[tokio::test]
async fn transport_error_retries_until_success() {
    let proxy = ReconnectingServiceProxy::new(AlwaysConnects);
    let attempts = Arc::new(AtomicU64::new(0));
    let attempts2 = attempts.clone();

    let result = proxy
        .invoke(move |_handle| {
            let attempts = attempts2.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 3 {
                    Err(CoreError::Transport("connection reset".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .expect("eventually succeeds");

    assert_eq!(result, 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

/// P5 / scenario 4: drops the connection on every Nth call.
struct DropsEveryNth {
    n: u64,
    calls: Arc<AtomicU64>,
}

#[async_trait]
impl Connector for DropsEveryNth {
    type Handle = DropEveryNthHandle;

    async fn connect(&self) -> CoreResult<DropEveryNthHandle> {
        Ok(DropEveryNthHandle { n: self.n, calls: self.calls.clone() })
    }
}

#[derive(Clone)]
struct DropEveryNthHandle {
    n: u64,
    calls: Arc<AtomicU64>,
}

impl DropEveryNthHandle {
    async fn call(&self) -> CoreResult<()> {
        let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if count % self.n == 0 {
            Err(CoreError::Transport("simulated drop".into()))
        } else {
            Ok(())
        }
    }
}

#[tokio::test(start_paused = true)]
async fn reconnect_transparency_under_periodic_drops() {
    let calls = Arc::new(AtomicU64::new(0));
    let proxy = ReconnectingServiceProxy::with_reconnect_interval(
        DropsEveryNth { n: 3, calls: calls.clone() },
        std::time::Duration::from_millis(1),
    );

    for _ in 0..10 {
        proxy.invoke(|handle: DropEveryNthHandle| async move { handle.call().await }).await.expect("no error surfaces");
    }
}

#[tokio::test(start_paused = true)]
async fn countdown_reports_backoff_then_clears() {
    struct FailsOnce(Arc<AtomicU64>);

    #[async_trait]
    impl Connector for FailsOnce {
        type Handle = ();
        async fn connect(&self) -> CoreResult<()> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(CoreError::Transport("first attempt fails".into()))
            } else {
                Ok(())
            }
        }
    }

    let proxy = ReconnectingServiceProxy::with_reconnect_interval(
        FailsOnce(Arc::new(AtomicU64::new(0))),
        std::time::Duration::from_secs(5),
    );
    assert_eq!(proxy.reconnect_countdown_secs(), 0);
    proxy.invoke(|_: ()| async move { Ok::<_, CoreError>(()) }).await.expect("connects on retry");
    assert_eq!(proxy.reconnect_countdown_secs(), 0);
    assert!(proxy.is_connected());
}
