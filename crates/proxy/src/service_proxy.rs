// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnecting Service Proxy (C6, §4.5): wraps a remote endpoint, retrying
//! transport-class failures forever with backoff while surfacing logical
//! errors to the caller untouched.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dcp_core::CoreResult;
use parking_lot::Mutex;

use crate::connector::Connector;

pub const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 60;

/// Generic retrying proxy over any [`Connector`]. One instance per remote
/// endpoint (a server, or one of a hub's upstreams).
pub struct ReconnectingServiceProxy<C: Connector> {
    connector: C,
    reconnect_interval: Duration,
    conn: Mutex<Option<C::Handle>>,
    /// Seconds remaining in the current backoff sleep, for UI display
    /// ("Lost connection, reconnecting in N seconds", §7).
    countdown_secs: AtomicU64,
}

impl<C: Connector> ReconnectingServiceProxy<C> {
    pub fn new(connector: C) -> Self {
        Self::with_reconnect_interval(connector, Duration::from_secs(DEFAULT_RECONNECT_INTERVAL_SECS))
    }

    pub fn with_reconnect_interval(connector: C, reconnect_interval: Duration) -> Self {
        Self {
            connector,
            reconnect_interval,
            conn: Mutex::new(None),
            countdown_secs: AtomicU64::new(0),
        }
    }

    /// Seconds left in the current reconnect backoff; `0` when connected or
    /// not currently retrying.
    pub fn reconnect_countdown_secs(&self) -> u64 {
        self.countdown_secs.load(Ordering::Relaxed)
    }

    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Runs `op` against a live connection (§4.5 `invoke`):
    /// 1. Obtains a connection via the injected `Connector` if none is live.
    /// 2. Runs `op(handle)`.
    /// 3. On a retryable (`Transport`-class) error, drops the connection and
    ///    retries unbounded, reconnecting with backoff.
    /// 4. Any other error is surfaced to the caller without retry.
    pub async fn invoke<T, F, Fut>(&self, op: F) -> CoreResult<T>
    where
        F: Fn(C::Handle) -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        loop {
            let handle = self.ensure_connected().await;
            match op(handle).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    tracing::warn!(%err, "proxy: transport error, dropping connection");
                    *self.conn.lock() = None;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn ensure_connected(&self) -> C::Handle {
        if let Some(handle) = self.conn.lock().clone() {
            return handle;
        }
        self.reconnect_with_backoff().await
    }

    async fn reconnect_with_backoff(&self) -> C::Handle {
        loop {
            match self.connector.connect().await {
                Ok(handle) => {
                    self.countdown_secs.store(0, Ordering::Relaxed);
                    *self.conn.lock() = Some(handle.clone());
                    return handle;
                }
                Err(err) => {
                    tracing::warn!(%err, secs = self.reconnect_interval.as_secs(), "proxy: reconnect failed, backing off");
                    self.countdown_secs.store(self.reconnect_interval.as_secs(), Ordering::Relaxed);
                    tokio::time::sleep(self.reconnect_interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "service_proxy_tests.rs"]
mod tests;
