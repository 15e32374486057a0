// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Connector` trait injected into a [`crate::ReconnectingServiceProxy`]
//! (§4.5).

use async_trait::async_trait;
use dcp_core::CoreResult;

/// Produces a fresh connection handle on demand. A single `connect()` call
/// is one attempt; the proxy itself owns the retry-with-backoff loop
/// between attempts (§4.5).
#[async_trait]
pub trait Connector: Send + Sync {
    /// A cheaply-cloneable handle to the live connection (e.g. an `Arc`-
    /// wrapped socket or an RPC stub). Cloned so a copy can be handed to
    /// the in-flight `op` closure while the original stays cached.
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self) -> CoreResult<Self::Handle>;
}
