// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Reconnecting Service Proxy (C6, §4.5): the retry-with-backoff wrapper
//! used by workers, hubs, and the CLI to talk to a remote server without
//! surfacing transient connection loss to their own callers.

mod connector;
mod service_proxy;
mod wire_connector;

pub use connector::Connector;
pub use service_proxy::{ReconnectingServiceProxy, DEFAULT_RECONNECT_INTERVAL_SECS};
pub use wire_connector::{wire_error, TcpConnector, WireHandle};
