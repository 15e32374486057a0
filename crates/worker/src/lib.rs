// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The worker host: Worker Pool (C7), Completion Poller (C8), and Courtesy
//! Monitor (C9) — §4.6, §4.7, §4.8.

pub mod courtesy;
pub mod plugin;
pub mod poller;
pub mod pool;
pub mod progress;
pub mod remote;
pub mod service;

pub use courtesy::{AsyncCourtesyMonitor, CourtesyMonitor, PollingCourtesyMonitor, Unconditional};
pub use plugin::{PluginRegistry, TaskPlugin};
pub use poller::CompletionPoller;
pub use pool::WorkerPool;
pub use progress::ProgressMonitor;
pub use remote::{RemoteWorkerService, RequestChannel};
pub use service::WorkerService;
