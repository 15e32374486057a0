// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML-deserializable configuration for each host role.
//!
//! Defaults mirror the wire-level defaults named in §6/§7: registry/RPC port
//! 5327, reconnect interval 60s, finished-task poll interval 10s.

use serde::{Deserialize, Serialize};

/// The default registry *and* RPC port (§6).
pub const DEFAULT_PORT: u16 = 5327;

/// Registry name the authentication service is bound under (§6).
pub const AUTH_SERVICE_NAME: &str = "AuthenticationService";

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_priority() -> i32 {
    20
}

fn default_reconnect_secs() -> u64 {
    60
}

fn default_poll_secs() -> u64 {
    10
}

fn default_max_workers() -> usize {
    8
}

fn default_max_consecutive_exceptions() -> u32 {
    0
}

/// Configuration for a server host (C5 Job Manager + wire listener).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Default job priority when none is specified (§3).
    pub default_priority: i32,
    /// Target number of in-flight tasks the production pump keeps queued
    /// per job (§4.4: "bounded by an implementation-chosen in-flight
    /// target").
    pub in_flight_target: usize,
    /// Consecutive job-object exceptions before the job is marked
    /// Cancelled. Default 0 = fail-fast (§4.4).
    pub max_consecutive_exceptions: u32,
    /// Seconds a worker is told to sleep when `requestTask()` finds no
    /// outstanding task anywhere; runtime-adjustable via `SetIdleTime`
    /// (§6).
    pub idle_directive_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            default_priority: default_priority(),
            in_flight_target: 4,
            max_consecutive_exceptions: default_max_consecutive_exceptions(),
            idle_directive_secs: 30,
        }
    }
}

/// Configuration for a worker host (C7/C8/C9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub max_workers: usize,
    /// Reconnecting Service Proxy backoff between failed connect attempts
    /// (§4.5, default 60s).
    pub reconnect_interval_secs: u64,
    /// Completion Poller tick interval (§4.7, default 10s).
    pub finished_task_poll_interval_secs: u64,
    /// Idle backoff after an exception resolving or executing a task (§4.6).
    pub exception_idle_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            reconnect_interval_secs: default_reconnect_secs(),
            finished_task_poll_interval_secs: default_poll_secs(),
            exception_idle_secs: 5,
        }
    }
}

/// Configuration for a hub host (C10).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub port: u16,
    pub reconnect_interval_secs: u64,
    /// Aggregated completion-poll interval against upstreams (§4.9, 10s).
    pub completion_poll_interval_secs: u64,
    /// Seconds the hub tells a downstream worker to sleep when every
    /// upstream is idle.
    pub idle_directive_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            reconnect_interval_secs: default_reconnect_secs(),
            completion_poll_interval_secs: default_poll_secs(),
            idle_directive_secs: 30,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
