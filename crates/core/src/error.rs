// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across the wire boundary (§7).
//!
//! Every crate that sits at an RPC edge converts its own errors into
//! [`CoreError`] before they cross the wire, so the vocabulary callers see
//! is uniform regardless of which component raised it.

use thiserror::Error;

/// The error kinds named in §7 ERROR HANDLING DESIGN.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Caller-provided id is unknown, or inputs are inconsistent
    /// (e.g. mismatched array lengths in `getFinishedTasks`).
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// Missing credentials or insufficient privileges.
    #[error("security error: {0}")]
    Security(String),

    /// Handshake protocol version mismatch. Surfaced; terminal.
    #[error("protocol version mismatch: {0}")]
    ProtocolVersion(String),

    /// Connection lost, EOF mid-unmarshal, host unknown. Recovered by the
    /// Reconnecting Service Proxy with retry; should never be surfaced to a
    /// caller in steady state — seeing this variant past the proxy boundary
    /// indicates the retry loop gave up (e.g. on thread interruption).
    #[error("transport error: {0}")]
    Transport(String),

    /// Wraps any error raised by the user-supplied job object. Recorded
    /// against the job; may transition it to a failed/cancelled state
    /// depending on the server's consecutive-exception policy (§4.4).
    #[error("job execution error: {0}")]
    JobExecution(String),

    /// The hub could not reach the upstream that owns a jobId.
    #[error("delegation error: upstream unreachable for job {0}")]
    Delegation(String),

    /// Code-cache miss at deserialization time.
    #[error("class not found: {0}")]
    ClassNotFound(String),
}

impl CoreError {
    /// True for the transport-class errors a Reconnecting Service Proxy
    /// retries on (§4.5 item 3): connection reset, no-such-object,
    /// unmarshal-with-EOF, unknown host.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Transport(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
