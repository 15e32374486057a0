// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the wire codec itself, as distinct from the
//! application-level errors carried *inside* a [`crate::Response::Error`]
//! payload (those are `dcp_core::CoreError`, serialized as data).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message of {0} bytes exceeds the {1}-byte frame limit")]
    FrameTooLarge(usize, usize),

    #[error("protocol version mismatch: peer sent {0:#034x}, expected {1:#034x}")]
    VersionMismatch(u128, u128),
}
