// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failures from the durable backing (§4.1 Storage). Cache misses are not
/// errors — `getDefinition` returns `None` on miss, per the contract.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt cache snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("compression error: {0}")]
    Compression(String),
}
