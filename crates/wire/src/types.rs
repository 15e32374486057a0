// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handshake types shared by every wire-facing crate (§6 Authentication
//! handshake).

use serde::{Deserialize, Serialize};

/// Fixed 128-bit constant the handshake compares against. A mismatch fails
/// with `ProtocolVersion` before any other request is accepted.
pub const PROTOCOL_VERSION_ID: u128 = 0x4a44_4350_0001_0000_0000_0000_0000_0001;

/// Registry name the authentication service is bound under (§6).
pub const AUTHENTICATION_SERVICE: &str = dcp_core::AUTH_SERVICE_NAME;

/// Opaque token returned by a successful `authenticate` call. Subsequent
/// requests on the same connection are implicitly scoped to it; the wire
/// contract does not thread it through every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHandle(pub String);

impl ServiceHandle {
    pub fn new(session: impl Into<String>) -> Self {
        Self(session.into())
    }
}
