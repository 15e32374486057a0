// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A [`Connector`] that dials a TCP endpoint and performs the §6 auth
//! handshake, producing a [`WireHandle`] that sends one [`Request`] and
//! reads back one [`Response`] at a time.

use std::sync::Arc;

use async_trait::async_trait;
use dcp_core::CoreError;
use dcp_wire::{decode, encode, read_message, write_message, Request, Response, PROTOCOL_VERSION_ID};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::connector::Connector;

fn transport<E: std::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> CoreError {
    move |err| CoreError::Transport(format!("{what}: {err}"))
}

/// Dials `addr` and authenticates as `user`/`password` on every connect
/// attempt; the resulting handle is a fresh, already-authenticated stream.
pub struct TcpConnector {
    pub addr: String,
    pub user: String,
    pub password: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { addr: addr.into(), user: user.into(), password: password.into() }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Handle = WireHandle;

    async fn connect(&self) -> Result<WireHandle, CoreError> {
        let stream = TcpStream::connect(&self.addr).await.map_err(transport("connect"))?;
        let handle = WireHandle { stream: Arc::new(Mutex::new(stream)) };
        let auth = Request::Authenticate {
            user: self.user.clone(),
            password: self.password.clone(),
            protocol_version_id: PROTOCOL_VERSION_ID,
        };
        match handle.call(&auth).await? {
            Response::Authenticated { .. } => Ok(handle),
            Response::Error { kind, message, retryable } => Err(wire_error(kind, message, retryable)),
            other => Err(CoreError::Transport(format!("unexpected handshake reply: {other:?}"))),
        }
    }
}

/// One live, authenticated connection. Calls are serialized with an
/// internal lock since the wire protocol is strictly request/response —
/// concurrent callers share the handle but take turns on the socket.
#[derive(Clone)]
pub struct WireHandle {
    stream: Arc<Mutex<TcpStream>>,
}

impl WireHandle {
    pub async fn call(&self, request: &Request) -> Result<Response, CoreError> {
        let mut stream = self.stream.lock().await;
        send_request(&mut *stream, request).await?;
        recv_response(&mut *stream).await
    }
}

async fn send_request<W: AsyncWrite + Unpin>(writer: &mut W, request: &Request) -> Result<(), CoreError> {
    let payload = encode(request).map_err(transport("encode request"))?;
    write_message(writer, &payload).await.map_err(transport("write request"))
}

async fn recv_response<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Response, CoreError> {
    let payload = read_message(reader).await.map_err(transport("read response"))?;
    decode(&payload).map_err(transport("decode response"))
}

/// Converts a wire-carried error back into a [`CoreError`] of the matching
/// kind, so a caller sees the same vocabulary it would locally.
pub fn wire_error(kind: String, message: String, retryable: bool) -> CoreError {
    let err = match kind.as_str() {
        "IllegalArgument" => CoreError::IllegalArgument(message),
        "Security" => CoreError::Security(message),
        "ProtocolVersion" => CoreError::ProtocolVersion(message),
        "JobExecution" => CoreError::JobExecution(message),
        "Delegation" => CoreError::Delegation(message),
        "ClassNotFound" => CoreError::ClassNotFound(message),
        _ => CoreError::Transport(message),
    };
    if retryable && !err.is_retryable() {
        return CoreError::Transport(err.to_string());
    }
    err
}

#[cfg(test)]
#[path = "wire_connector_tests.rs"]
mod tests;
