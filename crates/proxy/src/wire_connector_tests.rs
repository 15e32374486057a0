// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dcp_wire::ServiceHandle;
use tokio::net::TcpListener;

/// Spawns a one-shot echo-style server: authenticates, then replies `Ok` to
/// anything else, and closes after `replies` responses.
async fn spawn_fake_server(replies: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        for i in 0..replies {
            let req: Request = match dcp_wire::read_request(&mut stream).await {
                Ok(r) => r,
                Err(_) => break,
            };
            let resp = if i == 0 {
                match req {
                    Request::Authenticate { .. } => {
                        Response::Authenticated { handle: ServiceHandle::new("session-1") }
                    }
                    _ => Response::Error { kind: "IllegalArgument".into(), message: "expected auth first".into(), retryable: false },
                }
            } else {
                Response::Ok
            };
            dcp_wire::write_response(&mut stream, &resp).await.expect("write response");
        }
    });

    addr
}

#[tokio::test]
async fn connect_performs_handshake_and_returns_usable_handle() {
    let addr = spawn_fake_server(2).await;
    let connector = TcpConnector::new(addr, "alice", "hunter2");

    let handle = connector.connect().await.expect("connect succeeds");
    let reply = handle.call(&Request::RequestTask).await.expect("call succeeds");
    assert_eq!(reply, Response::Ok);
}

#[tokio::test]
async fn connect_fails_when_port_unreachable() {
    let connector = TcpConnector::new("127.0.0.1:1", "alice", "hunter2");
    let err = connector.connect().await.expect_err("connection refused");
    assert!(matches!(err, CoreError::Transport(_)));
}

#[test]
fn wire_error_maps_known_kinds_and_falls_back_to_transport() {
    let err = wire_error("ClassNotFound".into(), "missing".into(), false);
    assert!(matches!(err, CoreError::ClassNotFound(_)));

    let unknown = wire_error("SomethingNew".into(), "oops".into(), true);
    assert!(matches!(unknown, CoreError::Transport(_)));
}
