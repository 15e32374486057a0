// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn response_tag_is_type_field() {
    let json = serde_json::to_value(Response::Ok).expect("serialize");
    assert_eq!(json["type"], "Ok");
}

#[test]
fn transport_error_maps_to_retryable_kind() {
    let err = CoreError::Transport("connection reset".into());
    let resp = Response::from(&err);
    match resp {
        Response::Error { kind, retryable, .. } => {
            assert_eq!(kind, "Transport");
            assert!(retryable);
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[test]
fn illegal_argument_is_not_retryable() {
    let err = CoreError::IllegalArgument("unknown job".into());
    let resp = Response::from(&err);
    match resp {
        Response::Error { retryable, .. } => assert!(!retryable),
        other => panic!("expected Error, got {other:?}"),
    }
}
