// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn request_tag_is_op_field() {
    let req = Request::RequestTask;
    let json = serde_json::to_value(&req).expect("serialize");
    assert_eq!(json["op"], "RequestTask");
}

#[test]
fn get_finished_tasks_roundtrips() {
    let req = Request::GetFinishedTasks {
        job_ids: vec![JobId::new(), JobId::new()],
        task_ids: vec![TaskId(1), TaskId(2)],
    };
    let json = serde_json::to_string(&req).expect("serialize");
    let back: Request = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(req, back);
}

#[test]
fn authenticate_carries_protocol_version() {
    let req = Request::Authenticate {
        user: "alice".into(),
        password: "secret".into(),
        protocol_version_id: crate::PROTOCOL_VERSION_ID,
    };
    let json = serde_json::to_string(&req).expect("serialize");
    let back: Request = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(req, back);
}
