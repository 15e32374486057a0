// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

crate::define_uuid_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_uuid_id_is_unique() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn define_uuid_id_roundtrips_through_display_and_parse() {
    let id = TestId::new();
    let parsed: TestId = id.to_string().parse().expect("parse");
    assert_eq!(id, parsed);
}

#[test]
fn define_uuid_id_serde_roundtrip() {
    let id = TestId::new();
    let json = serde_json::to_string(&id).expect("serialize");
    let back: TestId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(id, back);
}

#[test]
fn task_id_zero_is_wildcard() {
    assert!(TaskId::WILDCARD.is_wildcard());
    assert!(TaskId(0).is_wildcard());
    assert!(!TaskId(1).is_wildcard());
}

#[test]
fn task_id_sequence_never_yields_zero_and_is_monotonic() {
    let mut seq = TaskIdSequence::new();
    let a = seq.next_id();
    let b = seq.next_id();
    let c = seq.next_id();
    assert_eq!(a, TaskId(1));
    assert_eq!(b, TaskId(2));
    assert_eq!(c, TaskId(3));
    assert!(a.0 > 0 && b.0 > 0 && c.0 > 0);
}
