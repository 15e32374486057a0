// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn idle_directive_has_no_job_id_and_wildcard_task_id() {
    let idle = TaskDescription::idle(30);
    assert!(idle.is_idle());
    assert_eq!(idle.job_id, None);
    assert!(idle.task_id.is_wildcard());
    assert_eq!(idle.idle_seconds(), Some(30));
}

#[test]
fn real_task_is_not_idle() {
    let task = TaskDescription::for_task(JobId::new(), TaskId(7), vec![1, 2, 3]);
    assert!(!task.is_idle());
    assert_eq!(task.idle_seconds(), None);
}

#[test]
fn task_record_starts_undispatched() {
    let record = TaskRecord::new(TaskId(1), vec![]);
    assert!(!record.dispatched);
}
