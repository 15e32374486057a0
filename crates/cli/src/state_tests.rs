// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use dcp_core::JobId;

use super::*;

#[test]
fn load_of_missing_file_is_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = CliState::load(dir.path()).expect("load");
    assert!(state.connection.is_none());
    assert!(state.jobs.is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut state = CliState::default();
    state.connection = Some(Connection { host: "localhost:5327".into(), user: "alice".into() });
    let index = state.track(JobId::new(), "script:demo.wasm");

    state.save(dir.path()).expect("save");
    let loaded = CliState::load(dir.path()).expect("load");

    assert_eq!(loaded.connection.unwrap().host, "localhost:5327");
    assert_eq!(loaded.jobs.len(), 1);
    assert_eq!(loaded.jobs[0].index, index);
}

#[test]
fn next_index_increments_from_the_highest_tracked() {
    let mut state = CliState::default();
    assert_eq!(state.next_index(), 1);
    state.track(JobId::new(), "a");
    state.track(JobId::new(), "b");
    assert_eq!(state.next_index(), 3);
}

#[test]
fn job_by_index_finds_and_misses() {
    let mut state = CliState::default();
    let job_id = JobId::new();
    let index = state.track(job_id, "a");
    assert_eq!(state.job_by_index(index), Some(job_id));
    assert_eq!(state.job_by_index(index + 1), None);
}

#[test]
fn retain_jobs_drops_only_the_rejected_ones() {
    let mut state = CliState::default();
    let keep = state.track(JobId::new(), "keep");
    let drop = state.track(JobId::new(), "drop");

    let removed = state.retain_jobs(|job| job.index != drop);

    assert_eq!(removed, 1);
    assert_eq!(state.jobs.len(), 1);
    assert_eq!(state.jobs[0].index, keep);
}
