// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_job_starts_in_new_state_with_indeterminate_progress() {
    let job = Job::new(JobId::new(), "build", 0);
    assert_eq!(job.state, JobState::New);
    assert_eq!(job.progress.fraction(), None);
    assert_eq!(job.priority, DEFAULT_PRIORITY);
}

#[test]
fn mark_complete_sets_progress_to_one() {
    let mut job = Job::builder().state(JobState::Running).build();
    job.mark_complete();
    assert_eq!(job.state, JobState::Complete);
    assert_eq!(job.progress.fraction(), Some(1.0));
}

#[test]
fn terminal_states_are_absorbing() {
    assert!(JobState::Complete.is_terminal());
    assert!(JobState::Cancelled.is_terminal());
    assert!(!JobState::New.is_terminal());
    assert!(!JobState::Running.is_terminal());
    assert!(!JobState::Stalled.is_terminal());
}

#[test]
fn cancelled_job_is_not_stalled_by_a_late_stall_signal() {
    let mut job = Job::builder().state(JobState::Cancelled).build();
    job.mark_stalled();
    assert_eq!(job.state, JobState::Cancelled);
}

#[test]
fn stall_and_recover_cycle() {
    let mut job = Job::builder().state(JobState::Running).build();
    job.mark_stalled();
    assert_eq!(job.state, JobState::Stalled);
    job.mark_running();
    assert_eq!(job.state, JobState::Running);
}

#[yare::parameterized(
    new_to_running = { JobState::New, false },
    running = { JobState::Running, false },
    stalled = { JobState::Stalled, false },
    complete = { JobState::Complete, true },
    cancelled = { JobState::Cancelled, true },
)]
fn is_terminal_matches_table(state: JobState, expected: bool) {
    assert_eq!(state.is_terminal(), expected);
}
