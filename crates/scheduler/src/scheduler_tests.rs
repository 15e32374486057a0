// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dcp_core::JobId;

fn submit(scheduler: &TaskScheduler, job_id: JobId, priority: i32, tasks: usize) {
    scheduler.register_job(job_id, priority);
    for i in 0..tasks {
        scheduler.add(job_id, vec![i as u8]).expect("registered job");
    }
}

/// Scenario 1: two-job round-robin at equal priority.
#[test]
fn scenario_two_job_round_robin() {
    let scheduler = TaskScheduler::new();
    let j1 = JobId::new();
    let j2 = JobId::new();
    submit(&scheduler, j1, 20, 3);
    submit(&scheduler, j2, 20, 3);

    let job_ids: Vec<JobId> = (0..6).map(|_| scheduler.next_task().expect("task available").job_id).collect();
    assert_eq!(job_ids, vec![j1, j2, j1, j2, j1, j2]);
}

/// Scenario 2: priority preemption mid-stream.
#[test]
fn scenario_priority_preemption() {
    let scheduler = TaskScheduler::new();
    let j1 = JobId::new();
    let j2 = JobId::new();
    submit(&scheduler, j1, 20, 3);
    submit(&scheduler, j2, 20, 3);

    assert_eq!(scheduler.next_task().expect("task").job_id, j1);
    assert_eq!(scheduler.next_task().expect("task").job_id, j2);

    scheduler.set_priority(j2, 50).expect("known job");

    let remaining: Vec<JobId> = (0..4).map(|_| scheduler.next_task().expect("task").job_id).collect();
    assert_eq!(remaining, vec![j2, j2, j1, j1]);
}

/// P1: scheduler fairness across k distinct same-priority jobs.
#[test]
fn fairness_across_many_equal_priority_jobs() {
    let scheduler = TaskScheduler::new();
    let jobs: Vec<JobId> = (0..5).map(|_| JobId::new()).collect();
    for &job in &jobs {
        submit(&scheduler, job, 20, 10);
    }

    let seen: Vec<JobId> = (0..jobs.len()).map(|_| scheduler.next_task().expect("task").job_id).collect();
    assert_eq!(seen, jobs, "first round must visit jobs in creation order, one task each");
}

/// P2: priority dominance.
#[test]
fn priority_dominance() {
    let scheduler = TaskScheduler::new();
    let high = JobId::new();
    let low = JobId::new();
    submit(&scheduler, low, 20, 5);
    submit(&scheduler, high, 50, 5);

    assert_eq!(scheduler.next_task().expect("task").job_id, high);
}

#[test]
fn exhausted_job_is_popped_until_refilled() {
    let scheduler = TaskScheduler::new();
    let job = JobId::new();
    submit(&scheduler, job, 20, 1);

    assert!(scheduler.next_task().is_some());
    assert!(scheduler.next_task().is_none(), "registry is empty, job should be popped");

    scheduler.add(job, b"more".to_vec()).expect("known job");
    assert_eq!(scheduler.next_task().expect("refilled").job_id, job);
}

#[test]
fn remove_job_drops_its_outstanding_tasks() {
    let scheduler = TaskScheduler::new();
    let job = JobId::new();
    submit(&scheduler, job, 20, 3);
    scheduler.remove_job(job);
    assert_eq!(scheduler.next_task(), None);
}

#[test]
fn add_to_unknown_job_is_illegal_argument() {
    let scheduler = TaskScheduler::new();
    let err = scheduler.add(JobId::new(), vec![]).unwrap_err();
    assert!(matches!(err, dcp_core::CoreError::IllegalArgument(_)));
}

#[test]
fn remove_then_resubmit_result_is_idempotent_removal() {
    let scheduler = TaskScheduler::new();
    let job = JobId::new();
    scheduler.register_job(job, 20);
    let task_id = scheduler.add(job, b"payload".to_vec()).expect("known job");

    assert_eq!(scheduler.remove(job, task_id), Some(b"payload".to_vec()));
    assert_eq!(scheduler.remove(job, task_id), None);
}
