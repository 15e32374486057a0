// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp clean` (§6 CLI surface): drops terminal jobs from the local
//! tracking table. Does not touch server state — a terminal job's class
//! snapshot is already released server-side (§3 Lifecycle).

use std::path::Path;

use crate::exit_error::ExitError;

pub async fn run(state_dir: &Path) -> Result<(), ExitError> {
    let mut state = super::load_state(state_dir)?;
    let client = super::client_from_state(&state)?;

    let mut terminal = Vec::with_capacity(state.jobs.len());
    for tracked in &state.jobs {
        let status = client.get_job_status(tracked.job_id).await?;
        terminal.push((tracked.index, status.state.is_terminal()));
    }
    let terminal_indices: std::collections::HashSet<u32> =
        terminal.into_iter().filter(|(_, is_terminal)| *is_terminal).map(|(index, _)| index).collect();

    let removed = state.retain_jobs(|job| !terminal_indices.contains(&job.index));
    super::save_state(state_dir, &state)?;

    println!("cleaned {removed} terminal job(s)");
    Ok(())
}
