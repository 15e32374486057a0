// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp cancel <index>` (§6 CLI surface).

use std::path::Path;

use crate::exit_error::ExitError;

pub async fn run(state_dir: &Path, index: u32) -> Result<(), ExitError> {
    let state = super::load_state(state_dir)?;
    let client = super::client_from_state(&state)?;

    let job_id = state.job_by_index(index).ok_or_else(|| ExitError::new(1, format!("no tracked job with index {index}")))?;
    client.cancel_job(job_id).await?;

    println!("cancelled job #{index} ({job_id})");
    Ok(())
}
