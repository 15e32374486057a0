// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp idle <seconds>` (§6 CLI surface): `setIdleTime`.

use std::path::Path;

use crate::exit_error::ExitError;

pub async fn run(state_dir: &Path, seconds: u64) -> Result<(), ExitError> {
    let state = super::load_state(state_dir)?;
    let client = super::client_from_state(&state)?;
    client.set_idle_time(seconds).await?;
    println!("idle directive set to {seconds}s");
    Ok(())
}
