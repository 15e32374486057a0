// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp stop` (§6 CLI surface): stops the `dcpd` process `start` launched.

use std::path::Path;

use crate::exit_error::ExitError;

pub fn run(state_dir: &Path) -> Result<(), ExitError> {
    let pidfile = state_dir.join("dcpd.pid");
    let pid = std::fs::read_to_string(&pidfile)
        .map_err(|_| ExitError::new(1, "dcpd is not running (no pidfile)"))?;
    let pid = pid.trim();

    let status = std::process::Command::new("kill")
        .args(["-TERM", pid])
        .status()
        .map_err(|err| ExitError::new(1, format!("sending SIGTERM to pid {pid}: {err}")))?;
    if !status.success() {
        return Err(ExitError::new(1, format!("no such process: pid {pid}")));
    }

    let _ = std::fs::remove_file(&pidfile);
    println!("dcpd stopped (pid {pid})");
    Ok(())
}
