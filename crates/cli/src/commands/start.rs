// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp start [--port P]` (§6 CLI surface): launches this host's own
//! `dcpd` process in the background and records its pid for `stop`.

use std::path::Path;

use crate::exit_error::ExitError;

fn pidfile(state_dir: &Path) -> std::path::PathBuf {
    state_dir.join("dcpd.pid")
}

pub fn run(state_dir: &Path, port: Option<u16>) -> Result<(), ExitError> {
    let pidfile = pidfile(state_dir);
    if pidfile.exists() {
        return Err(ExitError::new(1, "dcpd already running (stale or live pidfile present); run `dcp stop` first"));
    }
    std::fs::create_dir_all(state_dir)
        .map_err(|err| ExitError::new(1, format!("creating {}: {err}", state_dir.display())))?;

    let mut cmd = std::process::Command::new("dcpd");
    cmd.arg("--state-dir").arg(state_dir);
    if let Some(port) = port {
        cmd.arg("--port").arg(port.to_string());
    }
    let child = cmd.spawn().map_err(|err| ExitError::new(1, format!("spawning dcpd: {err}")))?;

    std::fs::write(&pidfile, child.id().to_string())
        .map_err(|err| ExitError::new(1, format!("writing {}: {err}", pidfile.display())))?;

    println!("dcpd started (pid {})", child.id());
    Ok(())
}
