// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp disconnect --host` (§6 CLI surface).

use std::path::Path;

use crate::exit_error::ExitError;

pub fn run(state_dir: &Path, host: Option<String>) -> Result<(), ExitError> {
    let mut state = super::load_state(state_dir)?;
    let Some(conn) = state.connection.as_ref() else {
        return Err(ExitError::new(1, "not connected"));
    };
    if let Some(host) = &host {
        if host != &conn.host {
            return Err(ExitError::new(1, format!("not connected to {host} (connected to {})", conn.host)));
        }
    }

    let host = state.connection.take().map(|c| c.host).unwrap_or_default();
    super::save_state(state_dir, &state)?;
    println!("disconnected from {host}");
    Ok(())
}
