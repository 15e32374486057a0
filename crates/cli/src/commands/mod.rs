// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per §6 CLI surface command.

pub mod cancel;
pub mod clean;
pub mod connect;
pub mod disconnect;
pub mod idle;
pub mod script;
pub mod stat;
pub mod start;
pub mod stop;
pub mod sync;
pub mod verify;

use std::path::Path;

use crate::client::DcpClient;
use crate::exit_error::ExitError;
use crate::state::CliState;

/// Builds a client from the locally stored `connect`-ion, or fails with the
/// same "not connected" message every op-needing command should show.
///
/// Only `host`/`user` are persisted, never the password — the handshake
/// only validates that `user` is non-empty (§1 Non-goals: no real
/// credential backend), so re-authenticating with an empty password on
/// every subsequent command is just as good as remembering the real one.
pub fn client_from_state(state: &CliState) -> Result<DcpClient, ExitError> {
    let conn = state
        .connection
        .as_ref()
        .ok_or_else(|| ExitError::new(1, "not connected; run `dcp connect --host <host> --user <user> --pass <password>` first"))?;
    Ok(DcpClient::new(conn.host.clone(), conn.user.clone(), String::new()))
}

pub fn load_state(dir: &Path) -> Result<CliState, ExitError> {
    CliState::load(dir).map_err(|err| ExitError::new(1, err.to_string()))
}

pub fn save_state(dir: &Path, state: &CliState) -> Result<(), ExitError> {
    state.save(dir).map_err(|err| ExitError::new(1, err.to_string()))
}

/// Reads every regular file directly under `dir` as one class, named for
/// its file stem — the local half of `sync`/`verify`'s digest comparison.
pub fn local_classes(dir: &Path) -> Result<Vec<(String, Vec<u8>)>, ExitError> {
    let entries =
        std::fs::read_dir(dir).map_err(|err| ExitError::new(1, format!("reading {}: {err}", dir.display())))?;
    let mut classes = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| ExitError::new(1, format!("reading {}: {err}", dir.display())))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else { continue };
        let bytes = std::fs::read(&path).map_err(|err| ExitError::new(1, format!("reading {}: {err}", path.display())))?;
        classes.push((name, bytes));
    }
    classes.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(classes)
}
