// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp verify` (§6 CLI surface): the read-only half of `sync` — reports
//! drift against the server without uploading anything. Defaults to the
//! directory the last `sync` ran against when no `--dir` is given.

use std::path::{Path, PathBuf};

use dcp_core::Digest;

use crate::exit_error::ExitError;

pub async fn run(state_dir: &Path, dir: Option<PathBuf>) -> Result<(), ExitError> {
    let state = super::load_state(state_dir)?;
    let client = super::client_from_state(&state)?;

    let dir = dir
        .or_else(|| state.last_sync_dir.clone())
        .ok_or_else(|| ExitError::new(1, "no directory given and no prior `sync` to verify against"))?;
    let dir = dir.as_path();

    let classes = super::local_classes(dir)?;
    let mut drifted = 0;
    for (name, bytes) in classes {
        let local_digest = Digest::of(&bytes);
        match client.get_class_digest(&name).await? {
            Some(remote) if remote == local_digest => println!("{name}: in sync ({local_digest})"),
            Some(remote) => {
                println!("{name}: DRIFTED (local {local_digest}, server {remote})");
                drifted += 1;
            }
            None => {
                println!("{name}: MISSING on server");
                drifted += 1;
            }
        }
    }

    if drifted > 0 {
        return Err(ExitError::new(1, format!("{drifted} class(es) out of sync")));
    }
    println!("all classes in sync");
    Ok(())
}
