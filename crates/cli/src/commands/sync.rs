// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp sync <dir>` (§6 CLI surface): uploads every class under `<dir>`
//! whose digest differs from (or is absent on) the server via
//! `setClassDefinition` (§4.1 code-cache `put`).

use std::path::Path;

use dcp_core::Digest;

use crate::exit_error::ExitError;

pub async fn run(state_dir: &Path, dir: &Path, verbose: bool) -> Result<(), ExitError> {
    let mut state = super::load_state(state_dir)?;
    let client = super::client_from_state(&state)?;

    let classes = super::local_classes(dir)?;
    let mut uploaded = 0;
    for (name, bytes) in classes {
        let local_digest = Digest::of(&bytes);
        let remote_digest = client.get_class_digest(&name).await?;
        if remote_digest == Some(local_digest) {
            if verbose {
                println!("{name}: up to date ({local_digest})");
            }
            continue;
        }
        client.set_class_definition(&name, bytes).await?;
        uploaded += 1;
        println!("{name}: uploaded ({local_digest})");
    }

    state.last_sync_dir = Some(dir.to_path_buf());
    super::save_state(state_dir, &state)?;

    println!("synced {uploaded} class(es)");
    Ok(())
}
