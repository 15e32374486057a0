// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp script -f <file> [-l <lang>]` (§6 CLI surface): submits a file's
//! bytes as a new job's payload (`submitJob(payload, description)`) and
//! tracks the returned id locally under the next free index.

use std::path::{Path, PathBuf};

use crate::exit_error::ExitError;

pub async fn run(state_dir: &Path, file: PathBuf, lang: Option<String>) -> Result<(), ExitError> {
    let payload = std::fs::read(&file).map_err(|err| ExitError::new(1, format!("reading {}: {err}", file.display())))?;

    let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| file.display().to_string());
    let description = match &lang {
        Some(lang) => format!("script:{lang}:{name}"),
        None => format!("script:{name}"),
    };

    let mut state = super::load_state(state_dir)?;
    let client = super::client_from_state(&state)?;
    let job_id = client.submit_job_with_description(payload, description.clone()).await?;

    let index = state.track(job_id, description);
    super::save_state(state_dir, &state)?;

    println!("submitted job #{index} ({job_id})");
    Ok(())
}
