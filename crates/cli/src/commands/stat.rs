// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp stat [index]` (§6 CLI surface): reports status for jobs this CLI
//! has submitted (via `script`), keyed by the small local index those
//! submissions were assigned — the wire protocol itself has no "list all
//! jobs" operation (§6), so the CLI is the one keeping the index.

use std::io::Write;
use std::path::Path;

use dcp_core::JobStatus;
use serde::Serialize;

use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Serialize)]
struct Row {
    index: u32,
    job_id: String,
    description: String,
    state: String,
    progress: Option<f64>,
    status: String,
}

fn row(index: u32, description: &str, status: &JobStatus) -> Row {
    Row {
        index,
        job_id: status.job_id.to_string(),
        description: description.to_string(),
        state: status.state.to_string(),
        progress: status.progress.fraction(),
        status: status.status.clone(),
    }
}

pub async fn run(state_dir: &Path, index: Option<u32>, format: OutputFormat) -> Result<(), ExitError> {
    let state = super::load_state(state_dir)?;
    let client = super::client_from_state(&state)?;

    if let Some(index) = index {
        let job_id = state
            .job_by_index(index)
            .ok_or_else(|| ExitError::new(1, format!("no tracked job with index {index}")))?;
        let description = state.jobs.iter().find(|j| j.index == index).map(|j| j.description.as_str()).unwrap_or("");
        let status = client.get_job_status(job_id).await?;
        let row = row(index, description, &status);
        return format_or_json(format, &row, || {
            println!(
                "#{} {} [{}] progress={} — {}",
                row.index,
                row.job_id,
                row.state,
                row.progress.map(|f| format!("{:.0}%", f * 100.0)).unwrap_or_else(|| "?".into()),
                row.status
            );
        });
    }

    let mut rows = Vec::with_capacity(state.jobs.len());
    for tracked in &state.jobs {
        let status = client.get_job_status(tracked.job_id).await?;
        rows.push(row(tracked.index, &tracked.description, &status));
    }

    handle_list(format, &rows, "No tracked jobs", |rows, out| {
        for row in rows {
            let _ = writeln!(
                out,
                "#{} {} [{}] progress={} — {}",
                row.index,
                row.job_id,
                row.state,
                row.progress.map(|f| format!("{:.0}%", f * 100.0)).unwrap_or_else(|| "?".into()),
                row.status
            );
        }
    })
}
