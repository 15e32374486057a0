// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local CLI state: the host this CLI is `connect`-ed to, and the small
//! index → job id table `stat`/`cancel` address jobs by (§6 CLI surface:
//! `stat [index]`, `cancel <index>`).
//!
//! Resolution order mirrors the daemon's own `OJ_STATE_DIR` precedent
//! (`examples/.../daemon/src/env.rs`): `DCP_STATE_DIR` env var, else the
//! platform state directory from `dirs`.

use std::path::PathBuf;

use dcp_core::JobId;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no usable state directory: set DCP_STATE_DIR")]
    NoStateDir,
    #[error("reading {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("writing {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("corrupt state file {0}: {1}")]
    Corrupt(PathBuf, serde_json::Error),
}

pub fn state_dir() -> Result<PathBuf, StateError> {
    if let Ok(dir) = std::env::var("DCP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::state_dir().or_else(dirs::data_local_dir).map(|dir| dir.join("dcp")).ok_or(StateError::NoStateDir)
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Connection {
    pub host: String,
    pub user: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TrackedJob {
    pub index: u32,
    pub job_id: JobId,
    pub description: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CliState {
    pub connection: Option<Connection>,
    pub jobs: Vec<TrackedJob>,
    /// Directory the last `sync` ran against — `verify` with no argument
    /// checks this one.
    pub last_sync_dir: Option<PathBuf>,
}

impl CliState {
    fn path(dir: &std::path::Path) -> PathBuf {
        dir.join("state.json")
    }

    pub fn load(dir: &std::path::Path) -> Result<Self, StateError> {
        let path = Self::path(dir);
        match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|err| StateError::Corrupt(path, err)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(StateError::Read(path, err)),
        }
    }

    pub fn save(&self, dir: &std::path::Path) -> Result<(), StateError> {
        std::fs::create_dir_all(dir).map_err(|err| StateError::Write(dir.to_path_buf(), err))?;
        let path = Self::path(dir);
        let text = serde_json::to_string_pretty(self).map_err(|err| StateError::Corrupt(path.clone(), err))?;
        std::fs::write(&path, text).map_err(|err| StateError::Write(path, err))
    }

    pub fn next_index(&self) -> u32 {
        self.jobs.iter().map(|j| j.index).max().map(|n| n + 1).unwrap_or(1)
    }

    pub fn track(&mut self, job_id: JobId, description: impl Into<String>) -> u32 {
        let index = self.next_index();
        self.jobs.push(TrackedJob { index, job_id, description: description.into() });
        index
    }

    pub fn job_by_index(&self, index: u32) -> Option<JobId> {
        self.jobs.iter().find(|j| j.index == index).map(|j| j.job_id)
    }

    pub fn retain_jobs(&mut self, keep: impl Fn(&TrackedJob) -> bool) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(keep);
        before - self.jobs.len()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
