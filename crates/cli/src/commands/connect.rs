// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcp connect --host --user --pass` (§6 CLI surface).

use std::path::Path;

use crate::client::DcpClient;
use crate::exit_error::ExitError;
use crate::state::Connection;

pub async fn run(state_dir: &Path, host: String, user: String, password: String) -> Result<(), ExitError> {
    let client = DcpClient::new(&host, &user, password);
    // No dedicated ping op (§6): a cheap, side-effect-free call is enough to
    // drive the handshake and surface a bad host/protocol mismatch now
    // rather than on the first real command.
    client.get_class_digest("__dcp_cli_connect_probe__").await?;

    let mut state = super::load_state(state_dir)?;
    state.connection = Some(Connection { host: host.clone(), user });
    super::save_state(state_dir, &state)?;

    println!("connected to {host}");
    Ok(())
}
