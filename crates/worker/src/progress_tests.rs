// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::courtesy::Unconditional;

#[tokio::test]
async fn cancel_is_sticky_and_visible_after_report() {
    let monitor = ProgressMonitor::new(Arc::new(Unconditional));
    assert!(!monitor.report().await);

    monitor.set_cancel_pending();
    assert!(monitor.report().await);
    assert!(monitor.cancel_pending());
}
