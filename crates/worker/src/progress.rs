// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress monitor handed to a running [`crate::plugin::TaskPlugin`]
//! (§4.6). Carries the sticky cancellation signal the Completion Poller
//! (C8) sets, and gates every report behind the Courtesy Monitor (C9).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::courtesy::CourtesyMonitor;

/// One per dispatched task. A plugin is expected to call
/// [`ProgressMonitor::report`] periodically; each call first awaits the
/// courtesy gate, then exposes whether cancellation is pending.
pub struct ProgressMonitor {
    cancel_pending: AtomicBool,
    courtesy: Arc<dyn CourtesyMonitor>,
}

impl ProgressMonitor {
    pub fn new(courtesy: Arc<dyn CourtesyMonitor>) -> Self {
        Self { cancel_pending: AtomicBool::new(false), courtesy }
    }

    /// Set by the pool when the Completion Poller reports this task as
    /// finished-elsewhere or cancelled server-side. Sticky: once set, stays
    /// set for the remainder of the task's execution (§4.6 "Cancellation").
    pub fn set_cancel_pending(&self) {
        self.cancel_pending.store(true, Ordering::SeqCst);
    }

    pub fn cancel_pending(&self) -> bool {
        self.cancel_pending.load(Ordering::SeqCst)
    }

    /// Blocks on the courtesy gate, then reports whether the caller should
    /// abandon its work. A plugin that never calls this runs to completion
    /// regardless of cancellation (§4.6: cancellation is cooperative).
    pub async fn report(&self) -> bool {
        self.courtesy.wait_for().await;
        self.cancel_pending()
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
