// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use dcp_core::Progress;

use super::ProgressSink;

#[test]
fn defaults_to_indeterminate() {
    let sink = ProgressSink::default();
    assert_eq!(sink.current(), Progress::Indeterminate);
}

#[test]
fn report_overwrites_current() {
    let sink = ProgressSink::default();
    sink.report(Progress::Fraction(0.25));
    assert_eq!(sink.current(), Progress::Fraction(0.25));
    sink.report(Progress::complete());
    assert_eq!(sink.current(), Progress::Fraction(1.0));
}
