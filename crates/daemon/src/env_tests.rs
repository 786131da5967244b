// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn timer_check_ms_absent_by_default() {
    std::env::remove_var("PMTR_TIMER_CHECK_MS");
    assert_eq!(timer_check_ms(), None);
}

#[test]
#[serial]
fn timer_check_ms_parses_a_set_value() {
    std::env::set_var("PMTR_TIMER_CHECK_MS", "250");
    assert_eq!(timer_check_ms(), Some(Duration::from_millis(250)));
    std::env::remove_var("PMTR_TIMER_CHECK_MS");
}

#[test]
#[serial]
fn timer_check_ms_ignores_garbage() {
    std::env::set_var("PMTR_TIMER_CHECK_MS", "not-a-number");
    assert_eq!(timer_check_ms(), None);
    std::env::remove_var("PMTR_TIMER_CHECK_MS");
}
