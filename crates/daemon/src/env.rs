// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate. Separate
//! from the job configuration file (`pmtr-config`): these are knobs for the
//! supervisor's own runtime, not anything a job author writes.

use std::time::Duration;

/// Override the tick interval (normally [`pmtr_core::SHORT_DELAY`] seconds)
/// for faster iteration under test harnesses, without touching the
/// compiled-in constant every other timing calculation still uses.
pub fn timer_check_ms() -> Option<Duration> {
    std::env::var("PMTR_TIMER_CHECK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
