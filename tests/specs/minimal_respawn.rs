//! Scenario 1: a bare job with no `once`/`wait` respawns roughly once per
//! `SHORT_DELAY` once it exits.

use crate::prelude::*;
use std::time::Duration;

#[test]
fn minimal_job_respawns_within_bounds() {
    let daemon = Daemon::start("job { name t  cmd /bin/true }");

    std::thread::sleep(Duration::from_secs(3 * pmtr_core::SHORT_DELAY) + Duration::from_secs(2));

    let starts = count_job_starts(&daemon.log(), "t");
    assert!(
        (2..=4).contains(&starts),
        "expected 2-4 spawns over 3*SHORT_DELAY, got {starts}\nlog:\n{}",
        daemon.log()
    );
}
