//! Scenario 6: a job that exits immediately is throttled to at most one
//! restart per `SHORT_DELAY`, not a tight respawn loop.

use crate::prelude::*;
use std::time::Duration;

#[test]
fn immediate_exit_is_throttled() {
    let daemon = Daemon::start("job { name bad  cmd /bin/false }");

    std::thread::sleep(Duration::from_secs(10));

    let starts = count_job_starts(&daemon.log(), "bad");
    let max_allowed = 10u64.div_ceil(pmtr_core::SHORT_DELAY) as usize + 1;
    assert!(
        starts >= 1 && starts <= max_allowed,
        "expected between 1 and {max_allowed} spawns over 10s, got {starts}\nlog:\n{}",
        daemon.log()
    );
}
