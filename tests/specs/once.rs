//! Scenario 2: a `once` job runs exactly once across the daemon's lifetime,
//! even after several `SHORT_DELAY` windows have passed.

use crate::prelude::*;
use std::time::Duration;

#[test]
fn once_job_never_respawns() {
    let daemon = Daemon::start("job { name seed  cmd /bin/true  once }");

    std::thread::sleep(Duration::from_secs(2 * pmtr_core::SHORT_DELAY));

    assert_eq!(
        count_job_starts(&daemon.log(), "seed"),
        1,
        "log:\n{}",
        daemon.log()
    );
}
