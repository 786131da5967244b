//! Scenario 4: a SIGHUP-triggered rescan preserves a running job's pid when
//! the definition is unchanged, and restarts it under a new pid when the
//! definition changes.

use crate::prelude::*;

#[test]
fn unchanged_definition_keeps_pid_across_rescan() {
    let daemon = Daemon::start("job { name srv  cmd /bin/sleep 30 }");

    let started = wait_for(SPEC_WAIT_MAX_MS, || !job_pids(&daemon.log(), "srv").is_empty());
    assert!(started, "job should have started\nlog:\n{}", daemon.log());
    let first_pid = job_pids(&daemon.log(), "srv")[0];

    daemon.rewrite_config("job { name srv  cmd /bin/sleep 30 }\n# a harmless comment\n");
    daemon.sighup();
    std::thread::sleep(std::time::Duration::from_millis(500));

    let pids = job_pids(&daemon.log(), "srv");
    assert_eq!(pids, vec![first_pid], "pid should not change across a no-op rescan");
}

#[test]
fn changed_definition_restarts_under_new_pid() {
    let daemon = Daemon::start("job { name srv  cmd /bin/sleep 30 }");

    let started = wait_for(SPEC_WAIT_MAX_MS, || !job_pids(&daemon.log(), "srv").is_empty());
    assert!(started, "job should have started\nlog:\n{}", daemon.log());
    let first_pid = job_pids(&daemon.log(), "srv")[0];

    daemon.rewrite_config("job { name srv  cmd /bin/sleep 5 }\n");
    daemon.sighup();

    let restarted = wait_for(SPEC_WAIT_MAX_MS, || {
        job_pids(&daemon.log(), "srv").iter().any(|&p| p != first_pid)
    });
    assert!(restarted, "job should restart under a new pid\nlog:\n{}", daemon.log());
}
