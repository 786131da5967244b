//! Scenario 5: the UDP control socket's `enable`/`disable` protocol.

use crate::prelude::*;
use serial_test::serial;

fn pid_is_alive(pid: u32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
}

#[test]
#[serial]
fn disable_terminates_then_enable_respawns() {
    let daemon = Daemon::start(
        "listen on udp://127.0.0.1:9999\njob { name j  cmd /bin/sleep 30 }\n",
    );

    let started = wait_for(SPEC_WAIT_MAX_MS, || !job_pids(&daemon.log(), "j").is_empty());
    assert!(started, "job should have started\nlog:\n{}", daemon.log());
    let first_pid = job_pids(&daemon.log(), "j")[0];

    send_udp("127.0.0.1:9999", "disable j");
    let terminated = wait_for(SPEC_WAIT_MAX_MS, || !pid_is_alive(first_pid));
    assert!(terminated, "disable should SIGTERM the running job within grace");

    send_udp("127.0.0.1:9999", "enable j");
    let respawned = wait_for(SPEC_WAIT_MAX_MS, || {
        job_pids(&daemon.log(), "j").len() >= 2
    });
    assert!(respawned, "enable should let the job spawn again\nlog:\n{}", daemon.log());
}
