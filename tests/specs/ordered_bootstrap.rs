//! Scenario 3: a `wait` job with a lower `order` finishes before the next
//! job starts, even though both are `once` and queued in the same tick.

use crate::prelude::*;

#[test]
fn wait_job_blocks_until_reaped_before_next_starts() {
    let marker = tempfile::tempdir().unwrap();
    let target = marker.path().join("x");
    let sentinel = marker.path().join("ok");

    let config = format!(
        r#"
job {{ name mk   cmd /bin/mkdir -p {target}   order 0   wait   once }}
job {{ name run  cmd /bin/sh -c "test -d {target} && touch {sentinel}"  order 10  once }}
"#,
        target = target.display(),
        sentinel = sentinel.display(),
    );

    let daemon = Daemon::start(&config);

    let ok = wait_for(SPEC_WAIT_MAX_MS, || sentinel.exists());
    assert!(ok, "run should observe mk's directory\nlog:\n{}", daemon.log());
}
