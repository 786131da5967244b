//! `-t` syntax-check mode: exits without spawning anything.

use crate::prelude::*;
use std::process::{Command, Stdio};

fn pmtrd_test_only(config: &str) -> std::process::Output {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("pmtr.conf");
    std::fs::write(&config_path, config).unwrap();

    Command::new(binary_path())
        .arg("-t")
        .arg("-c")
        .arg(&config_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap()
}

#[test]
fn valid_config_passes_syntax_check() {
    let out = pmtrd_test_only("job { name t  cmd /bin/true }");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn unterminated_job_block_fails_syntax_check() {
    let out = pmtrd_test_only("job { name t  cmd /bin/true");
    assert!(!out.status.success());
}
