//! Test helpers for the end-to-end daemon specifications.
//!
//! These tests drive the real `pmtrd` binary as a subprocess against a
//! temp-dir config, rather than exercising the engine crate's internals
//! directly, so they double as a check on the wiring in `runtime.rs`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub const SPEC_POLL_INTERVAL_MS: u64 = 50;
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll = Duration::from_millis(SPEC_POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll);
    }
    false
}

pub fn binary_path() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug/pmtrd");
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("pmtrd");
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

/// A running `pmtrd -F` instance under a temp directory, killed on drop.
pub struct Daemon {
    child: Child,
    _dir: tempfile::TempDir,
    log_path: PathBuf,
    pub pidfile: PathBuf,
    pub config_path: PathBuf,
}

impl Daemon {
    /// Write `config` to a temp file and start `pmtrd -F` against it.
    pub fn start(config: &str) -> Self {
        Self::start_with_args(config, &[])
    }

    pub fn start_with_args(config: &str, extra_args: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("pmtr.conf");
        let log_path = dir.path().join("pmtrd.log");
        let pidfile = dir.path().join("pmtrd.pid");
        std::fs::write(&config_path, config).unwrap();

        let child = Command::new(binary_path())
            .arg("-F")
            .arg("-c")
            .arg(&config_path)
            .arg("-l")
            .arg(&log_path)
            .arg("-p")
            .arg(&pidfile)
            .args(extra_args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to start pmtrd");

        Daemon {
            child,
            _dir: dir,
            log_path,
            pidfile,
            config_path,
        }
    }

    pub fn log(&self) -> String {
        std::fs::read_to_string(&self.log_path).unwrap_or_default()
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Append text to the running config and rewrite it (no restart).
    pub fn rewrite_config(&self, config: &str) {
        std::fs::write(&self.config_path, config).unwrap();
    }

    /// Send SIGHUP to trigger a rescan of the (already rewritten) config.
    pub fn sighup(&self) {
        let pid = nix::unistd::Pid::from_raw(self.pid() as i32);
        nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGHUP).unwrap();
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let pid = nix::unistd::Pid::from_raw(self.child.id() as i32);
        let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
        if wait_for(2_000, || self.child.try_wait().ok().flatten().is_some()) {
            return;
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn has_job_field(line: &str, job: &str) -> bool {
    let needle = format!("job={job}");
    line.split_whitespace().any(|tok| tok == needle)
}

/// Count this job's `started job` log lines (`tracing`'s default formatter
/// writes `%`-recorded fields undecorated, so the field token is `job=<name>`
/// with no quotes).
pub fn count_job_starts(log: &str, job: &str) -> usize {
    log.lines()
        .filter(|l| l.contains("started job") && has_job_field(l, job))
        .count()
}

/// Pids recorded in this job's `started job` log lines, in order.
pub fn job_pids(log: &str, job: &str) -> Vec<u32> {
    log.lines()
        .filter(|l| l.contains("started job") && has_job_field(l, job))
        .filter_map(|l| {
            l.split_whitespace()
                .find_map(|tok| tok.strip_prefix("pid=")?.parse().ok())
        })
        .collect()
}

pub fn send_udp(addr: &str, msg: &str) {
    let sock = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    sock.send_to(msg.as_bytes(), addr).unwrap();
}
