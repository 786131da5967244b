// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle executor (C4): spawning jobs, signaling them toward
//! termination, and reaping them once they exit.
//!
//! Child setup (new session, user/group switch, rlimits, CPU affinity,
//! nice) runs in a `pre_exec` hook between fork and exec, which is where
//! `unsafe_code = "allow"` earns its keep in this crate — none of this can
//! be expressed through safe `std::process::Command` builder methods.

use crate::error::EngineError;
use pmtr_core::{Clock, JobDef, RunningInstance};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Emitted once a spawned (non-`wait`) child exits, for the supervisor
/// loop to fold back into `collect_jobs`. Each spawned child gets its own
/// `tokio::spawn(child.wait())` task reporting through this channel —
/// the structured-concurrency replacement for polling `waitpid(-1, WNOHANG)`.
#[derive(Debug, Clone, Copy)]
pub struct ReapEvent {
    pub pid: u32,
    pub exit_status: std::process::ExitStatus,
}

/// `in` defaults to `/dev/null` when unset; `out`/`err` default to
/// `"syslog"`, matching the original's `o = job->out ? job->out : "syslog"`.
fn open_redirect(path: Option<&str>, for_write: bool) -> Result<Stdio, EngineError> {
    let default = if for_write { "syslog" } else { "/dev/null" };
    let path = path.unwrap_or(default);

    if path == "syslog" {
        // The log relay is an optional subsystem (spec §1: "their internals
        // are not part of the core") whose process this daemon never
        // spawns, so there is never a relay listening to connect to.
        // Routing degrades to /dev/null rather than opening a literal file
        // named "syslog" in the job's working directory.
        warn!("no log relay running, degrading 'syslog' redirect to /dev/null");
        return Ok(Stdio::null());
    }

    let mut opts = std::fs::OpenOptions::new();
    if for_write {
        opts.create(true).append(true).write(true);
    } else {
        opts.read(true);
    }
    let file = opts.open(path).map_err(|source| EngineError::Redirect {
        path: path.to_string(),
        source,
    })?;
    Ok(Stdio::from(file))
}

/// Build (but do not spawn) the `tokio::process::Command` for a job,
/// wiring up working directory, environment, stdio redirection, and the
/// `pre_exec` hook that applies user/rlimit/affinity/nice before `execve`.
pub fn build_command(def: &JobDef) -> Result<Command, EngineError> {
    #[allow(clippy::expect_used)]
    let (program, args) = def
        .cmd
        .split_first()
        .expect("parser guarantees cmd is non-empty");

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(open_redirect(def.stdin.as_deref(), false)?);
    cmd.stdout(open_redirect(def.stdout.as_deref(), true)?);
    cmd.stderr(open_redirect(def.stderr.as_deref(), true)?);

    if let Some(dir) = &def.dir {
        cmd.current_dir(dir);
    }

    for kv in &def.env {
        if let Some((k, v)) = kv.split_once('=') {
            cmd.env(k, v);
        }
    }

    let nice = def.nice;
    let cpus: Vec<u32> = def.cpuset.cpus().to_vec();
    let rlimits = def.rlimits.clone();
    let user = def.user.clone();

    // SAFETY: this closure runs in the forked child between `fork` and
    // `execve`, before the child has any threads of its own — only
    // async-signal-safe libc calls are made here, and every failure path
    // returns an `io::Error` instead of touching Rust-level state that
    // could be mid-mutation from the parent.
    unsafe {
        cmd.pre_exec(move || {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }

            if libc::setpriority(libc::PRIO_PROCESS, 0, nice) == -1 {
                return Err(std::io::Error::last_os_error());
            }

            if !cpus.is_empty() {
                let mut set: libc::cpu_set_t = std::mem::zeroed();
                libc::CPU_ZERO(&mut set);
                for cpu in &cpus {
                    libc::CPU_SET(*cpu as usize, &mut set);
                }
                if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
            }

            for rl in &rlimits {
                let lim = libc::rlimit {
                    rlim_cur: rl.soft.unwrap_or(libc::RLIM_INFINITY as u64),
                    rlim_max: rl.hard.unwrap_or(libc::RLIM_INFINITY as u64),
                };
                let resource = rlimit_resource_id(rl.resource);
                if libc::setrlimit(resource, &lim) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
            }

            if let Some(user) = &user {
                let cstr = std::ffi::CString::new(user.as_str())
                    .map_err(|_| std::io::Error::from_raw_os_error(libc::EINVAL))?;
                let pw = libc::getpwnam(cstr.as_ptr());
                if pw.is_null() {
                    return Err(std::io::Error::from_raw_os_error(libc::ENOENT));
                }
                let (uid, gid) = ((*pw).pw_uid, (*pw).pw_gid);
                if libc::setgid(gid) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                if libc::initgroups(cstr.as_ptr(), gid) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                if libc::setuid(uid) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
            }

            Ok(())
        });
    }

    Ok(cmd)
}

fn rlimit_resource_id(r: pmtr_core::rlimit::RlimitResource) -> libc::c_int {
    use pmtr_core::rlimit::RlimitResource::*;
    match r {
        Core => libc::RLIMIT_CORE,
        Data => libc::RLIMIT_DATA,
        Nice => libc::RLIMIT_NICE,
        Fsize => libc::RLIMIT_FSIZE,
        SigPending => libc::RLIMIT_SIGPENDING,
        MemLock => libc::RLIMIT_MEMLOCK,
        Rss => libc::RLIMIT_RSS,
        NoFile => libc::RLIMIT_NOFILE,
        MsgQueue => libc::RLIMIT_MSGQUEUE,
        RtPrio => libc::RLIMIT_RTPRIO,
        Stack => libc::RLIMIT_STACK,
        Cpu => libc::RLIMIT_CPU,
        NProc => libc::RLIMIT_NPROC,
        As => libc::RLIMIT_AS,
    }
}

/// Spawn a job that does not use `wait`. The child is handed off to a
/// background reaper task that reports back through `reap_tx` once it
/// exits; `do_jobs` does not block on it.
pub fn spawn_detached(
    name: &str,
    def: &JobDef,
    instance: &mut RunningInstance,
    clock: &dyn Clock,
    reap_tx: tokio::sync::mpsc::UnboundedSender<ReapEvent>,
) -> Result<(), EngineError> {
    let mut cmd = build_command(def)?;
    let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
        job: name.to_string(),
        source,
    })?;
    #[allow(clippy::expect_used)]
    let pid = child
        .id()
        .expect("freshly spawned tokio child always has a pid");

    instance.pid = pid;
    instance.start_ts = clock.now_secs();
    info!(job = %name, pid, "started job");

    tokio::spawn(async move {
        if let Ok(exit_status) = child.wait().await {
            let _ = reap_tx.send(ReapEvent { pid, exit_status });
        }
    });

    Ok(())
}

/// Spawn a job configured with `wait`: block (asynchronously) until it
/// exits before returning, exactly as `do_jobs` did synchronously in the
/// original — but here only this `.await` point is suspended, not the
/// whole process.
pub async fn spawn_and_wait(
    name: &str,
    def: &JobDef,
    instance: &mut RunningInstance,
    clock: &dyn Clock,
) -> Result<(), EngineError> {
    let mut cmd = build_command(def)?;
    let mut child: Child = cmd.spawn().map_err(|source| EngineError::Spawn {
        job: name.to_string(),
        source,
    })?;
    #[allow(clippy::expect_used)]
    let pid = child.id().expect("freshly spawned tokio child always has a pid");
    instance.pid = pid;
    instance.start_ts = clock.now_secs();
    info!(job = %name, pid, "started job, pausing for it to finish");

    let status = match child.wait().await {
        Ok(status) => status,
        Err(_) => {
            // Unlike the original (which `continue`s and leaves `pid` set
            // with no child behind it), clear the instance so the next
            // tick treats this job as not running instead of stuck.
            instance.pid = 0;
            return Err(EngineError::Wait { job: name.to_string() });
        }
    };
    info!(job = %name, "job finished");

    if status.success() && status.code() == Some(pmtr_core::NO_RESTART) {
        instance.respawn = false;
    } else if def.once {
        instance.respawn = false;
    }
    instance.pid = 0;
    Ok(())
}

/// Signal a job toward termination per its `terminate` deadline field:
/// `1` means "send SIGTERM and arm the kill deadline", anything greater
/// means "the grace period is `terminate` epoch-seconds; if elapsed, send
/// SIGKILL".
pub fn signal_job(name: &str, pid: u32, terminate: &mut u64, now: u64) {
    if *terminate == 0 {
        return;
    }
    let pid = nix::unistd::Pid::from_raw(pid as i32);
    if *terminate == 1 {
        info!(job = %name, pid = pid.as_raw(), "sending SIGTERM");
        if let Err(e) = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM) {
            warn!(job = %name, error = %e, "SIGTERM delivery failed");
        }
        *terminate = now + pmtr_core::SHORT_DELAY;
        return;
    }
    if *terminate > now {
        return;
    }
    info!(job = %name, pid = pid.as_raw(), "sending SIGKILL");
    if let Err(e) = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGKILL) {
        warn!(job = %name, error = %e, "SIGKILL delivery failed");
    }
    *terminate = 0;
}

/// Mark every running job for termination (`do_jobs`/`signal_job` carry
/// out the actual signaling afterward).
pub fn term_jobs(table: &mut pmtr_core::JobTable) {
    for job in table.iter_mut() {
        if job.instance.pid != 0 && job.instance.terminate == 0 {
            job.instance.terminate = 1;
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
