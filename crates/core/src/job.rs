// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job definition and running-instance state.

use crate::cpuset::CpuSet;
use crate::rlimit::RlimitSpec;
use std::path::PathBuf;

crate::define_id! {
    /// Name of a configured job. Unique within a configuration.
    pub struct JobName;
}

/// Everything read from the config file for one `job { ... }` block. Two
/// `JobDef`s compare equal iff every field the original `job_cmp` compared
/// is equal — including `deps_hash`, which is why `rescan_config` only
/// treats a job as unchanged once the dependency hasher has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDef {
    pub name: JobName,
    pub cmd: Vec<String>,
    pub env: Vec<String>,
    pub dir: Option<PathBuf>,
    pub stdin: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub user: Option<String>,
    pub order: i32,
    pub nice: i32,
    pub disabled: bool,
    pub wait: bool,
    pub once: bool,
    pub bounce_interval: u64,
    pub cpuset: CpuSet,
    pub rlimits: Vec<RlimitSpec>,
    pub deps: Vec<String>,
    pub deps_hash: u64,
}

impl JobDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: JobName::new(name),
            cmd: Vec::new(),
            env: Vec::new(),
            dir: None,
            stdin: None,
            stdout: None,
            stderr: None,
            user: None,
            order: 0,
            nice: 0,
            disabled: false,
            wait: false,
            once: false,
            bounce_interval: 0,
            cpuset: CpuSet::empty(),
            rlimits: Vec::new(),
            deps: Vec::new(),
            deps_hash: 0,
        }
    }

    /// Whether this job's definition (everything but its running state) is
    /// unchanged from `other` — used by the reconciler to decide whether a
    /// job should keep its running instance across a config rescan.
    pub fn equals(&self, other: &JobDef) -> bool {
        self == other
    }

    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}

/// Per-instance state tracked while a job is (or recently was) running.
/// Mirrors the mutable fields of the original `job_t`, separated from the
/// immutable `JobDef` so a config rescan can replace definitions while
/// carrying instance state across unchanged jobs by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningInstance {
    /// 0 means not running.
    pub pid: u32,
    pub start_ts: u64,
    /// Desired next start time; used to throttle rapid restarts.
    pub start_at: u64,
    /// 0 = no termination requested. 1 = SIGTERM sent, awaiting grace.
    /// Any value > 1 is the epoch-seconds deadline after which SIGKILL
    /// is sent.
    pub terminate: u64,
    /// Whether this job should be restarted when it exits.
    pub respawn: bool,
    /// True for a job removed from the config file while still running;
    /// reaped but not re-added once it exits.
    pub delete_when_collected: bool,
}

impl RunningInstance {
    pub fn new() -> Self {
        Self {
            respawn: true,
            ..Default::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.pid != 0
    }
}

/// A configured job paired with its current running state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub def: JobDef,
    pub instance: RunningInstance,
}

impl Job {
    /// A `once` job still starts with `respawn = true` — it hasn't run yet,
    /// so there's nothing to avoid respawning. `respawn` is cleared after
    /// the job's first exit is collected, not before it has ever started.
    pub fn new(def: JobDef) -> Self {
        Self {
            def,
            instance: RunningInstance::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.def.name.as_str()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
