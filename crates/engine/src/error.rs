// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime error types for the supervision engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("fork/spawn error for job {job}: {source}")]
    Spawn {
        job: String,
        #[source]
        source: std::io::Error,
    },

    #[error("waitpid for job {job} failed")]
    Wait { job: String },

    #[error("signal delivery to job {job} [{pid}] failed: {source}")]
    Signal {
        job: String,
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown user {0}")]
    UnknownUser(String),

    #[error("setuid/setgid/initgroups failed for user {user}: {source}")]
    Privilege {
        user: String,
        #[source]
        source: std::io::Error,
    },

    #[error("setrlimit failed: {0}")]
    Rlimit(std::io::Error),

    #[error("sched_setaffinity failed: {0}")]
    Affinity(std::io::Error),

    #[error("setpriority failed: {0}")]
    Nice(std::io::Error),

    #[error("can't open/dup {path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),

    #[error("watcher error: {0}")]
    Watch(#[from] notify::Error),
}
