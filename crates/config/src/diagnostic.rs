// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parse diagnostics. Every variant renders as the single human-readable
//! line the daemon prints (and refuses to start) on a bad config file.

use pmtr_core::{CpuSetError, EndpointError, RlimitError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("syntax error near line {line}: unexpected {found}")]
    UnexpectedToken { line: u32, found: String },

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("{key} respecified near line {line}")]
    DuplicateKey { line: u32, key: &'static str },

    #[error("job has no name (near line {line})")]
    JobMissingName { line: u32 },

    #[error("job {name:?} has no cmd (near line {line})")]
    JobMissingCmd { line: u32, name: String },

    #[error("non-numeric order parameter (line {line})")]
    NonNumericOrder { line: u32 },

    #[error("non-numeric nice parameter (line {line})")]
    NonNumericNice { line: u32 },

    #[error("nice out of range {min} to {max} (line {line})")]
    NiceOutOfRange { line: u32, min: i32, max: i32 },

    #[error("environment string must be VAR=VALUE (line {line})")]
    InvalidEnv { line: u32 },

    #[error("invalid time interval in 'bounce every' (line {line})")]
    InvalidTimeInterval { line: u32 },

    #[error("invalid time unit in 'bounce every' (line {line})")]
    InvalidTimeUnit { line: u32 },

    #[error("user name too long (line {line})")]
    UserNameTooLong { line: u32 },

    #[error("{source} (line {line})")]
    Cpu {
        line: u32,
        #[source]
        source: CpuSetError,
    },

    #[error("{source} (line {line})")]
    Rlimit {
        line: u32,
        #[source]
        source: RlimitError,
    },

    #[error("{source} (line {line})")]
    Endpoint {
        line: u32,
        #[source]
        source: EndpointError,
    },

    #[error("duplicate job name {name:?} (line {line})")]
    DuplicateJobName { line: u32, name: String },

    #[error("can't read config file {path}: {io}")]
    Io { path: String, io: String },
}
