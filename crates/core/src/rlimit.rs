// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource limits (`ulimit -X <value>` job clauses).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlimitError {
    #[error("non-numeric ulimit value")]
    NonNumeric,
    #[error("ulimit -n must be finite")]
    NofileMustBeFinite,
    #[error("unknown ulimit resource {0}")]
    UnknownResource(String),
}

/// The `ulimit` resources pmtr can set on a child before exec, matching the
/// `getrlimit(2)`/`setrlimit(2)` resource ids via the `-X` flags `ulimit(1)`
/// itself uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlimitResource {
    Core,
    Data,
    Nice,
    Fsize,
    SigPending,
    MemLock,
    Rss,
    NoFile,
    MsgQueue,
    RtPrio,
    Stack,
    Cpu,
    NProc,
    As,
}

impl RlimitResource {
    const TABLE: &'static [(&'static str, RlimitResource)] = &[
        ("-c", RlimitResource::Core),
        ("-d", RlimitResource::Data),
        ("-e", RlimitResource::Nice),
        ("-f", RlimitResource::Fsize),
        ("-i", RlimitResource::SigPending),
        ("-l", RlimitResource::MemLock),
        ("-m", RlimitResource::Rss),
        ("-n", RlimitResource::NoFile),
        ("-q", RlimitResource::MsgQueue),
        ("-r", RlimitResource::RtPrio),
        ("-s", RlimitResource::Stack),
        ("-t", RlimitResource::Cpu),
        ("-u", RlimitResource::NProc),
        ("-v", RlimitResource::As),
    ];

    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(f, _)| *f == flag)
            .map(|(_, r)| *r)
    }

    /// `RLIMIT_NOFILE` has no sensible "unlimited" value on Linux — `-n`
    /// must name a finite value.
    pub fn requires_finite(self) -> bool {
        matches!(self, RlimitResource::NoFile)
    }
}

/// A single `rlim_cur`/`rlim_max` pair for one resource. `None` means
/// `RLIM_INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RlimitSpec {
    pub resource: RlimitResource,
    pub soft: Option<u64>,
    pub hard: Option<u64>,
}

impl RlimitSpec {
    /// Parse `ulimit -n 1024` style clauses: flag plus a value that is
    /// either a decimal number or the literal `unlimited`/`infinity`
    /// (both accepted, matching the original's `job.c` value parser).
    pub fn parse(flag: &str, value: &str) -> Result<Self, RlimitError> {
        let resource =
            RlimitResource::from_flag(flag).ok_or_else(|| RlimitError::UnknownResource(flag.to_string()))?;

        let limit = if value.eq_ignore_ascii_case("unlimited") || value.eq_ignore_ascii_case("infinity") {
            None
        } else {
            let n: u64 = value.parse().map_err(|_| RlimitError::NonNumeric)?;
            Some(n)
        };

        if limit.is_none() && resource.requires_finite() {
            return Err(RlimitError::NofileMustBeFinite);
        }

        Ok(Self {
            resource,
            soft: limit,
            hard: limit,
        })
    }
}

#[cfg(test)]
#[path = "rlimit_tests.rs"]
mod tests;
