// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface. Out-of-scope supporting boilerplate per the
//! core's own component list, but still built with the ecosystem's usual
//! tool rather than hand-rolled `std::env::args` parsing.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pmtrd", version, about = "process monitor daemon")]
pub struct Cli {
    /// Verbose logging (repeatable).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path.
    #[arg(short = 'c', value_name = "FILE", default_value = pmtr_core::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Write our pid to FILE.
    #[arg(short = 'p', value_name = "FILE")]
    pub pidfile: Option<PathBuf>,

    /// Stay in the foreground instead of daemonizing.
    #[arg(short = 'F')]
    pub foreground: bool,

    /// Check the config file's syntax and exit; implies `-F`.
    #[arg(short = 't')]
    pub test_only: bool,

    /// Mirror log output to stderr.
    #[arg(short = 'I')]
    pub echo_to_stderr: bool,

    /// Log file path.
    #[arg(short = 'l', value_name = "FILE", default_value = "/var/log/pmtrd.log")]
    pub log_file: PathBuf,
}

impl Cli {
    pub fn foreground_requested(&self) -> bool {
        self.foreground || self.test_only
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
