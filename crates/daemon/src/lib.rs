// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pmtrd`: the process supervisor daemon. This crate wires the command
//! line, logging, and pidfile/daemonization boilerplate around the
//! `pmtr-engine` supervisor loop.

pub mod cli;
pub mod env;
pub mod error;
pub mod logging;
pub mod runtime;

pub use cli::Cli;
pub use error::DaemonError;
pub use runtime::run;
