// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup, grounded on the teacher's `main.rs::setup_logging`:
//! a non-blocking file appender behind `tracing-appender`, gated by an
//! `EnvFilter`. The `-I` flag mirrors output to stderr as well, standing
//! in for the original's `echo_syslog_to_stderr`.

use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Must be kept alive for the lifetime of the process; dropping it stops
/// the non-blocking writer's background flush thread.
pub struct LogGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
}

fn filter_for(verbose: u8) -> EnvFilter {
    if let Ok(f) = EnvFilter::try_from_default_env() {
        return f;
    }
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

/// Initialize the global tracing subscriber. `log_path` is the daemon's
/// own log file; when `echo_to_stderr` is set, every event is duplicated
/// to stderr as well.
pub fn init(log_path: &Path, verbose: u8, echo_to_stderr: bool) -> std::io::Result<LogGuard> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or_else(|| Path::new(".")),
        log_path.file_name().unwrap_or_else(|| "pmtrd.log".as_ref()),
    );
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry()
        .with(filter_for(verbose))
        .with(fmt::layer().with_writer(non_blocking));

    if echo_to_stderr {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    } else {
        registry.init();
    }

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}
