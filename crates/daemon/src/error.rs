// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(#[from] pmtr_config::ConfigError),

    #[error("engine error: {0}")]
    Engine(#[from] pmtr_engine::EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already running: pidfile {0} names live pid {1}")]
    AlreadyRunning(std::path::PathBuf, i32),
}
