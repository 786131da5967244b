// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change watcher (C7): instead of the original's forked `dep_monitor`
//! child process, a long-lived task that watches the config file and
//! every enabled job's dependency files, debounces bursts of edits, and
//! asks the supervisor to rescan.
//!
//! Grounded on `crates/adapters/src/agent/watcher.rs`'s shape: a
//! `notify::recommended_watcher` feeding an mpsc channel via
//! `blocking_send`, consumed by a `tokio::select!` loop with a oneshot
//! shutdown arm.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// How long to wait after the first change event before signaling, so an
/// editor's rename-then-rewrite sequence settles into one rescan instead
/// of several.
const QUIESCENCE: Duration = Duration::from_millis(500);

fn create_watcher(
    paths: &[PathBuf],
    tx: mpsc::Sender<()>,
) -> Result<RecommendedWatcher, notify::Error> {
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if res.is_ok() {
            let _ = tx.blocking_send(());
        }
    })?;
    for path in paths {
        if let Err(e) = watcher.watch(path, RecursiveMode::NonRecursive) {
            warn!(path = %path.display(), error = %e, "could not watch file, skipping");
        }
    }
    Ok(watcher)
}

/// Runs until `shutdown` fires, signaling `signal_tx` once per debounced
/// burst of filesystem changes. `rearm_rx` carries a fresh watch set after
/// every successful rescan (config file plus the current dependency file
/// list), taking the place of the original's "watcher re-forked with a new
/// file list" cycle.
pub async fn run(
    initial_paths: Vec<PathBuf>,
    mut rearm_rx: mpsc::UnboundedReceiver<Vec<PathBuf>>,
    signal_tx: mpsc::UnboundedSender<()>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut paths = initial_paths;

    'outer: loop {
        let (tx, mut rx) = mpsc::channel(8);
        let watcher = match create_watcher(&paths, tx) {
            Ok(w) => w,
            Err(e) => {
                warn!(error = %e, "failed to start change watcher, retrying shortly");
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(pmtr_core::SHORT_DELAY)) => continue 'outer,
                    Some(new_paths) = rearm_rx.recv() => { paths = new_paths; continue 'outer; }
                    _ = &mut shutdown => return,
                }
            }
        };

        tokio::select! {
            Some(_) = rx.recv() => {
                drop(watcher);
                tokio::time::sleep(QUIESCENCE).await;
                info!("config or dependency change detected, signaling rescan");
                let _ = signal_tx.send(());
            }
            Some(new_paths) = rearm_rx.recv() => {
                paths = new_paths;
            }
            _ = &mut shutdown => {
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
