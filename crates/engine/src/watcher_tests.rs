// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn create_watcher_logs_but_tolerates_a_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("present.txt");
    std::fs::write(&present, b"x").unwrap();
    let missing = dir.path().join("does-not-exist.txt");

    let (tx, _rx) = mpsc::channel(1);
    let result = create_watcher(&[present, missing], tx);
    assert!(result.is_ok(), "a missing dep is logged, not a hard failure");
}

#[tokio::test]
async fn run_signals_after_a_file_change_and_quiescence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.pmtr");
    std::fs::write(&path, b"initial").unwrap();

    let (_rearm_tx, rearm_rx) = mpsc::unbounded_channel();
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(run(vec![path.clone()], rearm_rx, signal_tx, shutdown_rx));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(f, "more").unwrap();
    drop(f);

    let signaled = tokio::time::timeout(Duration::from_secs(5), signal_rx.recv()).await;
    assert!(signaled.is_ok(), "expected a rescan signal after the file changed");

    let _ = shutdown_tx.send(());
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn run_exits_promptly_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.pmtr");
    std::fs::write(&path, b"initial").unwrap();

    let (_rearm_tx, rearm_rx) = mpsc::unbounded_channel();
    let (signal_tx, _signal_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(run(vec![path], rearm_rx, signal_tx, shutdown_rx));
    let _ = shutdown_tx.send(());
    let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
    assert!(result.is_ok(), "watcher task should exit once shutdown fires");
}
