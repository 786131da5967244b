// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor's main loop (C8): a single `tokio::select!` standing in
//! for the original's `sigsuspend`/`sigsetjmp`/`switch (signo)` dispatch
//! table in `pmtr.c::main`. Every arm below corresponds to one `case` of
//! that switch:
//!
//! - `case 0` (initial fall-through): handled by [`bootstrap`] before the
//!   loop starts.
//! - `SIGHUP`: the change-watcher's signal arm, triggering a rescan.
//! - `SIGCHLD`: the reap-event arm.
//! - `SIGALRM`: the periodic timer arm (tick + status report).
//! - a readable control socket: the control-datagram arm.
//! - `SIGTERM`/`SIGINT`/`SIGQUIT`: the shutdown arms.

use crate::error::DaemonError;
use pmtr_core::{Clock, JobTable, SystemClock};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

fn watch_paths(config_path: &Path, table: &JobTable) -> Vec<PathBuf> {
    let defs: Vec<pmtr_core::JobDef> = table.iter().map(|j| j.def.clone()).collect();
    let mut paths = pmtr_engine::deps::dependency_paths(&defs);
    paths.push(config_path.to_path_buf());
    paths
}

/// Spawn one background task per listen socket, forwarding every datagram
/// it receives into `tx`. Decouples control-socket I/O from the main loop
/// the same way the executor decouples child reaping from `do_jobs`.
fn spawn_control_listeners(
    sockets: Vec<UdpSocket>,
    tx: mpsc::UnboundedSender<Vec<u8>>,
) -> Vec<JoinHandle<()>> {
    sockets
        .into_iter()
        .map(|sock| {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                loop {
                    match sock.recv_from(&mut buf).await {
                        Ok((n, _peer)) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "control socket read failed, stopping listener");
                            return;
                        }
                    }
                }
            })
        })
        .collect()
}

struct Listeners {
    handles: Vec<JoinHandle<()>>,
}

impl Listeners {
    fn abort_all(&self) {
        for h in &self.handles {
            h.abort();
        }
    }
}

async fn rescan(
    config_path: &Path,
    table: &mut JobTable,
    control_tx: &mpsc::UnboundedSender<Vec<u8>>,
    listeners: &mut Listeners,
    report_socks: &mut Vec<UdpSocket>,
) {
    let parsed = match pmtr_config::load_file(config_path, pmtr_config::LoadMode::Normal) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "config rescan failed, keeping previous configuration");
            return;
        }
    };

    let mut defs = parsed.jobs;
    pmtr_engine::deps::hash_all(&mut defs);
    let previous = std::mem::take(table);
    *table = pmtr_engine::reconcile::rescan(previous, defs);

    listeners.abort_all();
    match pmtr_engine::control::bind_listeners(&parsed.listen).await {
        Ok(socks) => listeners.handles = spawn_control_listeners(socks, control_tx.clone()),
        Err(e) => warn!(error = %e, "failed to rebind listen sockets on rescan"),
    }

    match pmtr_engine::control::bind_reporters(&parsed.report).await {
        Ok(socks) => *report_socks = socks,
        Err(e) => warn!(error = %e, "failed to rebind report sockets on rescan"),
    }

    info!(jobs = table.len(), "config rescanned");
}

/// Load the config, bind the control sockets, and run every job due to
/// start — the original's `case 0` fallthrough in `main`'s `sigsetjmp`
/// dispatch. Returns early (without entering the loop) in syntax-check mode.
pub async fn run(cli: crate::cli::Cli) -> Result<(), DaemonError> {
    let mode = if cli.test_only {
        pmtr_config::LoadMode::SyntaxCheck
    } else {
        pmtr_config::LoadMode::Normal
    };
    let parsed = pmtr_config::load_file(&cli.config, mode)?;
    if cli.test_only {
        return Ok(());
    }

    if let Some(path) = &cli.pidfile {
        if let Some(pid) = existing_pid(path) {
            return Err(DaemonError::AlreadyRunning(path.clone(), pid));
        }
        write_pidfile(path)?;
    }

    let mut defs = parsed.jobs;
    pmtr_engine::deps::hash_all(&mut defs);
    let mut table = JobTable::from_defs(defs);

    let clock = SystemClock;
    let (reap_tx, mut reap_rx) = mpsc::unbounded_channel();

    let listen_socks = pmtr_engine::control::bind_listeners(&parsed.listen).await?;
    let mut report_socks = pmtr_engine::control::bind_reporters(&parsed.report).await?;
    let (control_tx, mut control_rx) = mpsc::unbounded_channel();
    let mut listeners = Listeners {
        handles: spawn_control_listeners(listen_socks, control_tx.clone()),
    };

    pmtr_engine::supervisor::tick(&mut table, &clock, reap_tx.clone()).await;

    let (rearm_tx, rearm_rx) = mpsc::unbounded_channel();
    let (watch_signal_tx, mut watch_signal_rx) = mpsc::unbounded_channel();
    let (watch_shutdown_tx, watch_shutdown_rx) = oneshot::channel();
    tokio::spawn(pmtr_engine::watcher::run(
        watch_paths(&cli.config, &table),
        rearm_rx,
        watch_signal_tx,
        watch_shutdown_rx,
    ));

    let report_id = pmtr_engine::control::report_id();
    pmtr_engine::control::send_reports(
        &report_socks,
        &pmtr_engine::control::format_report(&report_id, &table, clock.now_secs()),
    )
    .await;

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
    let mut sigquit = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::quit())?;
    let tick_period = crate::env::timer_check_ms()
        .unwrap_or_else(|| Duration::from_secs(pmtr_core::SHORT_DELAY));
    let mut timer = tokio::time::interval(tick_period);
    timer.tick().await;

    loop {
        tokio::select! {
            Some(event) = reap_rx.recv() => {
                let _ = pmtr_engine::supervisor::collect(&mut table, event, &clock);
                pmtr_engine::supervisor::tick(&mut table, &clock, reap_tx.clone()).await;
            }
            Some(()) = watch_signal_rx.recv() => {
                rescan(&cli.config, &mut table, &control_tx, &mut listeners, &mut report_socks).await;
                let _ = rearm_tx.send(watch_paths(&cli.config, &table));
                pmtr_engine::supervisor::tick(&mut table, &clock, reap_tx.clone()).await;
            }
            _ = timer.tick() => {
                pmtr_engine::supervisor::tick(&mut table, &clock, reap_tx.clone()).await;
                let report = pmtr_engine::control::format_report(&report_id, &table, clock.now_secs());
                pmtr_engine::control::send_reports(&report_socks, &report).await;
            }
            Some(datagram) = control_rx.recv() => {
                let text = String::from_utf8_lossy(&datagram);
                let commands = pmtr_engine::control::decode_msg(&text);
                if pmtr_engine::control::apply(&mut table, &commands) {
                    // enable/disable changes which dependency files matter
                    // (dependency_paths skips disabled jobs), so the watch
                    // set needs re-arming just like after a rescan.
                    let _ = rearm_tx.send(watch_paths(&cli.config, &table));
                    pmtr_engine::supervisor::tick(&mut table, &clock, reap_tx.clone()).await;
                }
            }
            _ = sigterm.recv() => { info!("SIGTERM received, shutting down"); break; }
            _ = sigint.recv() => { info!("SIGINT received, shutting down"); break; }
            _ = sigquit.recv() => { info!("SIGQUIT received, shutting down"); break; }
        }
    }

    let _ = watch_shutdown_tx.send(());
    listeners.abort_all();
    pmtr_engine::executor::term_jobs(&mut table);
    pmtr_engine::supervisor::tick(&mut table, &clock, reap_tx.clone()).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    while let Ok(event) = reap_rx.try_recv() {
        let _ = pmtr_engine::supervisor::collect(&mut table, event, &clock);
    }

    if let Some(path) = &cli.pidfile {
        let _ = std::fs::remove_file(path);
    }

    Ok(())
}

fn write_pidfile(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, format!("{}\n", std::process::id()))
}

/// If `path` names a live process, return its pid so the caller can refuse
/// to start a second instance. A stale pidfile (unreadable, unparsable, or
/// naming a pid that's no longer running) is treated as absent.
fn existing_pid(path: &Path) -> Option<i32> {
    let text = std::fs::read_to_string(path).ok()?;
    let pid: i32 = text.trim().parse().ok()?;
    let raw_pid = nix::unistd::Pid::from_raw(pid);
    nix::sys::signal::kill(raw_pid, None).ok().map(|_| pid)
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
