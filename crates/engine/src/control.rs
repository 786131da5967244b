// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control socket (C6): the UDP `enable`/`disable` protocol and periodic
//! status report broadcast.
//!
//! `tokio::net::UdpSocket` gives us nonblocking-by-construction listen and
//! report sockets without the manual `O_NONBLOCK`/`FD_CLOEXEC` bit-twiddling
//! the original needed — async I/O already implies "don't block the
//! supervisor loop on a socket read".

use crate::error::EngineError;
use pmtr_core::{Endpoint, JobTable};
use tokio::net::UdpSocket;
use tracing::{info, warn};

/// One `enable`/`disable` directive parsed out of an incoming datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Enable,
    Disable,
}

/// Bind a UDP socket for each `listen on udp://...` spec.
pub async fn bind_listeners(specs: &[String]) -> Result<Vec<UdpSocket>, EngineError> {
    let mut socks = Vec::with_capacity(specs.len());
    for spec in specs {
        let ep = Endpoint::parse(spec).map_err(|_| EngineError::Socket(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("bad listen spec: {spec}"),
        )))?;
        let sock = UdpSocket::bind((ep.host.as_str(), ep.port)).await?;
        info!(addr = %spec, "control socket listening");
        socks.push(sock);
    }
    Ok(socks)
}

/// Open (and `connect`, so later writes are atomic datagrams) a UDP socket
/// for each `report to udp://...` spec.
pub async fn bind_reporters(specs: &[String]) -> Result<Vec<UdpSocket>, EngineError> {
    let mut socks = Vec::with_capacity(specs.len());
    for spec in specs {
        let ep = Endpoint::parse(spec).map_err(|_| EngineError::Socket(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("bad report spec: {spec}"),
        )))?;
        let sock = UdpSocket::bind(("0.0.0.0", 0)).await?;
        sock.connect((ep.host.as_str(), ep.port)).await?;
        info!(addr = %spec, "reporting status to peer");
        socks.push(sock);
    }
    Ok(socks)
}

/// Parse one incoming control datagram into a list of mode/name pairs.
/// Per spec: `<mode> <name>[ <name>...] [<mode> <name>...]`. A name
/// appearing before any mode word has been seen discards the whole
/// datagram, since there's no valid interpretation for it.
pub fn decode_msg(datagram: &str) -> Vec<(ControlMode, String)> {
    let mut out = Vec::new();
    let mut mode: Option<ControlMode> = None;
    for tok in datagram.split_whitespace() {
        match tok {
            "enable" => mode = Some(ControlMode::Enable),
            "disable" => mode = Some(ControlMode::Disable),
            name => match mode {
                Some(m) => out.push((m, name.to_string())),
                None => return Vec::new(),
            },
        }
    }
    out
}

/// Apply decoded control commands to the job table. Returns whether
/// anything actually changed, so the caller knows whether to wake the
/// supervisor loop and re-arm the change watcher.
pub fn apply(table: &mut JobTable, commands: &[(ControlMode, String)]) -> bool {
    let mut changed = false;
    for (mode, name) in commands {
        let Some(job) = table.by_name_mut(name) else {
            warn!(job = %name, "control: unknown job name, ignoring");
            continue;
        };
        match mode {
            ControlMode::Enable => {
                if job.def.disabled {
                    job.def.disabled = false;
                    changed = true;
                }
            }
            ControlMode::Disable => {
                if !job.def.disabled {
                    job.def.disabled = true;
                    if job.instance.is_running() {
                        job.instance.terminate = 1;
                    }
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Identify this daemon in outgoing status reports: the local hostname.
pub fn report_id() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

/// Build the plaintext status report: a `report <id>` header line followed
/// by one `<name> <e|d> <uptime_s> <pid> <exe>` line per job that hasn't
/// had its respawn flag cleared (one-time jobs are not advertised).
pub fn format_report(id: &str, table: &JobTable, now: u64) -> String {
    let mut out = format!("report {id}\n");
    for job in table.iter() {
        if !job.instance.respawn {
            continue;
        }
        let flag = if job.def.disabled { 'd' } else { 'e' };
        let uptime = if job.instance.is_running() {
            now.saturating_sub(job.instance.start_ts)
        } else {
            0
        };
        let exe = job.def.cmd.first().map(String::as_str).unwrap_or("");
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            job.name(),
            flag,
            uptime,
            job.instance.pid,
            exe
        ));
    }
    out
}

/// Broadcast a status report to every configured peer. `ECONNREFUSED` is
/// tolerated silently (a peer that isn't listening yet), other write
/// errors and short writes are logged but don't stop the remaining sends.
pub async fn send_reports(sockets: &[UdpSocket], report: &str) {
    for sock in sockets {
        match sock.send(report.as_bytes()).await {
            Ok(n) if n < report.len() => {
                warn!(sent = n, total = report.len(), "incomplete status report write");
            }
            Ok(_) => {}
            Err(e) if e.raw_os_error() == Some(libc::ECONNREFUSED) => {}
            Err(e) => warn!(error = %e, "status report write failed"),
        }
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
