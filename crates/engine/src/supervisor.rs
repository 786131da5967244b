// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-tick supervisor loop (`do_jobs`) and exit-reaping (`collect_jobs`).
//!
//! `tick` walks the job table in `order` each time it's invoked, deciding
//! for each job whether to signal it toward termination, leave it alone, or
//! start it. The precedence below mirrors the original `do_jobs` exactly:
//! a bounce-interval trip takes priority over everything else, a
//! termination already in flight pre-empts a fresh start decision, and a
//! job only gets a fresh `start_at` throttle once none of the earlier
//! checks applied.

use crate::error::EngineError;
use crate::executor::{self, ReapEvent};
use pmtr_core::{Clock, JobTable};
use std::os::unix::process::ExitStatusExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Run one supervision pass over every job in `table`. Spawn failures are
/// logged and the job is left to retry on the next tick rather than
/// aborting the whole pass.
pub async fn tick(table: &mut JobTable, clock: &dyn Clock, reap_tx: UnboundedSender<ReapEvent>) {
    let now = clock.now_secs();

    for job in table.iter_mut() {
        let name = job.def.name.to_string();

        if job.def.bounce_interval > 0
            && job.instance.is_running()
            && job.instance.terminate == 0
            && now.saturating_sub(job.instance.start_ts) >= job.def.bounce_interval
        {
            info!(job = %name, "bounce interval elapsed, restarting");
            job.instance.terminate = 1;
        }

        if job.instance.terminate != 0 {
            executor::signal_job(&name, job.instance.pid, &mut job.instance.terminate, now);
            continue;
        }

        if job.def.disabled {
            continue;
        }

        if job.instance.is_running() {
            continue;
        }

        if !job.instance.respawn {
            continue;
        }

        if job.instance.start_at > now {
            continue;
        }

        let result = if job.def.wait {
            executor::spawn_and_wait(&name, &job.def, &mut job.instance, clock).await
        } else {
            executor::spawn_detached(&name, &job.def, &mut job.instance, clock, reap_tx.clone())
        };

        if let Err(e) = result {
            warn!(job = %name, error = %e, "failed to start job, will retry next tick");
            job.instance.start_at = now + pmtr_core::SHORT_DELAY;
        }
    }
}

/// Fold one reaped child's exit back into the job table: clear its running
/// state, throttle the next start if it exited too quickly (crashloop
/// protection), honor the "don't restart" sentinel exit code, and drop
/// jobs that were removed from the config while still running.
pub fn collect(table: &mut JobTable, event: ReapEvent, clock: &dyn Clock) -> Result<(), EngineError> {
    let now = clock.now_secs();
    let pid = event.pid;

    let Some(job) = table.by_pid_mut(pid) else {
        // Can race with a concurrent rescan that already dropped this job
        // from the table (e.g. it was removed from the config and reaped
        // before we got here).
        warn!(pid, "reaped unknown pid, no matching job in table");
        return Ok(());
    };
    let name = job.def.name.to_string();
    let elapsed = now.saturating_sub(job.instance.start_ts);

    match event.exit_status.signal() {
        Some(sig) => info!(job = %name, pid, signal = sig, "job killed by signal"),
        None => info!(job = %name, pid, code = event.exit_status.code(), "job exited"),
    }

    job.instance.pid = 0;
    job.instance.terminate = 0;
    job.instance.start_at = if elapsed < pmtr_core::SHORT_DELAY {
        now + pmtr_core::SHORT_DELAY
    } else {
        now
    };

    if job.def.once || event.exit_status.code() == Some(pmtr_core::NO_RESTART) {
        job.instance.respawn = false;
    }

    let delete_when_collected = job.instance.delete_when_collected;
    if delete_when_collected {
        table.remove_by_name(&name);
    }

    Ok(())
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
