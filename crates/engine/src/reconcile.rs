// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config reconciliation (`rescan_config`, C5): diff a freshly-parsed job
//! list against the currently running one, preserving instance identity
//! for jobs whose definition didn't change and gracefully restarting or
//! retiring the rest.
//!
//! Grounded structurally on the teacher's `lifecycle/reconcile.rs` — a pure
//! function over previous/new state — adapted from tmux-session identity to
//! pid-based identity.

use pmtr_core::{Job, JobDef, JobTable, RunningInstance};
use tracing::info;

/// Diff `new_defs` (freshly loaded, already sorted by `order`) against
/// `previous`'s live jobs and produce the table that becomes current.
///
/// - Unchanged jobs (by [`JobDef::equals`]) keep their running instance
///   untouched.
/// - Changed jobs (same name, different definition) keep `pid`/`start_ts`
///   but get a fresh `terminate = 1` if currently running, so the next
///   supervisor tick restarts them under the new settings.
/// - Brand-new jobs start from a fresh [`RunningInstance`].
/// - Jobs removed from the config: dropped if not running, otherwise
///   renamed to `"<name>(deleted)"` and marked for termination and
///   deletion-on-reap, so they stay visible (and don't resurrect under a
///   reused name) until they exit.
pub fn rescan(previous: JobTable, new_defs: Vec<JobDef>) -> JobTable {
    let mut stale = previous.into_jobs();
    let mut jobs: Vec<Job> = Vec::with_capacity(new_defs.len());

    for def in new_defs {
        match stale.iter().position(|j| j.name() == def.name.as_str()) {
            None => jobs.push(Job::new(def)),
            Some(pos) => {
                let old = stale.remove(pos);
                if def.equals(&old.def) {
                    jobs.push(Job {
                        def,
                        instance: old.instance,
                    });
                } else {
                    let mut instance = RunningInstance::new();
                    instance.pid = old.instance.pid;
                    instance.start_ts = old.instance.start_ts;
                    if instance.is_running() {
                        info!(job = %def.name, "definition changed, restarting under new settings");
                        instance.terminate = 1;
                    }
                    jobs.push(Job { def, instance });
                }
            }
        }
    }

    for mut old in stale {
        if !old.instance.is_running() {
            continue;
        }
        info!(job = %old.def.name, "removed from config, terminating");
        old.instance.terminate = 1;
        old.instance.respawn = false;
        old.instance.delete_when_collected = true;
        old.def.name = format!("{}(deleted)", old.def.name).into();
        jobs.push(old);
    }

    let mut table = JobTable::new();
    for job in jobs {
        table.push(job);
    }
    table.resort();
    table
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
