// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency-content hasher (C3).
//!
//! Each job's `depends { ... }` files are read and folded into a single
//! Bernstein hash (`h = h*33 + byte`, the same fold the original used) so
//! the reconciler can detect "a dependency's contents changed" without
//! keeping the contents around. A job whose dependency file can't be read
//! is disabled rather than left to fail at spawn time.

use pmtr_core::JobDef;
use std::path::Path;
use tracing::warn;
use zeroize::Zeroize;

/// Fold bytes into a running Bernstein hash.
fn bernstein_fold(mut h: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        h = h.wrapping_mul(33).wrapping_add(b as u64);
    }
    h
}

/// Recompute `deps_hash` for one job from its `deps` file list, relative to
/// `base_dir` (the job's `dir`, or the daemon's cwd if unset). Returns
/// `false` and disables the job if any dependency file can't be read —
/// mirroring the original's "disable on unreadable dep" behavior rather
/// than crashing or silently hashing a shorter input.
pub fn rehash_job(job: &mut JobDef, base_dir: Option<&Path>) -> bool {
    let mut h: u64 = 0;
    for dep in &job.deps {
        let path = resolve(dep, base_dir);
        let mut bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!(job = %job.name, dep = %path.display(), error = %e, "dependency unreadable, disabling job");
                job.disabled = true;
                return false;
            }
        };
        h = bernstein_fold(h, &bytes);
        // Dependency files can carry sensitive material (credentials,
        // tokens) and we only ever needed their hash.
        bytes.zeroize();
    }
    job.deps_hash = h;
    true
}

fn resolve(dep: &str, base_dir: Option<&Path>) -> std::path::PathBuf {
    let p = Path::new(dep);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    match base_dir {
        Some(dir) => dir.join(p),
        None => p.to_path_buf(),
    }
}

/// Recompute hashes for every job's dependency list in place.
pub fn hash_all(jobs: &mut [JobDef]) {
    for job in jobs.iter_mut() {
        let base_dir = job.dir.clone();
        rehash_job(job, base_dir.as_deref());
    }
}

/// Resolved dependency file paths for every enabled job, for the change
/// watcher to track alongside the config file itself.
pub fn dependency_paths(jobs: &[JobDef]) -> Vec<std::path::PathBuf> {
    jobs.iter()
        .filter(|j| !j.disabled)
        .flat_map(|j| j.deps.iter().map(|d| resolve(d, j.dir.as_deref())))
        .collect()
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
