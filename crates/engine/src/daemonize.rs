// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemonization boilerplate (fork/setsid/close std fds). Out-of-scope
//! supporting machinery per the core's own component list, kept here
//! rather than in `pmtr-daemon` because it's the one place in the
//! workspace besides the executor that legitimately needs `unsafe`.
//!
//! Must run before the async runtime starts — forking a process that
//! already has a multi-threaded tokio runtime running is unsound.

use std::io;

/// Detach from the controlling terminal: fork, exit the parent, start a
/// new session in the child, and close stdin/stdout/stderr. No-op effects
/// happen only in the child; the parent process always exits here.
pub fn daemonize() -> io::Result<()> {
    // SAFETY: called before the tokio runtime (and therefore before any
    // additional threads) starts, so fork's "only async-signal-safe calls
    // until exec or _exit" restriction is trivially satisfied by the tiny
    // sequence below.
    unsafe {
        match libc::fork() {
            -1 => return Err(io::Error::last_os_error()),
            0 => {}
            _ => std::process::exit(0),
        }

        if libc::setsid() == -1 {
            return Err(io::Error::last_os_error());
        }

        libc::close(libc::STDIN_FILENO);
        libc::close(libc::STDOUT_FILENO);
        libc::close(libc::STDERR_FILENO);
    }
    Ok(())
}
