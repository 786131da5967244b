// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use pmtr_daemon::Cli;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if !cli.foreground_requested() {
        if let Err(e) = pmtr_engine::daemonize::daemonize() {
            eprintln!("pmtrd: failed to daemonize: {e}");
            return std::process::ExitCode::FAILURE;
        }
    }

    let _guard = match pmtr_daemon::logging::init(&cli.log_file, cli.verbose, cli.echo_to_stderr || cli.foreground) {
        Ok(g) => Some(g),
        Err(e) => {
            eprintln!("pmtrd: failed to open log file {}: {e}", cli.log_file.display());
            None
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("pmtrd: failed to start async runtime: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(pmtr_daemon::run(cli)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pmtrd: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
