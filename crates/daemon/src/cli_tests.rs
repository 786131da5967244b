// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_to_the_build_time_config_path() {
    let cli = Cli::parse_from(["pmtrd"]);
    assert_eq!(cli.config, PathBuf::from(pmtr_core::DEFAULT_CONFIG_PATH));
    assert!(!cli.foreground_requested());
}

#[test]
fn test_only_implies_foreground() {
    let cli = Cli::parse_from(["pmtrd", "-t"]);
    assert!(cli.test_only);
    assert!(cli.foreground_requested());
}

#[test]
fn verbose_is_repeatable() {
    let cli = Cli::parse_from(["pmtrd", "-vvv"]);
    assert_eq!(cli.verbose, 3);
}

#[test]
fn config_and_pidfile_paths_are_parsed() {
    let cli = Cli::parse_from(["pmtrd", "-c", "/tmp/x.conf", "-p", "/tmp/x.pid"]);
    assert_eq!(cli.config, PathBuf::from("/tmp/x.conf"));
    assert_eq!(cli.pidfile, Some(PathBuf::from("/tmp/x.pid")));
}

#[test]
fn log_file_defaults_and_can_be_overridden() {
    let cli = Cli::parse_from(["pmtrd"]);
    assert_eq!(cli.log_file, PathBuf::from("/var/log/pmtrd.log"));
    let cli = Cli::parse_from(["pmtrd", "-l", "/tmp/x.log"]);
    assert_eq!(cli.log_file, PathBuf::from("/tmp/x.log"));
}
