// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::{Cli, Command, ConfigureCli};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["ninjapie", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_status_exit_code() {
    let cli = Cli::try_parse_from(["ninjapie", "status", "--exit-code"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Status(args)) if args.exit_code));

    let cli = Cli::try_parse_from(["ninjapie", "status"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Status(args)) if !args.exit_code));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "ninjapie",
        "-l",
        "5",
        "-B",
        "out",
        "--ini",
        "a.toml",
        "--ini",
        "b.toml",
        "-s",
        "tools.cc=clang",
        "options",
    ])
    .unwrap();
    assert_eq!(cli.global.log_level, Some(5));
    assert_eq!(cli.global.build_dir, Some(PathBuf::from("out")));
    assert_eq!(
        cli.global.inis,
        [PathBuf::from("a.toml"), PathBuf::from("b.toml")]
    );
    assert!(matches!(cli.command, Some(Command::Options)));
}

#[test]
fn test_log_level_out_of_range() {
    assert!(Cli::try_parse_from(["ninjapie", "-l", "7", "version"]).is_err());
}

#[test]
fn test_config_overrides() {
    let cli = ConfigureCli::try_parse_from([
        "configure",
        "--set",
        "generator.defaults=auto",
        "-l",
        "4",
        "--log-file",
        "build/configure.log",
        "--build-dir",
        "out",
    ])
    .unwrap();
    insta::assert_debug_snapshot!(cli.global.to_config_overrides(), @r#"
    [
        "generator.defaults=auto",
        "global.output_log_level=4",
        "global.file_log_level=4",
        "global.log_file=build/configure.log",
        "paths.build=out",
    ]
    "#);
}

#[test]
fn test_file_log_level_overrides_console_level() {
    let cli = ConfigureCli::try_parse_from(["configure", "-l", "1", "--file-log-level", "5"]).unwrap();
    assert_eq!(
        cli.global.to_config_overrides(),
        ["global.output_log_level=1", "global.file_log_level=5"]
    );
}

#[test]
fn test_configure_rejects_subcommands() {
    assert!(ConfigureCli::try_parse_from(["configure", "status"]).is_err());
}
