// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for CLI parsing.
//!
//! Tests the CLI module with realistic command-line argument patterns.

use clap::Parser;
use ninjapie::cli::global::GlobalOptions;
use ninjapie::cli::{Cli, Command, ConfigureCli};
use std::path::PathBuf;

// =============================================================================
// Commands
// =============================================================================

#[test]
fn cli_version_command() {
    let cli = Cli::try_parse_from(["ninjapie", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn cli_no_command() {
    let cli = Cli::try_parse_from(["ninjapie"]).unwrap();
    assert!(cli.command.is_none());
}

#[test]
fn cli_inis_with_files() {
    let cli = Cli::try_parse_from(["ninjapie", "-i", "base.toml", "--ini", "ci.toml", "inis"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Inis)));
    assert_eq!(
        cli.global.inis,
        [PathBuf::from("base.toml"), PathBuf::from("ci.toml")]
    );
}

#[test]
fn cli_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["ninjapie", "build"]).is_err());
}

// =============================================================================
// Global options
// =============================================================================

#[test]
fn cli_global_options_after_command() {
    // global options are not propagated to subcommands
    let cli = Cli::try_parse_from(["ninjapie", "status", "--exit-code", "-B", "out/ninja"]);
    assert!(cli.is_err());

    let cli = Cli::try_parse_from(["ninjapie", "-B", "out/ninja", "status", "--exit-code"]).unwrap();
    assert_eq!(cli.global.build_dir, Some(PathBuf::from("out/ninja")));
}

#[test]
fn cli_configure_program_options() {
    let cli = ConfigureCli::try_parse_from([
        "configure",
        "-l",
        "6",
        "--file-log-level",
        "2",
        "--log-file",
        "build/configure.log",
        "-B",
        "out",
        "-s",
        "tools.cxx=clang++",
    ])
    .unwrap();

    let GlobalOptions {
        log_level,
        file_log_level,
        log_file,
        build_dir,
        options,
        inis,
    } = cli.global;
    assert_eq!(log_level, Some(6));
    assert_eq!(file_log_level, Some(2));
    assert_eq!(log_file, Some(PathBuf::from("build/configure.log")));
    assert_eq!(build_dir, Some(PathBuf::from("out")));
    assert_eq!(options, ["tools.cxx=clang++"]);
    assert!(inis.is_empty());
}

#[test]
fn cli_overrides_without_flags() {
    let overrides = GlobalOptions::default().to_config_overrides();
    assert!(overrides.is_empty());
}
