// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! ninjapie [global options] <command>
//!   version
//!   options
//!   inis
//!   status [--exit-code]
//!
//! <configure program> [global options]      (cmd::configure::run)
//! ```

pub mod global;
pub mod status;

#[cfg(test)]
mod tests;

use crate::cli::global::GlobalOptions;
use crate::cli::status::StatusArgs;
use clap::{Parser, Subcommand};

/// Ninja build file generator.
#[derive(Debug, Parser)]
#[command(
    name = "ninjapie",
    author,
    version,
    about = "Ninja build file generator",
    long_about = "ninjapie Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Inspects the configuration and the generated build graph of a\n\
                  project. The graph itself is written by the project's own\n\
                  configuration program, which links against this crate.",
    after_help = "CONFIG FILES:\n\n\
                  ninjapie reads `ninjapie.toml` from the current directory if it\n\
                  exists. Additional files can be given with --ini; they are loaded\n\
                  afterwards and override it. NINJAPIE_SECTION__KEY environment\n\
                  variables and --set override both."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files in use.
    Inis,

    /// Reports whether the build graph is out of date.
    Status(StatusArgs),
}

/// Command line of a configuration program.
#[derive(Debug, Parser)]
#[command(
    name = "configure",
    about = "Generates the Ninja build graph of this project"
)]
pub struct ConfigureCli {
    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
