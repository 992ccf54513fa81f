// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options shared by `ninjapie` and configuration programs.
//!
//! # Option Precedence
//!
//! ```text
//! --ini FILE          <- additional config files (can repeat)
//! --log-level N       <- console verbosity (0-6)
//! --file-log-level N  <- file verbosity (defaults to --log-level)
//! --log-file FILE     <- global.log_file override
//! --build-dir DIR     <- paths.build override
//! --set KEY=VAL       <- direct config override
//!
//! Precedence: CLI flags > --set > NINJAPIE_* > --ini > ninjapie.toml > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times.
    #[arg(short = 'i', long = "ini", value_name = "FILE", action = clap::ArgAction::Append)]
    pub inis: Vec<PathBuf>,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// File log level, overrides --log-level for the log file.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Build root, relative to the project root.
    #[arg(short = 'B', long = "build-dir", value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Sets an option, such as 'tools.cc=clang' or 'generator.defaults=auto'.
    /// Can be specified multiple times.
    #[arg(short = 's', long = "set", value_name = "OPTION", action = clap::ArgAction::Append)]
    pub options: Vec<String>,
}

impl GlobalOptions {
    /// Converts command-line options to `key=value` configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = self.options.clone();

        if let Some(level) = self.log_level {
            overrides.push(format!("global.output_log_level={level}"));
        }

        // file_log_level falls back to log_level if not specified
        if let Some(level) = self.file_log_level.or(self.log_level) {
            overrides.push(format!("global.file_log_level={level}"));
        }

        if let Some(ref path) = self.log_file {
            overrides.push(format!("global.log_file={}", path.display()));
        }

        if let Some(ref dir) = self.build_dir {
            overrides.push(format!("paths.build={}", dir.display()));
        }

        overrides
    }
}
