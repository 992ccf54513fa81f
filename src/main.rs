// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Command Dispatch
//!   Version | Options | Inis | Status
//! ```

use std::process::ExitCode;

use ninjapie::cli::global::GlobalOptions;
use ninjapie::cli::{self, Command};
use ninjapie::cmd::config::{run_inis_command, run_options_command};
use ninjapie::cmd::status::run_status_command;
use ninjapie::cmd::{config_loader, load_config};
use ninjapie::logging::init_logging;
use ninjapie::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli)
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::WARN);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.clone())
        .build()
}

fn dispatch_command(cli: &cli::Cli) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Options) => load_config(&cli.global).map(|config| {
            run_options_command(&config);
            ExitCode::SUCCESS
        }),
        Some(Command::Inis) => config_loader(&cli.global).map(|loader| {
            run_inis_command(&loader.format_loaded_files());
            ExitCode::SUCCESS
        }),
        Some(Command::Status(args)) => {
            load_config(&cli.global).and_then(|config| run_status_command(args, &config))
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}
