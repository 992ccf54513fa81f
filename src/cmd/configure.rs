// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point of configuration programs.
//!
//! ```text
//! fn main() -> ExitCode {
//!     run(|generator, env| { ... env.cc(generator, "hello.o", ["hello.c"])?; ... Ok(()) })
//! }
//!
//! run
//!   ConfigureCli::parse -> load_config -> init_logging
//!   generate
//!     Generator::new        (glob ledger checked first)
//!     Env::with_tools       (root env, [tools] section)
//!     scripts               (configure.rs + generator.scripts)
//!     user closure
//!     write                 (graph, ledger, compile_commands.json)
//!   Error -> "Error: <message>" on stderr, failure exit code
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

use super::load_config;
use crate::cli::ConfigureCli;
use crate::cli::global::GlobalOptions;
use crate::config::Config;
use crate::env::Env;
use crate::error::Result;
use crate::graph::{CONFIGURE_SCRIPT, Generator};
use crate::logging::init_logging;

/// File name of the compilation database, inside the build root.
pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// Runs a configuration program: parses the command line, loads the
/// configuration and writes the graph produced by `configure`.
///
/// Any error is printed as `Error: <message>` and turns into a failure exit
/// code.
///
/// # Example
/// ```no_run
/// use ninjapie::cmd::configure::run;
/// use std::process::ExitCode;
///
/// fn main() -> ExitCode {
///     run(|generator, env| {
///         let obj = env.cc(generator, "hello.o", ["hello.c"])?;
///         env.c_exe(generator, "hello", [obj], &[], &[])?;
///         Ok(())
///     })
/// }
/// ```
pub fn run<F>(configure: F) -> ExitCode
where
    F: FnOnce(&mut Generator, &mut Env) -> Result<()>,
{
    let cli = ConfigureCli::parse();
    run_with(&cli.global, configure)
}

/// Like [`run`], with already parsed options.
pub fn run_with<F>(global: &GlobalOptions, configure: F) -> ExitCode
where
    F: FnOnce(&mut Generator, &mut Env) -> Result<()>,
{
    match configure_project(global, configure) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn configure_project<F>(global: &GlobalOptions, configure: F) -> Result<PathBuf>
where
    F: FnOnce(&mut Generator, &mut Env) -> Result<()>,
{
    let config = load_config(global).context("failed to load configuration")?;
    let _log_guard = init_logging(&config.log_config())?;
    debug!(options = ?global, "loaded configuration");
    generate(&config, configure)
}

/// Builds and writes the graph of a project described by `config`.
///
/// Returns the path of the written graph file.
///
/// # Errors
///
/// Returns the first error of the generator setup, the `configure` closure
/// or the write phase. Nothing is written unless `configure` succeeds and
/// the graph validates.
pub fn generate<F>(config: &Config, configure: F) -> Result<PathBuf>
where
    F: FnOnce(&mut Generator, &mut Env) -> Result<()>,
{
    let mut generator = Generator::new(config.generator_options()?)?;
    let mut env = Env::with_tools(&generator, &config.tools);

    let root_script = config.paths.root()?.join(CONFIGURE_SCRIPT);
    if root_script.is_file() {
        let script = generator.context().relativize(&root_script)?;
        generator.add_script(script)?;
    }
    for script in &config.generator.scripts {
        let script = generator
            .context()
            .relativize(script)
            .with_context(|| format!("invalid script in [generator]: {}", script.display()))?;
        generator.add_script(script)?;
    }

    configure(&mut generator, &mut env)?;

    let path = generator.write()?;
    if config.generator.compile_commands {
        let ctx = generator.context();
        let database = ctx.absolute(&ctx.build_root().into()).join(COMPILE_COMMANDS_FILE);
        generator.write_compile_commands(&database)?;
    }

    info!(
        path = %path.display(),
        staleness = %generator.staleness(),
        globs_changed = generator.globs_changed(),
        "configuration finished"
    );
    Ok(path)
}
