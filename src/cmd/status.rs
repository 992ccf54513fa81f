// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Status command: is the generated graph still current?

use std::path::PathBuf;
use std::process::ExitCode;

use crate::cli::status::StatusArgs;
use crate::config::Config;
use crate::error::Result;
use crate::glob::{Staleness, load_ledger};
use crate::path::PathContext;

/// State of the generated graph of a project.
#[derive(Debug, Clone)]
pub struct GraphStatus {
    pub graph: PathBuf,
    pub graph_exists: bool,
    pub staleness: Staleness,
}

impl GraphStatus {
    /// Whether the configuration program has to run again.
    #[must_use]
    pub const fn needs_regeneration(&self) -> bool {
        !self.graph_exists || self.staleness.is_stale()
    }
}

/// Inspects the graph file and the glob ledger of the configured project.
///
/// # Errors
///
/// Returns an error if the configured roots or file names are unusable.
pub fn graph_status(config: &Config) -> Result<GraphStatus> {
    let options = config.generator_options()?;
    let ctx = PathContext::new(options.project_root(), options.build_root())?;
    let build_root = ctx.build_root();
    let graph = ctx.absolute(&build_root.join(options.graph_file())?.into());
    let ledger = ctx.absolute(&build_root.join(options.ledger_file())?.into());

    let (_, staleness) = load_ledger(&ctx, &ledger);
    Ok(GraphStatus {
        graph_exists: graph.is_file(),
        graph,
        staleness,
    })
}

/// Prints the graph status.
///
/// With `--exit-code`, a graph that needs regeneration exits with status 1.
///
/// # Errors
///
/// See [`graph_status`].
pub fn run_status_command(args: &StatusArgs, config: &Config) -> Result<ExitCode> {
    let status = graph_status(config)?;
    let presence = if status.graph_exists {
        "present"
    } else {
        "missing"
    };
    println!("graph: {} ({presence})", status.graph.display());
    println!("globs: {}", status.staleness);

    if args.exit_code && status.needs_regeneration() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
