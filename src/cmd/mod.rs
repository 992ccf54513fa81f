// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> config_loader --> cmd handlers
//!   configure (configuration programs), config (options, inis), status
//! ```

pub mod config;
pub mod configure;
pub mod status;

#[cfg(test)]
mod tests;

use crate::cli::global::GlobalOptions;
use crate::config::{CONFIG_FILE, Config, ConfigLoader, ENV_PREFIX};
use crate::error::Result;

/// Builds the configuration loader for the given command line.
///
/// `ninjapie.toml` in the current directory is optional; `--ini` files are
/// required and override it.
///
/// # Errors
///
/// Returns an error if a `--set` override is malformed.
pub fn config_loader(global: &GlobalOptions) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional(CONFIG_FILE);
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for assignment in global.to_config_overrides() {
        loader = loader.set_assignment(&assignment)?;
    }
    Ok(loader)
}

/// Loads the effective configuration for the given command line.
///
/// # Errors
///
/// Returns an error if a configuration source is missing or invalid.
pub fn load_config(global: &GlobalOptions) -> Result<Config> {
    config_loader(global)?.build()
}
