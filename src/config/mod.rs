// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for ninjapie.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. ninjapie.toml (cwd, optional)
//! 3. --ini files
//! 4. NINJAPIE_* env vars
//! 5. CLI overrides (--set, --log-level, --build-dir, ...)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! NINJAPIE_GLOBAL__OUTPUT_LOG_LEVEL=4 → global.output_log_level = 4
//! NINJAPIE_PATHS__BUILD=out           → paths.build = "out"
//! NINJAPIE_TOOLS__CC=clang            → tools.cc = "clang"
//! ```
//!
//! # Example
//!
//! ```toml
//! [paths]
//! build = "out"
//!
//! [generator]
//! defaults = "auto"
//! compile_commands = true
//!
//! [tools]
//! cc = "ccache gcc"
//! ```

pub mod loader;
pub mod paths;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::graph::GeneratorOptions;
use crate::logging::LogConfig;

pub use loader::ConfigLoader;
pub use paths::PathsConfig;
pub use types::{GeneratorConfig, GlobalConfig, ToolsConfig};

/// Name of the configuration file read from the current directory.
pub const CONFIG_FILE: &str = "ninjapie.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "NINJAPIE";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Project and build roots.
    pub paths: PathsConfig,
    /// Graph file generation.
    pub generator: GeneratorConfig,
    /// Default tool names.
    pub tools: ToolsConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ninjapie::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("ninjapie.toml")
    ///     .with_env_prefix("NINJAPIE")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Resolve all paths and validate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the roots cannot be resolved or generator file
    /// names are unusable.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        self.paths.resolve()?;

        for (key, name) in [
            ("graph_file", &self.generator.graph_file),
            ("ledger_file", &self.generator.ledger_file),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    section: "generator".to_string(),
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                }
                .into());
            }
        }
        if self.generator.graph_file == self.generator.ledger_file {
            return Err(ConfigError::InvalidValue {
                section: "generator".to_string(),
                key: "ledger_file".to_string(),
                message: "must differ from graph_file".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Options for a [`Generator`](crate::graph::Generator) built from this
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if the paths are not resolved.
    pub fn generator_options(&self) -> Result<GeneratorOptions> {
        let root = self.paths.root()?;
        Ok(GeneratorOptions::builder()
            .project_root(root)
            .with_build_root(self.paths.build.clone())
            .with_graph_file(self.generator.graph_file.clone())
            .with_ledger_file(self.generator.ledger_file.clone())
            .maybe_with_regen_command(self.generator.command.clone())
            .with_defaults(self.generator.defaults)
            .with_compile_rules(self.generator.compile_rules.clone())
            .build())
    }

    /// Logging setup described by the `[global]` section.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::builder()
            .with_console_level(self.global.output_log_level)
            .with_file_level(self.global.file_log_level)
            .maybe_with_log_file(self.global.log_file.clone())
            .with_json_file(self.global.json_log)
            .build()
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_paths_options(&mut options);
        self.format_generator_options(&mut options);
        self.format_tools_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert("global.log_file".into(), fmt_path(self.global.log_file.as_ref()));
        options.insert("global.json_log".into(), self.global.json_log.to_string());
    }

    fn format_paths_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("paths.root".into(), fmt_path(self.paths.root.as_ref()));
        options.insert("paths.build".into(), self.paths.build.display().to_string());
    }

    fn format_generator_options(&self, options: &mut BTreeMap<String, String>) {
        let generator = &self.generator;
        options.insert("generator.graph_file".into(), generator.graph_file.clone());
        options.insert("generator.ledger_file".into(), generator.ledger_file.clone());
        options.insert(
            "generator.command".into(),
            generator.command.clone().unwrap_or_default(),
        );
        options.insert(
            "generator.scripts".into(),
            generator
                .scripts
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
        options.insert("generator.defaults".into(), generator.defaults.to_string());
        options.insert(
            "generator.compile_commands".into(),
            generator.compile_commands.to_string(),
        );
        options.insert(
            "generator.compile_rules".into(),
            generator.compile_rules.join(", "),
        );
    }

    fn format_tools_options(&self, options: &mut BTreeMap<String, String>) {
        for (name, tool) in self.tools.entries() {
            options.insert(
                format!("tools.{}", name.to_ascii_lowercase()),
                tool.to_string(),
            );
        }
    }
}

fn fmt_path(path: Option<&PathBuf>) -> String {
    path.map_or_else(String::new, |p| p.display().to_string())
}
