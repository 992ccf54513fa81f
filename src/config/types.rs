// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for ninjapie.
//!
//! # Config Structure
//!
//! ```text
//! Config: GlobalConfig, PathsConfig, GeneratorConfig, ToolsConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::graph::DefaultsMode;
use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Write the log file as JSON lines.
    pub json_log: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
            json_log: false,
        }
    }
}

/// Graph file generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Graph file name below the build root.
    pub graph_file: String,
    /// Glob ledger file name below the build root.
    pub ledger_file: String,
    /// Regeneration command (default: the running executable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Extra configuration scripts watched by the regeneration step.
    pub scripts: Vec<PathBuf>,
    /// Variable hoisting mode.
    pub defaults: DefaultsMode,
    /// Also write `compile_commands.json` into the build root.
    pub compile_commands: bool,
    /// Rules whose steps go into the compilation database.
    pub compile_rules: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            graph_file: "build.ninja".to_string(),
            ledger_file: ".build.globs".to_string(),
            command: None,
            scripts: Vec::new(),
            defaults: DefaultsMode::default(),
            compile_commands: false,
            compile_rules: vec!["cc".to_string(), "cxx".to_string()],
        }
    }
}

/// Default tool names seeded into root environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub cc: String,
    pub cxx: String,
    pub cpp: String,
    /// Assembler driver.
    #[serde(rename = "as")]
    pub asm: String,
    pub ar: String,
    pub ranlib: String,
    /// Shared library linker.
    pub shlink: String,
    pub strip: String,
    pub cargo: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cc: "gcc".to_string(),
            cxx: "g++".to_string(),
            cpp: "cpp".to_string(),
            asm: "gcc".to_string(),
            ar: "gcc-ar".to_string(),
            ranlib: "gcc-ranlib".to_string(),
            shlink: "gcc".to_string(),
            strip: "strip".to_string(),
            cargo: "cargo".to_string(),
        }
    }
}

impl ToolsConfig {
    /// Tool names keyed by their environment variable.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("CC", self.cc.as_str()),
            ("CXX", self.cxx.as_str()),
            ("CPP", self.cpp.as_str()),
            ("AS", self.asm.as_str()),
            ("AR", self.ar.as_str()),
            ("RANLIB", self.ranlib.as_str()),
            ("SHLINK", self.shlink.as_str()),
            ("STRIP", self.strip.as_str()),
            ("CARGO", self.cargo.as_str()),
        ]
        .into_iter()
    }
}
