// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!   anyhow::Result (application layers: cmd, config, logging)
//!          ^
//!          | ?
//!   +------+-------+
//!   |              |
//! GraphError    ConfigError
//!   InvalidPath      ParseError
//!   DuplicateRule    MissingKey
//!   DuplicateOutput  InvalidValue
//!   GraphIntegrity
//!   GlobResolution
//!   Io
//! ```
//!
//! Graph errors are raised at the call site that first detects them and
//! propagate unchanged to the configuration program.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`GraphError`].
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Errors raised while describing or writing the build graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed path, or a path outside the project root.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A rule name was registered twice with different definitions.
    #[error("rule '{name}' is already registered with a different definition")]
    DuplicateRule { name: String },

    /// Two build steps claim the same output, or one step lists it twice
    /// (`first == second`).
    #[error("{}", duplicate_output_message(.output, .first, .second))]
    DuplicateOutput {
        output: String,
        first: String,
        second: String,
    },

    /// Consistency violation detected while serializing the graph.
    #[error("graph integrity violation: {0}")]
    GraphIntegrity(String),

    /// A glob pattern could not be resolved.
    #[error("failed to resolve glob '{pattern}': {message}")]
    GlobResolution { pattern: String, message: String },

    /// Writing the graph file, ledger or compilation database failed.
    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GraphError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        Self::GraphIntegrity(message.into())
    }

    pub(crate) fn glob(pattern: impl Into<String>, message: impl ToString) -> Self {
        Self::GlobResolution {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

fn duplicate_output_message(output: &str, first: &str, second: &str) -> String {
    if first == second {
        format!("output '{output}' is listed twice in the build step added at {first}")
    } else {
        format!(
            "output '{output}' added at {second} is already produced by the build step added at {first}"
        )
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a configuration source.
    #[error("failed to parse config '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}
