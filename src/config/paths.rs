// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path configuration.
//!
//! ```text
//! root/              (project root, default: current directory)
//!   build/           (build root, relative to root)
//!     build.ninja
//!     .build.globs
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Project and build root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Project root; Ninja runs here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Build root, relative to the project root.
    pub build: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: None,
            build: PathBuf::from("build"),
        }
    }
}

impl PathsConfig {
    /// Makes the project root absolute (default: current directory) and
    /// expresses the build root relative to it.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` if the current directory cannot
    /// be determined, or the build root is empty or outside the project root.
    pub fn resolve(&mut self) -> Result<()> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::InvalidValue {
            section: "paths".to_string(),
            key: "root".to_string(),
            message: format!("cannot determine the current directory: {e}"),
        })?;

        let root = match self.root.take() {
            Some(root) if root.is_relative() => cwd.join(root),
            Some(root) => root,
            None => cwd,
        };

        if self.build.is_absolute() {
            let relative = self
                .build
                .strip_prefix(&root)
                .map_err(|_| ConfigError::InvalidValue {
                    section: "paths".to_string(),
                    key: "build".to_string(),
                    message: format!(
                        "'{}' is not inside the project root '{}'",
                        self.build.display(),
                        root.display()
                    ),
                })?;
            self.build = relative.to_path_buf();
        }
        if self.build.as_os_str().is_empty() || self.build == Path::new(".") {
            return Err(ConfigError::InvalidValue {
                section: "paths".to_string(),
                key: "build".to_string(),
                message: "the build root must be a subdirectory of the project root".to_string(),
            }
            .into());
        }

        self.root = Some(root);
        Ok(())
    }

    /// Get the project root, returning an error if not resolved.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if the root is not set.
    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or_else(|| {
            ConfigError::MissingKey {
                section: "paths".to_string(),
                key: "root".to_string(),
            }
            .into()
        })
    }
}
