// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use bitflags::bitflags;
use bon::Builder;
use std::fmt;

bitflags! {
    /// Rule attributes that Ninja treats as booleans.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RuleFlags: u8 {
        /// The rule re-generates the graph file itself (`generator = 1`).
        const GENERATOR = 0x01;
        /// Re-stat outputs after the command and prune unchanged ones.
        const RESTAT = 0x02;
    }
}

/// Dependency-file format understood by Ninja's `deps` binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepsStyle {
    Gcc,
    Msvc,
}

impl DepsStyle {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Msvc => "msvc",
        }
    }
}

impl fmt::Display for DepsStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named command template.
///
/// Templates are written verbatim; `$in`, `$out` and any other `$name`
/// are resolved by Ninja from the build step's bindings.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct Rule {
    #[builder(into)]
    command: String,
    #[builder(setters(name = with_description), into)]
    description: Option<String>,
    #[builder(setters(name = with_deps))]
    deps: Option<DepsStyle>,
    #[builder(setters(name = with_depfile), into)]
    depfile: Option<String>,
    #[builder(setters(name = with_pool), into)]
    pool: Option<String>,
    #[builder(setters(name = with_rspfile), into)]
    rspfile: Option<String>,
    #[builder(setters(name = with_rspfile_content), into)]
    rspfile_content: Option<String>,
    #[builder(setters(name = with_flags), default)]
    flags: RuleFlags,
}

impl Rule {
    /// Shorthand for a rule with a command and a description.
    #[must_use]
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self::builder()
            .command(command)
            .with_description(description)
            .build()
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn deps(&self) -> Option<DepsStyle> {
        self.deps
    }

    #[must_use]
    pub fn depfile(&self) -> Option<&str> {
        self.depfile.as_deref()
    }

    #[must_use]
    pub fn pool(&self) -> Option<&str> {
        self.pool.as_deref()
    }

    #[must_use]
    pub fn rspfile(&self) -> Option<&str> {
        self.rspfile.as_deref()
    }

    #[must_use]
    pub fn rspfile_content(&self) -> Option<&str> {
        self.rspfile_content.as_deref()
    }

    #[must_use]
    pub const fn flags(&self) -> RuleFlags {
        self.flags
    }

    /// Returns every template of the rule, for variable reference scanning.
    pub(crate) fn templates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.command.as_str()).chain(
            [
                self.description.as_deref(),
                self.depfile.as_deref(),
                self.rspfile.as_deref(),
                self.rspfile_content.as_deref(),
            ]
            .into_iter()
            .flatten(),
        )
    }
}
