// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Types for environment variables and build requests.
//!
//! # Architecture
//!
//! ```text
//! EnvFlags: Replace | Append | Prepend
//! VarScope: BTreeMap<String, Vec<String>> for deterministic order
//! BuildRequest: rule + outputs/inputs/implicit/order-only + bindings + libs
//! ```

use std::collections::BTreeMap;

use crate::path::PathArg;

/// How a token list is combined with an existing variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvFlags {
    /// Replace the existing tokens (default)
    #[default]
    Replace,
    /// Append after the existing tokens
    Append,
    /// Prepend before the existing tokens
    Prepend,
}

/// Variable data shared between an environment and its unmodified clones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct VarScope {
    vars: BTreeMap<String, Vec<String>>,
}

impl VarScope {
    pub(super) const fn vars(&self) -> &BTreeMap<String, Vec<String>> {
        &self.vars
    }

    pub(super) const fn vars_mut(&mut self) -> &mut BTreeMap<String, Vec<String>> {
        &mut self.vars
    }
}

/// Description of one build step, resolved by [`Env::build`](super::Env::build).
///
/// Raw string paths are interpreted relative to the environment's current
/// directory; outputs always land in the build tree.
///
/// ```
/// use ninjapie::env::BuildRequest;
///
/// let request = BuildRequest::new("cc")
///     .output("foo.o")
///     .input("foo.c")
///     .implicit("config.h")
///     .var("ccflags", "-O2");
/// assert_eq!(request.rule(), "cc");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct BuildRequest {
    pub(super) rule: String,
    pub(super) outputs: Vec<PathArg>,
    pub(super) inputs: Vec<PathArg>,
    pub(super) implicit: Vec<PathArg>,
    pub(super) order_only: Vec<PathArg>,
    pub(super) vars: BTreeMap<String, String>,
    pub(super) libs: Vec<String>,
}

impl BuildRequest {
    /// Starts a request for `rule`.
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            outputs: Vec::new(),
            inputs: Vec::new(),
            implicit: Vec::new(),
            order_only: Vec::new(),
            vars: BTreeMap::new(),
            libs: Vec::new(),
        }
    }

    /// Adds an output.
    pub fn output(mut self, path: impl Into<PathArg>) -> Self {
        self.outputs.push(path.into());
        self
    }

    /// Adds multiple outputs.
    pub fn outputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        self.outputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds an explicit input (`$in`).
    pub fn input(mut self, path: impl Into<PathArg>) -> Self {
        self.inputs.push(path.into());
        self
    }

    /// Adds multiple explicit inputs.
    pub fn inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds an implicit dependency (not part of `$in`).
    pub fn implicit(mut self, path: impl Into<PathArg>) -> Self {
        self.implicit.push(path.into());
        self
    }

    /// Adds multiple implicit dependencies.
    pub fn implicits<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathArg>,
    {
        self.implicit.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds an order-only dependency.
    pub fn order_only(mut self, path: impl Into<PathArg>) -> Self {
        self.order_only.push(path.into());
        self
    }

    /// Binds a step variable, overriding any environment variable of the
    /// same name.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Requests libraries (`lib<name>.so` / `lib<name>.a`) that are looked up
    /// among the graph's outputs in the `LIBPATH` directories.
    pub fn libs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libs.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }
}
