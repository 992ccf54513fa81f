// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment struct; every clone is an independent copy.
//!
//! # Architecture
//!
//! ```text
//! Env
//!   data: Arc<VarScope>   variables, copied for a clone's first change
//!   ctx:  PathContext     current source subdirectory
//!   id:   u32             fresh for every clone (object file suffix)
//!
//! clone()  -> independent copy of the variables, new id
//! set()    -> changes only this Env, never the original or other clones
//! build()  -> BuildStep with the variables the rule references
//! ```
//!
//! Sharing the `Arc` until a change is an allocation detail: a clone
//! behaves exactly as if all variables were copied when it was made.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

use super::types::{BuildRequest, EnvFlags, VarScope};
use crate::config::types::ToolsConfig;
use crate::error::{GraphError, GraphResult};
use crate::graph::rule::Rule;
use crate::graph::step::{BuildStep, LibLookup};
use crate::graph::{CONFIGURE_SCRIPT, Generator, referenced_vars};
use crate::path::{BuildPath, NodePath, PathArg, PathContext, SourcePath};

/// Flag lists every environment starts with.
const FLAG_VARS: &[&str] = &[
    "ASFLAGS",
    "CFLAGS",
    "CPPFLAGS",
    "CXXFLAGS",
    "LINKFLAGS",
    "SHLINKFLAGS",
    "ARFLAGS",
    "INSTFLAGS",
    "CPPPATH",
    "LIBPATH",
    "CRGFLAGS",
    "CRGENV",
];

/// Variables Ninja binds itself.
const NINJA_BUILTINS: &[&str] = &["in", "in_newline", "out"];

/// A set of token-list variables plus the current source subdirectory.
///
/// Cloning is cheap: the variables are shared until one side modifies them.
/// Every clone receives a new id, which keeps object files of different
/// environments apart.
pub struct Env {
    data: Arc<VarScope>,
    ctx: PathContext,
    id: u32,
    ids: Arc<AtomicU32>,
}

impl Clone for Env {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            ctx: self.ctx.clone(),
            id: self.ids.fetch_add(1, Ordering::Relaxed),
            ids: Arc::clone(&self.ids),
        }
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("id", &self.id)
            .field("cur_dir", &self.ctx.cur_dir())
            .field("vars", self.data.vars())
            .finish_non_exhaustive()
    }
}

impl Env {
    /// Creates the root environment with the default gcc/binutils tools.
    #[must_use]
    pub fn new(generator: &Generator) -> Self {
        Self::with_tools(generator, &ToolsConfig::default())
    }

    /// Creates the root environment with the given tool names.
    ///
    /// Tool names may contain several words (`ccache gcc`); they are stored
    /// as token lists.
    #[must_use]
    pub fn with_tools(generator: &Generator, tools: &ToolsConfig) -> Self {
        let mut scope = VarScope::default();
        let vars = scope.vars_mut();
        for (name, tool) in tools.entries() {
            vars.insert(
                name.to_string(),
                tool.split_whitespace().map(str::to_string).collect(),
            );
        }
        for name in FLAG_VARS {
            vars.insert((*name).to_string(), Vec::new());
        }
        vars.insert("RUSTBINS".to_string(), vec![".".to_string()]);

        let env = Self {
            data: Arc::new(scope),
            ctx: generator.context().clone(),
            id: generator.next_env_id(),
            ids: generator.env_ids(),
        };
        debug!(id = env.id, "created environment");
        env
    }

    /// Identifier of this environment, unique within its generator.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub const fn context(&self) -> &PathContext {
        &self.ctx
    }

    /// Source subdirectory raw input paths are relative to.
    #[must_use]
    pub fn cur_dir(&self) -> SourcePath {
        self.ctx.cur_dir()
    }

    #[must_use]
    pub fn build_root(&self) -> BuildPath {
        self.ctx.build_root()
    }

    /// Build directory mirroring [`Env::cur_dir`].
    #[must_use]
    pub fn out_dir(&self) -> BuildPath {
        self.ctx.out_dir()
    }

    /// Replaces a variable.
    pub fn set<I, S>(&mut self, name: impl Into<String>, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_with_flags(name, tokens, EnvFlags::Replace)
    }

    /// Combines `tokens` with the existing value of a variable.
    pub fn set_with_flags<I, S>(
        &mut self,
        name: impl Into<String>,
        tokens: I,
        flags: EnvFlags,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let vars = Arc::make_mut(&mut self.data).vars_mut();

        match flags {
            EnvFlags::Replace => {
                vars.insert(name, tokens);
            }
            EnvFlags::Append => vars.entry(name).or_default().extend(tokens),
            EnvFlags::Prepend => {
                let existing = vars.entry(name).or_default();
                let mut merged = tokens;
                merged.append(existing);
                *existing = merged;
            }
        }
        self
    }

    pub fn append<I, S>(&mut self, name: impl Into<String>, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_with_flags(name, tokens, EnvFlags::Append)
    }

    pub fn prepend<I, S>(&mut self, name: impl Into<String>, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_with_flags(name, tokens, EnvFlags::Prepend)
    }

    /// Appends a single token.
    pub fn add_flag(&mut self, name: impl Into<String>, flag: impl Into<String>) -> &mut Self {
        self.append(name, [flag])
    }

    pub fn add_flags<I, S>(&mut self, name: impl Into<String>, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.append(name, flags)
    }

    /// Removes every occurrence of `flag`; unknown variables are left alone.
    pub fn remove_flag(&mut self, name: &str, flag: &str) -> &mut Self {
        self.remove_flags(name, [flag])
    }

    pub fn remove_flags<'a, I>(&mut self, name: &str, flags: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let flags: Vec<&str> = flags.into_iter().collect();
        let present = self
            .get(name)
            .is_some_and(|tokens| tokens.iter().any(|t| flags.contains(&t.as_str())));
        if present
            && let Some(tokens) = Arc::make_mut(&mut self.data).vars_mut().get_mut(name)
        {
            tokens.retain(|t| !flags.contains(&t.as_str()));
        }
        self
    }

    /// Removes a variable.
    pub fn remove(&mut self, name: &str) -> &mut Self {
        if self.data.vars().contains_key(name) {
            Arc::make_mut(&mut self.data).vars_mut().remove(name);
        }
        self
    }

    /// Returns the tokens of a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.data.vars().get(name).map(Vec::as_slice)
    }

    /// Returns a variable's tokens joined by spaces.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).map(|tokens| tokens.join(" "))
    }

    /// All variables, ordered by name.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.data
            .vars()
            .iter()
            .map(|(name, tokens)| (name.as_str(), tokens.as_slice()))
    }

    /// Tokens of a variable, empty if unset.
    pub(super) fn tokens(&self, name: &str) -> &[String] {
        self.get(name).unwrap_or_default()
    }

    /// Registers a rule with the generator.
    ///
    /// # Errors
    ///
    /// See [`Generator::add_rule`].
    pub fn add_rule(&self, generator: &mut Generator, name: &str, rule: Rule) -> GraphResult<()> {
        generator.add_rule(name, rule)
    }

    /// Adds a build step and returns its outputs.
    ///
    /// Raw paths are resolved against [`Env::cur_dir`]. Every variable the
    /// rule's templates reference is bound from this environment (token lists
    /// joined by spaces); the request's own bindings take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::GraphIntegrity`] if the rule is not registered,
    /// [`GraphError::InvalidPath`] for unusable paths, and
    /// [`GraphError::DuplicateOutput`] if an output is already produced by
    /// another step. The graph is unchanged on error.
    #[track_caller]
    pub fn build(
        &self,
        generator: &mut Generator,
        request: BuildRequest,
    ) -> GraphResult<Vec<BuildPath>> {
        let origin = Location::caller();
        let BuildRequest {
            rule,
            outputs,
            inputs,
            implicit,
            order_only,
            vars,
            libs,
        } = request;

        let mut step = BuildStep::new(rule, origin);
        if step.rule != "phony" {
            let Some(definition) = generator.rule(&step.rule) else {
                return Err(GraphError::integrity(format!(
                    "build step added at {origin} uses unknown rule '{}'",
                    step.rule
                )));
            };
            for template in definition.templates() {
                for name in referenced_vars(template) {
                    if NINJA_BUILTINS.contains(&name) || step.variables.contains_key(name) {
                        continue;
                    }
                    if let Some(value) = self.get_str(name) {
                        step.variables.insert(name.to_string(), value);
                    }
                }
            }
        }
        step.variables.extend(vars);

        for output in outputs {
            step.outputs.push(self.ctx.output(output)?);
        }
        for input in inputs {
            step.inputs.push(self.ctx.resolve(input)?);
        }
        for dep in implicit {
            step.push_implicit(self.ctx.resolve(dep)?);
        }
        for dep in order_only {
            step.push_order_only(self.ctx.resolve(dep)?);
        }
        if !libs.is_empty() {
            step.libs = Some(LibLookup {
                names: libs,
                search: self.lib_dirs()?.into_iter().map(NodePath::Build).collect(),
            });
        }

        let outputs = step.outputs.clone();
        generator.add_step(step)?;
        Ok(outputs)
    }

    /// Expands a glob pattern relative to [`Env::cur_dir`].
    ///
    /// The scanned directories become inputs of the regeneration step.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::GlobResolution`] for invalid patterns or
    /// unreadable base directories.
    pub fn glob(&self, generator: &mut Generator, pattern: &str) -> GraphResult<Vec<SourcePath>> {
        generator.glob(&self.ctx, pattern)
    }

    /// Runs `f` with the current subdirectory switched to `dir`.
    ///
    /// `<dir>/configure.rs`, if present, is registered as a configuration
    /// script. The previous directory is restored afterwards, also when `f`
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if `dir` is outside the project or
    /// inside the build tree, and whatever `f` returns.
    pub fn sub_build<R, E, F>(&mut self, generator: &mut Generator, dir: &str, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Generator, &mut Self) -> Result<R, E>,
        E: From<GraphError>,
    {
        let sub = self.ctx.enter(dir)?;
        let script = self.ctx.absolute(&NodePath::Source(sub.cur_dir())).join(CONFIGURE_SCRIPT);
        if script.is_file() {
            let script = generator.context().relativize(&script)?;
            generator.add_script(script)?;
        }

        debug!(dir = %sub.cur_dir(), "entering sub-build");
        let previous = std::mem::replace(&mut self.ctx, sub);
        let result = f(generator, self);
        self.ctx = previous;
        result
    }

    /// Include directories (`CPPPATH`) as `-I` flags.
    pub(super) fn include_flags(&self) -> GraphResult<Vec<String>> {
        self.tokens("CPPPATH")
            .iter()
            .map(|dir| Ok(format!("-I{}", self.ctx.classify(dir)?)))
            .collect()
    }

    /// Library directories (`LIBPATH`), mapped into the build tree.
    pub(super) fn lib_dirs(&self) -> GraphResult<Vec<BuildPath>> {
        self.tokens("LIBPATH")
            .iter()
            .map(|dir| self.build_location(PathArg::from(dir)))
            .collect()
    }
}
