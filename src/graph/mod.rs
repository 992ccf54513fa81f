// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build graph accumulation and serialization.
//!
//! ```text
//! Generator::new(options)
//!    |  PathContext (project root, build root)
//!    |  GlobTracker::load  -> staleness of the previous run, evaluated first
//!    v
//! add_rule / add_pool / add_step / add_script   (via Env)
//!    |  duplicate outputs rejected at add time, naming both call sites
//!    v
//! write() / write_to_file(path)
//!    validate  -> GraphIntegrity, nothing written
//!    create build root
//!    graph     -> write_atomic(path)
//!    ledger    -> write_if_changed(build/.build.globs)     (last)
//! ```
//!
//! The graph file always contains a self-regeneration step for the file it
//! is written to. Its inputs are the configuration scripts and every
//! directory scanned by a glob, so Ninja re-runs the configuration program
//! when either changes. The ledger follows the graph: a run that fails to
//! write the graph leaves the previous ledger, which then reports stale.

pub mod rule;
pub mod step;
pub mod writer;

use bon::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::glob::{GlobTracker, Staleness};
use crate::path::{BuildPath, NodePath, PathArg, PathContext, SourcePath};
use crate::utility::fs::atomic::{write_atomic, write_if_changed};
use rule::Rule;
use step::BuildStep;

/// Name of the reserved self-regeneration rule.
pub const REGENERATE_RULE: &str = "regenerate";
/// Pool serializing the self-regeneration step.
pub const REGENERATE_POOL: &str = "regen_pool";
/// Phony target that is always out of date.
pub const ALWAYS_TARGET: &str = "always";
/// Phony target collecting all globbed directories, below the build root.
pub const GLOBS_CHECK: &str = ".globs-check";
/// Configuration script picked up in the project root and in sub-builds.
pub const CONFIGURE_SCRIPT: &str = "configure.rs";

/// How common variable bindings are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultsMode {
    /// Every step carries all of its bindings.
    #[default]
    Explicit,
    /// The most used value of each variable is hoisted to file scope and
    /// omitted from the steps that use it.
    Auto,
}

impl fmt::Display for DefaultsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// Options of a [`Generator`].
#[derive(Debug, Clone, Builder)]
pub struct GeneratorOptions {
    /// Directory Ninja runs in; all paths are relative to it.
    #[builder(into)]
    project_root: PathBuf,
    /// Build root, relative to the project root.
    #[builder(setters(name = with_build_root), into, default = PathBuf::from("build"))]
    build_root: PathBuf,
    /// Graph file name inside the build root.
    #[builder(setters(name = with_graph_file), into, default = "build.ninja".to_string())]
    graph_file: String,
    /// Glob ledger file name inside the build root.
    #[builder(setters(name = with_ledger_file), into, default = ".build.globs".to_string())]
    ledger_file: String,
    /// Command of the regeneration step (default: the running executable).
    #[builder(setters(name = with_regen_command), into)]
    regen_command: Option<String>,
    #[builder(setters(name = with_defaults), default)]
    defaults: DefaultsMode,
    /// Rules whose steps go into the compilation database.
    #[builder(setters(name = with_compile_rules), default = vec!["cc".to_string(), "cxx".to_string()])]
    compile_rules: Vec<String>,
}

impl GeneratorOptions {
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    #[must_use]
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    #[must_use]
    pub fn graph_file(&self) -> &str {
        &self.graph_file
    }

    #[must_use]
    pub fn ledger_file(&self) -> &str {
        &self.ledger_file
    }

    #[must_use]
    pub fn regen_command(&self) -> Option<&str> {
        self.regen_command.as_deref()
    }

    #[must_use]
    pub const fn defaults(&self) -> DefaultsMode {
        self.defaults
    }

    #[must_use]
    pub fn compile_rules(&self) -> &[String] {
        &self.compile_rules
    }
}

/// Matches `$$`, `${name}` and `$name` in templates.
pub(crate) fn var_ref_regex() -> Option<&'static Regex> {
    static VAR_REF: OnceLock<Option<Regex>> = OnceLock::new();
    VAR_REF
        .get_or_init(|| Regex::new(r"\$(?:\$|\{([A-Za-z0-9_.-]+)\}|([A-Za-z0-9_-]+))").ok())
        .as_ref()
}

/// Returns the variable names referenced by a template, in order of first use.
pub(crate) fn referenced_vars(template: &str) -> Vec<&str> {
    let Some(regex) = var_ref_regex() else {
        return Vec::new();
    };
    let mut names: Vec<&str> = Vec::new();
    for caps in regex.captures_iter(template) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2))
            && !names.contains(&name.as_str())
        {
            names.push(name.as_str());
        }
    }
    names
}

/// Returns true for names Ninja accepts as rule, pool and variable names.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Accumulates rules, pools and build steps and writes them as a Ninja file.
#[derive(Debug)]
pub struct Generator {
    options: GeneratorOptions,
    ctx: PathContext,
    env_ids: Arc<AtomicU32>,
    rules: Vec<(String, Rule)>,
    pools: Vec<(String, u32)>,
    steps: Vec<BuildStep>,
    outputs: BTreeMap<BuildPath, usize>,
    scripts: Vec<NodePath>,
    globs: GlobTracker,
    graph_path: BuildPath,
    globs_check: BuildPath,
    regen_command: String,
}

impl Generator {
    /// Creates a generator and evaluates the previous run's glob ledger.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] for unusable roots or file names,
    /// or [`GraphError::Io`] if no regeneration command is configured and
    /// the running executable cannot be determined.
    pub fn new(options: GeneratorOptions) -> GraphResult<Self> {
        let ctx = PathContext::new(&options.project_root, &options.build_root)?;
        let build_root = ctx.build_root();
        let graph_path = build_root.join(&options.graph_file)?;
        let ledger_path = build_root.join(&options.ledger_file)?;
        let globs_check = build_root.join(GLOBS_CHECK)?;

        let regen_command = match &options.regen_command {
            Some(command) => command.clone(),
            None => default_regen_command()?,
        };

        let globs = GlobTracker::load(&ctx, ctx.absolute(&ledger_path.into()));
        debug!(
            project_root = %ctx.project_root().display(),
            build_root = %build_root,
            staleness = %globs.staleness(),
            "created generator"
        );

        Ok(Self {
            options,
            ctx,
            env_ids: Arc::new(AtomicU32::new(1)),
            rules: Vec::new(),
            pools: Vec::new(),
            steps: Vec::new(),
            outputs: BTreeMap::new(),
            scripts: Vec::new(),
            globs,
            graph_path,
            globs_check,
            regen_command,
        })
    }

    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Path context rooted at the project root.
    #[must_use]
    pub const fn context(&self) -> &PathContext {
        &self.ctx
    }

    pub(crate) fn env_ids(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.env_ids)
    }

    pub(crate) fn next_env_id(&self) -> u32 {
        self.env_ids.fetch_add(1, Ordering::Relaxed)
    }

    /// Registers a rule.
    ///
    /// Registering an identical definition again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateRule`] if `name` is taken by a different
    /// definition or reserved, and [`GraphError::GraphIntegrity`] if `name` is
    /// not a valid rule name.
    pub fn add_rule(&mut self, name: &str, rule: Rule) -> GraphResult<()> {
        if !is_valid_name(name) {
            return Err(GraphError::integrity(format!("invalid rule name '{name}'")));
        }
        if name == "phony" || name == REGENERATE_RULE {
            return Err(GraphError::DuplicateRule {
                name: name.to_string(),
            });
        }

        if let Some((_, existing)) = self.rules.iter().find(|(n, _)| n == name) {
            if *existing == rule {
                return Ok(());
            }
            return Err(GraphError::DuplicateRule {
                name: name.to_string(),
            });
        }

        debug!(rule = name, command = rule.command(), "registered rule");
        self.rules.push((name.to_string(), rule));
        Ok(())
    }

    /// Declares a pool limiting the parallelism of the rules using it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::GraphIntegrity`] for invalid or reserved names,
    /// a zero depth, or a redeclaration with a different depth.
    pub fn add_pool(&mut self, name: &str, depth: u32) -> GraphResult<()> {
        if !is_valid_name(name) || name == "console" || name == REGENERATE_POOL {
            return Err(GraphError::integrity(format!(
                "invalid or reserved pool name '{name}'"
            )));
        }
        if depth == 0 {
            return Err(GraphError::integrity(format!(
                "pool '{name}' needs a depth of at least 1"
            )));
        }
        match self.pools.iter().find(|(n, _)| n == name) {
            Some((_, d)) if *d == depth => Ok(()),
            Some((_, d)) => Err(GraphError::integrity(format!(
                "pool '{name}' is already declared with depth {d}"
            ))),
            None => {
                debug!(pool = name, depth, "declared pool");
                self.pools.push((name.to_string(), depth));
                Ok(())
            }
        }
    }

    /// Adds a configuration script; changes to it re-run the configuration.
    ///
    /// Relative paths are taken relative to the project root.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] for paths outside the project root.
    pub fn add_script(&mut self, path: impl Into<PathArg>) -> GraphResult<()> {
        let path = self.ctx.resolve(path.into())?;
        if !self.scripts.contains(&path) {
            debug!(script = %path, "added configuration script");
            self.scripts.push(path);
        }
        Ok(())
    }

    /// Adds a build step, rejecting outputs that another step produces.
    pub(crate) fn add_step(&mut self, mut step: BuildStep) -> GraphResult<()> {
        let mut seen = BTreeSet::new();
        for output in &step.outputs {
            if !seen.insert(output) {
                return Err(GraphError::DuplicateOutput {
                    output: output.to_string(),
                    first: step.origin.to_string(),
                    second: step.origin.to_string(),
                });
            }
            if *output == self.graph_path || *output == self.globs_check {
                return Err(GraphError::DuplicateOutput {
                    output: output.to_string(),
                    first: "the self-regeneration step".to_string(),
                    second: step.origin.to_string(),
                });
            }
            if let Some(&index) = self.outputs.get(output) {
                return Err(GraphError::DuplicateOutput {
                    output: output.to_string(),
                    first: self.steps[index].origin.to_string(),
                    second: step.origin.to_string(),
                });
            }
        }

        step.finish();
        let index = self.steps.len();
        for output in &step.outputs {
            self.outputs.insert(output.clone(), index);
        }
        debug!(
            rule = %step.rule,
            outputs = ?step.outputs.iter().map(BuildPath::as_str).collect::<Vec<_>>(),
            "added build step"
        );
        self.steps.push(step);
        Ok(())
    }

    /// Applies a glob pattern relative to `ctx`'s current directory.
    pub(crate) fn glob(&mut self, ctx: &PathContext, pattern: &str) -> GraphResult<Vec<SourcePath>> {
        self.globs.glob(ctx, pattern)
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// Rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Pools in declaration order.
    pub fn pools(&self) -> impl Iterator<Item = (&str, u32)> {
        self.pools.iter().map(|(n, d)| (n.as_str(), *d))
    }

    /// Build steps in registration order.
    #[must_use]
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Returns the step producing `output`, if any.
    #[must_use]
    pub fn producer(&self, output: &BuildPath) -> Option<&BuildStep> {
        self.outputs.get(output).map(|&index| &self.steps[index])
    }

    #[must_use]
    pub fn scripts(&self) -> &[NodePath] {
        &self.scripts
    }

    /// Staleness of the previous run's glob ledger.
    #[must_use]
    pub const fn staleness(&self) -> &Staleness {
        self.globs.staleness()
    }

    /// Whether a glob of this run matched differently than in the previous run.
    #[must_use]
    pub const fn globs_changed(&self) -> bool {
        self.globs.changed()
    }

    #[must_use]
    pub const fn globs(&self) -> &GlobTracker {
        &self.globs
    }

    /// Location of the graph file, below the build root.
    #[must_use]
    pub const fn graph_path(&self) -> &BuildPath {
        &self.graph_path
    }

    #[must_use]
    pub const fn globs_check_path(&self) -> &BuildPath {
        &self.globs_check
    }

    #[must_use]
    pub fn regen_command(&self) -> &str {
        &self.regen_command
    }

    /// Checks the graph for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::GraphIntegrity`] describing the first problem.
    pub fn validate(&self) -> GraphResult<()> {
        let mut produced: BTreeMap<&BuildPath, usize> = BTreeMap::new();
        produced.insert(&self.graph_path, usize::MAX);
        produced.insert(&self.globs_check, usize::MAX);

        for (index, step) in self.steps.iter().enumerate() {
            if step.rule != "phony" && self.rule(&step.rule).is_none() {
                return Err(GraphError::integrity(format!(
                    "build step added at {} uses unknown rule '{}'",
                    step.origin, step.rule
                )));
            }
            if step.outputs.is_empty() {
                return Err(GraphError::integrity(format!(
                    "build step added at {} has no outputs",
                    step.origin
                )));
            }
            for output in &step.outputs {
                if produced.insert(output, index).is_some() {
                    return Err(GraphError::integrity(format!(
                        "output '{output}' is produced more than once"
                    )));
                }
            }
            for (name, value) in &step.variables {
                if !is_valid_name(name) {
                    return Err(GraphError::integrity(format!(
                        "invalid variable name '{name}' in build step added at {}",
                        step.origin
                    )));
                }
                if value.contains(['\n', '\r']) {
                    return Err(GraphError::integrity(format!(
                        "variable '{name}' in build step added at {} contains a line break",
                        step.origin
                    )));
                }
            }
        }

        for (name, rule) in &self.rules {
            if let Some(pool) = rule.pool()
                && pool != "console"
                && !self.pools.iter().any(|(p, _)| p == pool)
            {
                return Err(GraphError::integrity(format!(
                    "rule '{name}' uses undeclared pool '{pool}'"
                )));
            }
            if rule.templates().any(|t| t.contains(['\n', '\r'])) {
                return Err(GraphError::integrity(format!(
                    "rule '{name}' contains a line break"
                )));
            }
        }

        Ok(())
    }

    /// Validates and renders the graph file contents.
    ///
    /// # Errors
    ///
    /// See [`Generator::validate`].
    pub fn render(&self) -> GraphResult<String> {
        self.validate()?;
        Ok(writer::render(self, &self.graph_path.clone().into()))
    }

    /// Validates and renders the graph for a file at `target`.
    fn render_for(&self, target: &NodePath) -> GraphResult<String> {
        self.validate()?;
        match target {
            NodePath::Source(src) if src.is_root() => {
                return Err(GraphError::invalid_path(
                    ".",
                    "the project root cannot be the graph file",
                ));
            }
            NodePath::Build(build) if *build == self.globs_check => {
                return Err(GraphError::integrity(format!(
                    "graph file '{build}' collides with the glob check target"
                )));
            }
            NodePath::Build(build) => {
                if let Some(step) = self.producer(build) {
                    return Err(GraphError::integrity(format!(
                        "graph file '{build}' is produced by the build step added at {}",
                        step.origin
                    )));
                }
            }
            NodePath::Source(_) => {}
        }
        Ok(writer::render(self, target))
    }

    /// Writes the graph file to its default location below the build root.
    ///
    /// # Errors
    ///
    /// See [`Generator::write_to_file`].
    pub fn write(&self) -> GraphResult<PathBuf> {
        let path = self.ctx.absolute(&self.graph_path.clone().into());
        self.write_to_file(&path)?;
        Ok(path)
    }

    /// Validates the graph and writes it to `path`, followed by the glob
    /// ledger.
    ///
    /// `path` must lie inside the project root; relative paths are taken
    /// relative to it. The self-regeneration step names `path` as its
    /// output. Nothing is written if validation fails. The graph file is
    /// written atomically, and the ledger only after it succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if `path` is outside the project
    /// root, [`GraphError::GraphIntegrity`] if validation fails, or
    /// [`GraphError::Io`] if a file cannot be written.
    pub fn write_to_file(&self, path: &Path) -> GraphResult<()> {
        let target = self.ctx.relativize(path)?;
        let text = self.render_for(&target)?;
        let path = self.ctx.absolute(&target);

        let build_dir = self.ctx.absolute(&self.ctx.build_root().into());
        std::fs::create_dir_all(&build_dir).map_err(|e| GraphError::io(&build_dir, e))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
        }
        write_atomic(&path, text.as_bytes()).map_err(|e| GraphError::io(&path, e))?;

        info!(
            path = %path.display(),
            rules = self.rules.len(),
            steps = self.steps.len(),
            "wrote build graph"
        );

        let ledger_path = self.globs.ledger_path();
        let ledger = self
            .globs
            .ledger()
            .to_json()
            .map_err(|e| GraphError::io(ledger_path, std::io::Error::other(e)))?;
        if write_if_changed(ledger_path, ledger.as_bytes())
            .map_err(|e| GraphError::io(ledger_path, e))?
        {
            debug!(path = %ledger_path.display(), "updated glob ledger");
        }
        Ok(())
    }

    /// Writes a compilation database for the configured compile rules.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Io`] if the file cannot be written.
    pub fn write_compile_commands(&self, path: &Path) -> GraphResult<usize> {
        let entries = writer::compile_commands(self);
        let mut text = serde_json::to_string_pretty(&entries)
            .map_err(|e| GraphError::io(path, std::io::Error::other(e)))?;
        text.push('\n');
        write_if_changed(path, text.as_bytes()).map_err(|e| GraphError::io(path, e))?;
        info!(path = %path.display(), entries = entries.len(), "wrote compilation database");
        Ok(entries.len())
    }
}

/// Regeneration command running the current executable again.
fn default_regen_command() -> GraphResult<String> {
    let exe = std::env::current_exe()
        .map_err(|e| GraphError::io(Path::new("<current executable>"), e))?;
    let exe = exe.display().to_string().replace('$', "$$");
    if exe.contains(' ') {
        Ok(format!("\"{exe}\""))
    } else {
        Ok(exe)
    }
}

#[cfg(test)]
mod tests;
