// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ninja file rendering and the compilation database.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{
    ALWAYS_TARGET, DefaultsMode, Generator, REGENERATE_POOL, REGENERATE_RULE, referenced_vars,
    var_ref_regex,
};
use crate::graph::rule::{Rule, RuleFlags};
use crate::graph::step::BuildStep;
use crate::path::{BuildPath, NodePath};

/// Minimum Ninja version for the emitted syntax.
pub const NINJA_REQUIRED_VERSION: &str = "1.10";

const HEADER: &str = "# This file has been generated by ninjapie. Do not edit.\n";

/// Escapes a variable value: `$`, `:` and a leading space.
#[must_use]
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '$' => out.push_str("$$"),
            ':' => out.push_str("$:"),
            ' ' if i == 0 => out.push_str("$ "),
            c => out.push(c),
        }
    }
    out
}

/// Picks the most used value of every variable; the first value reaching
/// the highest count wins ties.
pub(crate) fn hoisted_defaults(steps: &[BuildStep]) -> BTreeMap<String, String> {
    let mut counts: BTreeMap<&str, Vec<(&str, usize)>> = BTreeMap::new();
    for step in steps {
        for (name, value) in &step.variables {
            let values = counts.entry(name.as_str()).or_default();
            match values.iter_mut().find(|(v, _)| *v == value.as_str()) {
                Some((_, count)) => *count += 1,
                None => values.push((value.as_str(), 1)),
            }
        }
    }

    counts
        .into_iter()
        .filter_map(|(name, values)| {
            let mut best: Option<(&str, usize)> = None;
            for (value, count) in values {
                if best.is_none_or(|(_, max)| count > max) {
                    best = Some((value, count));
                }
            }
            best.map(|(value, _)| (name.to_string(), value.to_string()))
        })
        .collect()
}

/// Library outputs of this graph that a link step depends on.
///
/// For every wanted library the search directories are tried in order,
/// preferring `lib<name>.so` over `lib<name>.a`.
pub(crate) fn resolved_libs(generator: &Generator, step: &BuildStep) -> Vec<NodePath> {
    let Some(lookup) = step.libs() else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for name in lookup.names() {
        let candidates = [format!("lib{name}.so"), format!("lib{name}.a")];
        'search: for dir in lookup.search() {
            let NodePath::Build(dir) = dir else {
                continue;
            };
            for file in &candidates {
                if let Ok(path) = dir.join(file)
                    && generator.producer(&path).is_some()
                {
                    let node = NodePath::Build(path);
                    if !found.contains(&node) {
                        found.push(node);
                    }
                    break 'search;
                }
            }
        }
    }
    found
}

fn write_rule(out: &mut String, name: &str, rule: &Rule) {
    let _ = writeln!(out, "rule {name}");
    let _ = writeln!(out, "  command = {}", rule.command());
    if let Some(description) = rule.description() {
        let _ = writeln!(out, "  description = {description}");
    }
    if let Some(deps) = rule.deps() {
        let _ = writeln!(out, "  deps = {deps}");
    }
    if let Some(depfile) = rule.depfile() {
        let _ = writeln!(out, "  depfile = {depfile}");
    }
    if let Some(pool) = rule.pool() {
        let _ = writeln!(out, "  pool = {pool}");
    }
    if let Some(rspfile) = rule.rspfile() {
        let _ = writeln!(out, "  rspfile = {rspfile}");
    }
    if let Some(content) = rule.rspfile_content() {
        let _ = writeln!(out, "  rspfile_content = {content}");
    }
    if rule.flags().contains(RuleFlags::GENERATOR) {
        out.push_str("  generator = 1\n");
    }
    if rule.flags().contains(RuleFlags::RESTAT) {
        out.push_str("  restat = 1\n");
    }
    out.push('\n');
}

fn join_nodes<'a>(nodes: impl Iterator<Item = &'a NodePath>) -> String {
    nodes.map(NodePath::render).collect::<Vec<_>>().join(" ")
}

fn write_step(
    out: &mut String,
    generator: &Generator,
    step: &BuildStep,
    defaults: &BTreeMap<String, String>,
) {
    let outputs = step
        .outputs()
        .iter()
        .map(BuildPath::render)
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(out, "build {outputs}: {}", step.rule());

    if !step.inputs().is_empty() {
        let _ = write!(out, " {}", join_nodes(step.inputs().iter()));
    }

    let mut implicit: Vec<String> = step.implicit().iter().map(NodePath::render).collect();
    for lib in resolved_libs(generator, step) {
        if !step.implicit().contains(&lib) {
            implicit.push(lib.render());
        }
    }
    if step.is_always() {
        implicit.push(ALWAYS_TARGET.to_string());
    }
    if !implicit.is_empty() {
        let _ = write!(out, " | {}", implicit.join(" "));
    }

    if !step.order_only().is_empty() {
        let _ = write!(out, " || {}", join_nodes(step.order_only().iter()));
    }
    out.push('\n');

    for (name, value) in step.variables() {
        if defaults.get(name) != Some(value) {
            let _ = writeln!(out, "  {name} = {}", escape_value(value));
        }
    }

    // a hoisted value must not reach a step that never bound the variable
    if defaults.is_empty() {
        return;
    }
    let Some(rule) = generator.rule(step.rule()) else {
        return;
    };
    let mut cleared: Vec<&str> = rule
        .templates()
        .flat_map(referenced_vars)
        .filter(|name| defaults.contains_key(*name) && !step.variables().contains_key(*name))
        .collect();
    cleared.sort_unstable();
    cleared.dedup();
    for name in cleared {
        let _ = writeln!(out, "  {name} =");
    }
}

/// Renders the complete graph file, regenerating `graph`. The generator must
/// be validated.
pub(crate) fn render(generator: &Generator, graph: &NodePath) -> String {
    let mut out = String::with_capacity(4096);
    let build_root = generator.context().build_root();

    out.push_str(HEADER);
    out.push('\n');
    let _ = writeln!(out, "ninja_required_version = {NINJA_REQUIRED_VERSION}");
    let _ = writeln!(out, "builddir = {}", build_root.render());
    out.push('\n');

    let defaults = match generator.options().defaults() {
        DefaultsMode::Auto => hoisted_defaults(generator.steps()),
        DefaultsMode::Explicit => BTreeMap::new(),
    };
    if !defaults.is_empty() {
        for (name, value) in &defaults {
            let _ = writeln!(out, "{name} = {}", escape_value(value));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "pool {REGENERATE_POOL}\n  depth = 1\n");
    for (name, depth) in generator.pools() {
        let _ = writeln!(out, "pool {name}\n  depth = {depth}\n");
    }

    for (name, rule) in generator.rules() {
        write_rule(&mut out, name, rule);
    }
    let regenerate = Rule::builder()
        .command(generator.regen_command())
        .with_description(format!("Regenerating {}", graph.file_name()))
        .with_pool(REGENERATE_POOL)
        .with_flags(RuleFlags::GENERATOR)
        .build();
    write_rule(&mut out, REGENERATE_RULE, &regenerate);

    for step in generator.steps() {
        write_step(&mut out, generator, step, &defaults);
    }
    if !generator.steps().is_empty() {
        out.push('\n');
    }

    if generator.steps().iter().any(BuildStep::is_always) {
        let _ = writeln!(out, "build {ALWAYS_TARGET}: phony\n");
    }

    let dirs: Vec<NodePath> = generator
        .globs()
        .scanned_dirs()
        .into_iter()
        .map(NodePath::Source)
        .collect();
    if !generator.globs().is_empty() {
        let _ = write!(out, "build {}: phony", generator.globs_check_path().render());
        if !dirs.is_empty() {
            let _ = write!(out, " {}", join_nodes(dirs.iter()));
        }
        out.push_str("\n\n");
    }

    let mut regen_inputs: Vec<String> = generator.scripts().iter().map(NodePath::render).collect();
    regen_inputs.extend(dirs.iter().map(NodePath::render));
    if !generator.globs().is_empty() {
        regen_inputs.push(generator.globs_check_path().render());
    }
    let _ = write!(out, "build {}: {REGENERATE_RULE}", graph.render());
    if !regen_inputs.is_empty() {
        let _ = write!(out, " | {}", regen_inputs.join(" "));
    }
    out.push('\n');

    out
}

/// One entry of `compile_commands.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    pub output: String,
    pub command: String,
}

/// Expands `$in`, `$out` and the step's bindings in a rule template.
///
/// Unknown variables expand to the empty string, as in Ninja.
pub(crate) fn expand_template(template: &str, bindings: &BTreeMap<&str, String>) -> String {
    let Some(regex) = var_ref_regex() else {
        return template.to_string();
    };
    let expanded = regex.replace_all(template, |caps: &regex::Captures<'_>| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map_or_else(|| "$".to_string(), |name| {
                bindings.get(name.as_str()).cloned().unwrap_or_default()
            })
    });
    // collapse the gaps left by empty expansions
    expanded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds compilation database entries for every step of a compile rule.
pub(crate) fn compile_commands(generator: &Generator) -> Vec<CompileCommand> {
    let directory = generator.context().project_root().display().to_string();
    let compile_rules = generator.options().compile_rules();

    let mut entries = Vec::new();
    for step in generator.steps() {
        if !compile_rules.iter().any(|r| r == step.rule()) {
            continue;
        }
        let Some(rule) = generator.rule(step.rule()) else {
            continue;
        };
        let Some(file) = step.inputs().first() else {
            continue;
        };
        let Some(output) = step.outputs().first() else {
            continue;
        };

        let mut bindings: BTreeMap<&str, String> = step
            .variables()
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        bindings.insert(
            "in",
            step.inputs()
                .iter()
                .map(NodePath::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        );
        bindings.insert(
            "out",
            step.outputs()
                .iter()
                .map(BuildPath::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        );

        entries.push(CompileCommand {
            directory: directory.clone(),
            file: file.as_str().to_string(),
            output: output.as_str().to_string(),
            command: expand_template(rule.command(), &bindings),
        });
    }
    entries
}
