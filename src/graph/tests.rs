// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::rule::{DepsStyle, Rule, RuleFlags};
use super::step::BuildStep;
use super::writer::{escape_value, expand_template, hoisted_defaults};
use super::{DefaultsMode, Generator, GeneratorOptions, referenced_vars};
use crate::error::GraphError;
use crate::glob::Staleness;
use std::collections::BTreeMap;
use std::panic::Location;
use std::path::Path;
use tempfile::TempDir;

fn generator(root: &Path, defaults: DefaultsMode) -> Generator {
    Generator::new(
        GeneratorOptions::builder()
            .project_root(root)
            .with_regen_command("ninjapie")
            .with_defaults(defaults)
            .build(),
    )
    .unwrap()
}

fn setup() -> (TempDir, Generator) {
    let tmp = tempfile::tempdir().unwrap();
    let g = generator(tmp.path(), DefaultsMode::Explicit);
    (tmp, g)
}

#[track_caller]
fn step(g: &Generator, rule: &str, outputs: &[&str], inputs: &[&str]) -> BuildStep {
    let ctx = g.context();
    let mut step = BuildStep::new(rule, Location::caller());
    step.outputs = outputs
        .iter()
        .map(|o| ctx.output((*o).into()).unwrap())
        .collect();
    step.inputs = inputs.iter().map(|i| ctx.classify(i).unwrap()).collect();
    step
}

fn cc_rule() -> Rule {
    Rule::builder()
        .command("gcc $cflags -c $in -o $out")
        .with_description("CC $out")
        .with_deps(DepsStyle::Gcc)
        .with_depfile("$out.d")
        .build()
}

#[test]
fn test_referenced_vars() {
    assert_eq!(
        referenced_vars("gcc $cflags ${defines} -c $in -o $out $$HOME $cflags"),
        ["cflags", "defines", "in", "out"]
    );
}

#[test]
fn test_add_rule_idempotent() {
    let (_tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    g.add_rule("cc", cc_rule()).unwrap();
    assert_eq!(g.rules().count(), 1);

    let err = g.add_rule("cc", Rule::new("clang -c $in -o $out", "CC $out"));
    assert!(matches!(err, Err(GraphError::DuplicateRule { name }) if name == "cc"));
}

#[test]
fn test_add_rule_reserved_and_invalid_names() {
    let (_tmp, mut g) = setup();
    for name in ["phony", "regenerate"] {
        assert!(matches!(
            g.add_rule(name, cc_rule()),
            Err(GraphError::DuplicateRule { .. })
        ));
    }
    assert!(matches!(
        g.add_rule("bad name", cc_rule()),
        Err(GraphError::GraphIntegrity(_))
    ));
}

#[test]
fn test_pools() {
    let (_tmp, mut g) = setup();
    g.add_pool("link", 2).unwrap();
    g.add_pool("link", 2).unwrap();
    assert!(g.add_pool("link", 3).is_err());
    assert!(g.add_pool("console", 1).is_err());
    assert!(g.add_pool("regen_pool", 1).is_err());
    assert!(g.add_pool("zero", 0).is_err());
    assert_eq!(g.pools().collect::<Vec<_>>(), [("link", 2)]);
}

#[test]
fn test_undeclared_pool_fails_validation() {
    let (_tmp, mut g) = setup();
    let rule = Rule::builder().command("ld $in").with_pool("link").build();
    g.add_rule("ld", rule).unwrap();
    insta::assert_snapshot!(
        g.validate().unwrap_err().to_string(),
        @"graph integrity violation: rule 'ld' uses undeclared pool 'link'"
    );

    g.add_pool("link", 1).unwrap();
    g.validate().unwrap();
}

#[test]
fn test_duplicate_output_names_both_sites() {
    let (_tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    let first = step(&g, "cc", &["a.o"], &["a.c"]);
    let second = step(&g, "cc", &["a.o"], &["b.c"]);
    let first_line = first.origin().line();
    let second_line = second.origin().line();
    g.add_step(first).unwrap();

    match g.add_step(second) {
        Err(GraphError::DuplicateOutput {
            output,
            first,
            second,
        }) => {
            assert_eq!(output, "build/a.o");
            assert!(first.contains(&format!(":{first_line}:")));
            assert!(second.contains(&format!(":{second_line}:")));
            assert_ne!(first, second);
        }
        other => panic!("expected DuplicateOutput, got {other:?}"),
    }
    assert_eq!(g.steps().len(), 1);
}

#[test]
fn test_reserved_outputs_rejected() {
    let (_tmp, mut g) = setup();
    let s = step(&g, "phony", &["build/build.ninja"], &["a.c"]);
    assert!(matches!(
        g.add_step(s),
        Err(GraphError::DuplicateOutput { first, .. }) if first == "the self-regeneration step"
    ));

    let s = step(&g, "phony", &["x", "x"], &["a.c"]);
    let err = g.add_step(s).unwrap_err().to_string();
    assert!(err.starts_with("output 'build/x' is listed twice in the build step added at "), "{err}");
}

#[test]
fn test_unknown_rule_fails_validation() {
    let (_tmp, mut g) = setup();
    g.add_step(step(&g, "nope", &["a.o"], &["a.c"])).unwrap();
    let err = g.validate().unwrap_err().to_string();
    assert!(err.contains("uses unknown rule 'nope'"), "{err}");
}

#[test]
fn test_line_break_in_binding_fails_validation() {
    let (_tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    let mut s = step(&g, "cc", &["a.o"], &["a.c"]);
    s.variables.insert("cflags".into(), "-O2\n-g".into());
    g.add_step(s).unwrap();
    assert!(g.validate().is_err());
}

#[test]
fn test_escape_value() {
    assert_eq!(escape_value("-DX=$Y"), "-DX=$$Y");
    assert_eq!(escape_value("c:/path with space"), "c$:/path with space");
    assert_eq!(escape_value(" leading"), "$ leading");
}

#[test]
fn test_render_layout() {
    let (_tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    let mut s = step(&g, "cc", &["a.o"], &["a.c"]);
    s.variables.insert("cflags".into(), "-O2".into());
    g.add_step(s).unwrap();

    let expected = concat!(
        "# This file has been generated by ninjapie. Do not edit.\n",
        "\n",
        "ninja_required_version = 1.10\n",
        "builddir = build\n",
        "\n",
        "pool regen_pool\n",
        "  depth = 1\n",
        "\n",
        "rule cc\n",
        "  command = gcc $cflags -c $in -o $out\n",
        "  description = CC $out\n",
        "  deps = gcc\n",
        "  depfile = $out.d\n",
        "\n",
        "rule regenerate\n",
        "  command = ninjapie\n",
        "  description = Regenerating build.ninja\n",
        "  pool = regen_pool\n",
        "  generator = 1\n",
        "\n",
        "build build/a.o: cc a.c\n",
        "  cflags = -O2\n",
        "\n",
        "build build/build.ninja: regenerate\n",
    );
    assert_eq!(g.render().unwrap(), expected);
}

#[test]
fn test_render_always_and_restat() {
    let (_tmp, mut g) = setup();
    let rule = Rule::builder()
        .command("date > $out")
        .with_flags(RuleFlags::RESTAT)
        .build();
    g.add_rule("stamp", rule).unwrap();
    g.add_step(step(&g, "stamp", &["stamp.txt"], &[])).unwrap();
    g.add_step(step(&g, "phony", &["all"], &[])).unwrap();

    let text = g.render().unwrap();
    assert!(text.contains("  restat = 1\n"));
    assert!(text.contains("build build/stamp.txt: stamp | always\n"));
    assert!(text.contains("build build/all: phony\n"));
    assert!(text.contains("build always: phony\n"));
}

#[test]
fn test_render_hoisted_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let mut g = generator(tmp.path(), DefaultsMode::Auto);
    g.add_rule("cc", cc_rule()).unwrap();
    for (out, input, flags) in [("a.o", "a.c", "-O2"), ("b.o", "b.c", "-O0"), ("c.o", "c.c", "-O2")] {
        let mut s = step(&g, "cc", &[out], &[input]);
        s.variables.insert("cflags".into(), flags.into());
        g.add_step(s).unwrap();
    }

    let defaults = hoisted_defaults(g.steps());
    assert_eq!(defaults.get("cflags").map(String::as_str), Some("-O2"));

    let text = g.render().unwrap();
    assert!(text.contains("\ncflags = -O2\n"));
    assert!(text.contains("build build/a.o: cc a.c\nbuild build/b.o"));
    assert!(text.contains("build build/b.o: cc b.c\n  cflags = -O0\n"));
}

#[test]
fn test_hoisted_value_cleared_for_unbound_step() {
    let tmp = tempfile::tempdir().unwrap();
    let mut g = generator(tmp.path(), DefaultsMode::Auto);
    g.add_rule("cc", cc_rule()).unwrap();
    for (out, input) in [("a.o", "a.c"), ("b.o", "b.c")] {
        let mut s = step(&g, "cc", &[out], &[input]);
        s.variables.insert("cflags".into(), "-x".into());
        g.add_step(s).unwrap();
    }
    g.add_step(step(&g, "cc", &["c.o"], &["c.c"])).unwrap();

    let text = g.render().unwrap();
    assert!(text.contains("\ncflags = -x\n"));
    assert!(text.contains("build build/b.o: cc b.c\nbuild build/c.o"));
    assert!(text.contains("build build/c.o: cc c.c\n  cflags =\n"));
}

#[test]
fn test_hoisted_defaults_tie_keeps_first() {
    let (_tmp, g) = setup();
    let mut a = step(&g, "phony", &["a"], &["a.c"]);
    a.variables.insert("x".into(), "one".into());
    let mut b = step(&g, "phony", &["b"], &["b.c"]);
    b.variables.insert("x".into(), "two".into());
    let defaults = hoisted_defaults(&[a, b]);
    assert_eq!(defaults["x"], "one");
}

#[test]
fn test_expand_template() {
    let bindings: BTreeMap<&str, String> = [
        ("cflags", "-O2 -g".to_string()),
        ("in", "a.c".to_string()),
        ("out", "build/a.o".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        expand_template("gcc $cflags ${missing} -c $in -o $out $$HOME", &bindings),
        "gcc -O2 -g -c a.c -o build/a.o $HOME"
    );
}

#[test]
fn test_render_glob_regeneration_inputs() {
    let (tmp, mut g) = setup();
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/a.c"), "").unwrap();
    std::fs::write(tmp.path().join("configure.rs"), "").unwrap();

    g.add_script("configure.rs").unwrap();
    g.add_script("configure.rs").unwrap();
    let ctx = g.context().clone();
    let matches = g.glob(&ctx, "src/*.c").unwrap();
    assert_eq!(matches.len(), 1);

    let text = g.render().unwrap();
    assert!(text.contains("build build/.globs-check: phony src\n"));
    assert!(text.ends_with(
        "build build/build.ninja: regenerate | configure.rs src build/.globs-check\n"
    ));
}

#[test]
fn test_write_creates_graph_and_ledger() {
    let (tmp, mut g) = setup();
    std::fs::write(tmp.path().join("a.c"), "").unwrap();
    g.add_rule("cc", cc_rule()).unwrap();
    g.add_step(step(&g, "cc", &["a.o"], &["a.c"])).unwrap();
    let ctx = g.context().clone();
    g.glob(&ctx, "*.c").unwrap();

    let path = g.write().unwrap();
    assert_eq!(path, tmp.path().join("build/build.ninja"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, g.render().unwrap());
    assert!(tmp.path().join("build/.build.globs").is_file());
}

#[test]
fn test_failed_write_leaves_previous_graph() {
    let (tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    g.add_step(step(&g, "cc", &["a.o"], &["a.c"])).unwrap();
    let path = g.write().unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    g.add_step(step(&g, "missing", &["b.o"], &["b.c"])).unwrap();
    assert!(g.write().is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

    let other = tmp.path().join("other.ninja");
    assert!(g.write_to_file(&other).is_err());
    assert!(!other.exists());
}

#[test]
fn test_write_to_other_path_regenerates_itself() {
    let (tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    g.add_step(step(&g, "cc", &["a.o"], &["a.c"])).unwrap();

    let alt = tmp.path().join("alt.ninja");
    g.write_to_file(&alt).unwrap();
    let text = std::fs::read_to_string(&alt).unwrap();
    let regen: Vec<&str> = text
        .lines()
        .filter(|line| line.contains(": regenerate"))
        .collect();
    assert_eq!(regen, ["build alt.ninja: regenerate"]);
    assert!(text.contains("  description = Regenerating alt.ninja\n"));

    g.write_to_file(Path::new("out/graph.ninja")).unwrap();
    let text = std::fs::read_to_string(tmp.path().join("out/graph.ninja")).unwrap();
    assert!(text.ends_with("build out/graph.ninja: regenerate\n"));
}

#[test]
fn test_write_to_path_outside_root_fails() {
    let (tmp, g) = setup();
    let outside = tmp.path().parent().unwrap().join("outside.ninja");
    assert!(matches!(
        g.write_to_file(&outside),
        Err(GraphError::InvalidPath { .. })
    ));
    assert!(!outside.exists());
}

#[test]
fn test_write_over_step_output_fails() {
    let (tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    g.add_step(step(&g, "cc", &["a.o"], &["a.c"])).unwrap();
    assert!(matches!(
        g.write_to_file(&tmp.path().join("build/a.o")),
        Err(GraphError::GraphIntegrity(_))
    ));
}

#[test]
fn test_failed_graph_write_keeps_ledger_stale() {
    let (tmp, mut g) = setup();
    std::fs::write(tmp.path().join("a.c"), "").unwrap();
    std::fs::write(tmp.path().join("blocker"), "").unwrap();
    let ctx = g.context().clone();
    g.glob(&ctx, "*.c").unwrap();

    let err = g.write_to_file(&tmp.path().join("blocker/build.ninja"));
    assert!(matches!(err, Err(GraphError::Io { .. })));
    assert!(!tmp.path().join("build/.build.globs").exists());

    let next = generator(tmp.path(), DefaultsMode::Explicit);
    assert_eq!(next.staleness(), &Staleness::Missing);
}

#[test]
fn test_compile_commands() {
    let (tmp, mut g) = setup();
    g.add_rule("cc", cc_rule()).unwrap();
    g.add_rule("ar", Rule::new("ar rcs $out $in", "AR $out")).unwrap();
    let mut s = step(&g, "cc", &["a.o"], &["a.c"]);
    s.variables.insert("cflags".into(), "-O2 -Iinclude".into());
    g.add_step(s).unwrap();
    g.add_step(step(&g, "ar", &["liba.a"], &["build/a.o"])).unwrap();

    let path = tmp.path().join("compile_commands.json");
    assert_eq!(g.write_compile_commands(&path).unwrap(), 1);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &json[0];
    assert_eq!(entry["file"], "a.c");
    assert_eq!(entry["output"], "build/a.o");
    assert_eq!(entry["command"], "gcc -O2 -Iinclude -c a.c -o build/a.o");
    assert_eq!(
        entry["directory"],
        tmp.path().display().to_string().as_str()
    );
}
