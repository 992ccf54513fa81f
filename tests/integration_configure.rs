// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration runs.
//!
//! Builds graphs through `Env` and `Generator` the way a configuration
//! program does and checks the written graph file.

use ninjapie::cmd::configure::generate;
use ninjapie::config::Config;
use ninjapie::env::{BuildRequest, Env};
use ninjapie::error::GraphError;
use ninjapie::graph::rule::Rule;
use ninjapie::graph::{Generator, GeneratorOptions};
use std::path::Path;
use tempfile::TempDir;

fn generator(root: &Path) -> Generator {
    Generator::new(
        GeneratorOptions::builder()
            .project_root(root)
            .with_regen_command("./configure")
            .build(),
    )
    .unwrap()
}

fn project() -> (TempDir, Generator, Env) {
    let tmp = tempfile::tempdir().unwrap();
    let generator = generator(tmp.path());
    let env = Env::new(&generator);
    (tmp, generator, env)
}

fn build_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| l.starts_with("build ")).collect()
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn configure_hello_end_to_end() {
    let (tmp, mut generator, mut env) = project();
    env.set("CFLAGS", ["-Wall"]);
    env.add_rule(&mut generator, "cc", Rule::new("gcc $CFLAGS -c $in -o $out", "CC $out"))
        .unwrap();
    env.add_rule(&mut generator, "link", Rule::new("gcc -o $out $in", "LINK $out"))
        .unwrap();

    let objs = env
        .build(
            &mut generator,
            BuildRequest::new("cc").output("hello.o").input("hello.c"),
        )
        .unwrap();
    env.build(
        &mut generator,
        BuildRequest::new("link").output("hello").inputs(objs),
    )
    .unwrap();

    let path = generator.write().unwrap();
    assert_eq!(path, tmp.path().join("build/build.ninja"));
    let text = std::fs::read_to_string(path).unwrap();

    insta::assert_debug_snapshot!(build_lines(&text), @r#"
    [
        "build build/hello.o: cc hello.c",
        "build build/hello: link build/hello.o",
        "build build/build.ninja: regenerate",
    ]
    "#);
    assert!(text.contains("build build/hello.o: cc hello.c\n  CFLAGS = -Wall\n"));
}

#[test]
fn configure_distinct_outputs_listed_exactly() {
    let (_tmp, mut generator, env) = project();
    env.add_rule(&mut generator, "copy", Rule::new("cp $in $out", "COPY $out"))
        .unwrap();
    for (out, input) in [("a.txt", "a.in"), ("sub/b.txt", "sub/b.in"), ("c.txt", "x y.in")] {
        env.build(
            &mut generator,
            BuildRequest::new("copy").output(out).input(input),
        )
        .unwrap();
    }

    let text = generator.render().unwrap();
    insta::assert_debug_snapshot!(build_lines(&text), @r#"
    [
        "build build/a.txt: copy a.in",
        "build build/sub/b.txt: copy sub/b.in",
        "build build/c.txt: copy x$ y.in",
        "build build/build.ninja: regenerate",
    ]
    "#);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn configure_duplicate_output_leaves_graph_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.paths.root = Some(tmp.path().to_path_buf());
    config.generator.command = Some("./configure".to_string());
    config.resolve_and_validate().unwrap();

    let path = generate(&config, |generator, env| {
        env.cc(generator, "a.o", ["a.c"])?;
        Ok(())
    })
    .unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let err = generate(&config, |generator, env| {
        env.cc(generator, "a.o", ["a.c"])?;
        env.cc(generator, "b.o", ["b.c"])?;
        env.cxx(generator, "a.o", ["a.cpp"])?;
        Ok(())
    })
    .unwrap_err();

    let Some(GraphError::DuplicateOutput { output, .. }) = err.downcast_ref::<GraphError>() else {
        panic!("expected DuplicateOutput, got {err:#}");
    };
    assert_eq!(output, "build/a.o");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn configure_outside_path_rejected() {
    let (_tmp, mut generator, env) = project();
    env.add_rule(&mut generator, "copy", Rule::new("cp $in $out", "COPY $out"))
        .unwrap();

    let err = env
        .build(
            &mut generator,
            BuildRequest::new("copy").output("out.txt").input("../outside"),
        )
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidPath { ref path, .. } if path == "../outside"));

    let err = env
        .build(
            &mut generator,
            BuildRequest::new("copy").output("../outside").input("in.txt"),
        )
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidPath { .. }));

    assert!(generator.steps().is_empty());
    assert!(!generator.render().unwrap().contains("outside"));
}

// =============================================================================
// Environments and rules
// =============================================================================

#[test]
fn configure_clone_isolation_visible_in_graph() {
    let (_tmp, mut generator, mut env) = project();
    env.add_rule(&mut generator, "cc", Rule::new("gcc $CFLAGS -c $in -o $out", "CC $out"))
        .unwrap();
    env.set("CFLAGS", ["-O2"]);

    let mut debug = env.clone();
    debug.set("CFLAGS", ["-O0", "-g"]);
    env.append("CFLAGS", ["-DNDEBUG"]);
    let later = env.clone();

    env.build(&mut generator, BuildRequest::new("cc").output("a.o").input("a.c"))
        .unwrap();
    debug
        .build(&mut generator, BuildRequest::new("cc").output("a-debug.o").input("a.c"))
        .unwrap();

    let text = generator.render().unwrap();
    assert!(text.contains("build build/a.o: cc a.c\n  CFLAGS = -O2 -DNDEBUG\n"));
    assert!(text.contains("build build/a-debug.o: cc a.c\n  CFLAGS = -O0 -g\n"));
    assert_eq!(later.get_str("CFLAGS").as_deref(), Some("-O2 -DNDEBUG"));
    assert_ne!(env.id(), debug.id());
}

#[test]
fn configure_rule_idempotence_and_conflict() {
    let (_tmp, mut generator, env) = project();
    let rule = Rule::new("gcc -c $in -o $out", "CC $out");
    env.add_rule(&mut generator, "cc", rule.clone()).unwrap();
    env.add_rule(&mut generator, "cc", rule).unwrap();

    let text = generator.render().unwrap();
    assert_eq!(text.matches("rule cc\n").count(), 1);

    let err = env
        .add_rule(&mut generator, "cc", Rule::new("clang -c $in -o $out", "CC $out"))
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"rule 'cc' is already registered with a different definition"
    );
}

#[test]
fn configure_scripts_and_sub_builds_feed_regeneration() {
    let (tmp, mut generator, mut env) = project();
    std::fs::create_dir_all(tmp.path().join("lib")).unwrap();
    std::fs::write(tmp.path().join("lib/configure.rs"), "").unwrap();
    std::fs::write(tmp.path().join("lib/util.c"), "").unwrap();
    generator.add_script("configure.rs").unwrap();

    let lib = env
        .sub_build(&mut generator, "lib", |generator, env| {
            let sources = env.glob(generator, "*.c")?;
            env.static_lib(generator, "util", sources)
        })
        .unwrap();
    assert_eq!(lib.as_str(), "build/lib/libutil.a");
    assert!(env.cur_dir().is_root());

    let text = generator.render().unwrap();
    assert!(text.contains("build build/.globs-check: phony lib\n"));
    assert!(text.ends_with(
        "build build/build.ninja: regenerate | configure.rs lib/configure.rs lib build/.globs-check\n"
    ));
}
