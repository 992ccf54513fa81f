// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for glob tracking across configuration runs.

use ninjapie::cmd::configure::generate;
use ninjapie::config::Config;
use ninjapie::glob::Staleness;
use ninjapie::graph::Generator;
use std::path::Path;
use tempfile::TempDir;

fn project(files: &[&str]) -> (TempDir, Config) {
    let tmp = tempfile::tempdir().unwrap();
    for file in files {
        let path = tmp.path().join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "int x;\n").unwrap();
    }
    let mut config = Config::default();
    config.paths.root = Some(tmp.path().to_path_buf());
    config.generator.command = Some("./configure".to_string());
    config.resolve_and_validate().unwrap();
    (tmp, config)
}

fn configure(config: &Config) -> Vec<String> {
    let mut found = Vec::new();
    generate(config, |generator, env| {
        for source in env.glob(generator, "*.c")? {
            env.objs(generator, [&source])?;
            found.push(source.as_str().to_string());
        }
        Ok(())
    })
    .unwrap();
    found
}

fn staleness(config: &Config) -> Staleness {
    let generator = Generator::new(config.generator_options().unwrap()).unwrap();
    generator.staleness().clone()
}

fn graph(root: &Path) -> String {
    std::fs::read_to_string(root.join("build/build.ninja")).unwrap()
}

#[test]
fn glob_round_trip() {
    let (tmp, config) = project(&["b.c", "a.c", "notes.md"]);
    assert_eq!(staleness(&config), Staleness::Missing);

    assert_eq!(configure(&config), ["a.c", "b.c"]);
    let first = graph(tmp.path());
    assert!(first.contains("build build/.globs-check: phony .\n"));
    assert!(first.ends_with("build build/build.ninja: regenerate | . build/.globs-check\n"));

    assert_eq!(staleness(&config), Staleness::Fresh);
    assert_eq!(configure(&config), ["a.c", "b.c"]);
    assert_eq!(graph(tmp.path()), first);

    std::fs::write(tmp.path().join("c.c"), "int y;\n").unwrap();
    let after = staleness(&config);
    assert!(after.is_stale());
    insta::assert_snapshot!(after.to_string(), @"stale (changed globs: *.c)");

    assert_eq!(configure(&config), ["a.c", "b.c", "c.c"]);
    assert!(graph(tmp.path()).contains("build build/c.1.o: cc c.c\n"));
    assert_eq!(staleness(&config), Staleness::Fresh);
}

#[test]
fn glob_removed_file_is_stale() {
    let (tmp, config) = project(&["src/a.c", "src/b.c"]);
    generate(&config, |generator, env| {
        env.glob(generator, "src/*.c")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(staleness(&config), Staleness::Fresh);

    std::fs::remove_file(tmp.path().join("src/b.c")).unwrap();
    assert_eq!(
        staleness(&config),
        Staleness::Changed(vec!["src/*.c".to_string()])
    );
}

#[test]
fn glob_corrupt_ledger_is_stale() {
    let (tmp, config) = project(&["a.c"]);
    configure(&config);

    std::fs::write(tmp.path().join("build/.build.globs"), "{ not json").unwrap();
    assert_eq!(staleness(&config), Staleness::Unreadable);

    configure(&config);
    assert_eq!(staleness(&config), Staleness::Fresh);
}

#[test]
fn glob_missing_directory_fails() {
    let (_tmp, config) = project(&["a.c"]);
    let err = generate(&config, |generator, env| {
        env.glob(generator, "missing/*.c")?;
        Ok(())
    })
    .unwrap_err();
    assert!(err.to_string().starts_with("failed to resolve glob 'missing/*.c'"));
}
