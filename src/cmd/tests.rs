// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::configure::generate;
use super::load_config;
use super::status::graph_status;
use crate::cli::global::GlobalOptions;
use crate::config::Config;
use crate::glob::Staleness;
use crate::logging::LogLevel;
use std::path::{Path, PathBuf};

fn config_for(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.root = Some(root.to_path_buf());
    config.generator.command = Some("./configure".to_string());
    config.generator.compile_commands = true;
    config.resolve_and_validate().unwrap();
    config
}

fn write(root: &Path, file: &str) {
    let path = root.join(file);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

#[test]
fn test_load_config_applies_cli_overrides() {
    let global = GlobalOptions {
        log_level: Some(4),
        build_dir: Some(PathBuf::from("out")),
        options: vec!["tools.cc=clang".to_string()],
        ..GlobalOptions::default()
    };
    let config = load_config(&global).unwrap();
    assert_eq!(config.paths.build, PathBuf::from("out"));
    assert_eq!(config.tools.cc, "clang");
    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(config.global.file_log_level, LogLevel::DEBUG);
}

#[test]
fn test_load_config_missing_ini_fails() {
    let global = GlobalOptions {
        inis: vec![PathBuf::from("does/not/exist.toml")],
        ..GlobalOptions::default()
    };
    assert!(load_config(&global).is_err());
}

#[test]
fn test_generate_writes_graph_and_database() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "hello.c");
    write(tmp.path(), "configure.rs");
    let config = config_for(tmp.path());

    let path = generate(&config, |generator, env| {
        let obj = env.cc(generator, "hello.o", ["hello.c"])?;
        env.c_exe(generator, "hello", [obj], &[], &[])?;
        Ok(())
    })
    .unwrap();

    assert_eq!(path, tmp.path().join("build/build.ninja"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("build build/hello.o: cc hello.c\n"));
    assert!(text.contains("build build/hello: link build/hello.o\n"));
    assert!(text.contains("  command = ./configure\n"));
    assert!(text.ends_with("build build/build.ninja: regenerate | configure.rs\n"));
    assert!(tmp.path().join("build/compile_commands.json").is_file());
}

#[test]
fn test_generate_failure_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_for(tmp.path());

    let err = generate(&config, |generator, env| {
        env.cc(generator, "a.o", ["a.c"])?;
        anyhow::bail!("configuration gave up")
    })
    .unwrap_err();
    insta::assert_snapshot!(format!("{err:#}"), @"configuration gave up");
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_graph_status_lifecycle() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "src/a.c");
    let config = config_for(tmp.path());

    let status = graph_status(&config).unwrap();
    assert!(!status.graph_exists);
    assert_eq!(status.staleness, Staleness::Missing);
    assert!(status.needs_regeneration());

    generate(&config, |generator, env| {
        for src in env.glob(generator, "src/*.c")? {
            env.objs(generator, [src])?;
        }
        Ok(())
    })
    .unwrap();

    let status = graph_status(&config).unwrap();
    assert!(status.graph_exists);
    assert_eq!(status.staleness, Staleness::Fresh);
    assert!(!status.needs_regeneration());

    write(tmp.path(), "src/b.c");
    let status = graph_status(&config).unwrap();
    assert_eq!(
        status.staleness,
        Staleness::Changed(vec!["src/*.c".to_string()])
    );
    assert!(status.needs_regeneration());
}
