// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the Config module with realistic TOML configurations.

use ninjapie::config::{Config, ConfigLoader};
use ninjapie::graph::DefaultsMode;
use ninjapie::logging::LogLevel;
use std::path::{Path, PathBuf};

// =============================================================================
// Loading from TOML strings
// =============================================================================

#[test]
fn config_parse_full_project() {
    let toml = r#"
[global]
output_log_level = 4
log_file = "build/configure.log"
json_log = true

[paths]
build = "out/ninja"

[generator]
graph_file = "project.ninja"
ledger_file = "project.globs"
command = "cargo run --example configure --"
scripts = ["configure.rs", "cmake/toolchain.rs"]
defaults = "auto"
compile_commands = true
compile_rules = ["cc"]

[tools]
cc = "clang"
cxx = "clang++"
ar = "llvm-ar"
"#;
    let config = Config::parse(toml).unwrap();
    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert!(config.global.json_log);
    assert_eq!(config.paths.build, PathBuf::from("out/ninja"));
    assert_eq!(config.generator.graph_file, "project.ninja");
    assert_eq!(config.generator.scripts.len(), 2);
    assert_eq!(config.generator.defaults, DefaultsMode::Auto);
    assert_eq!(config.generator.compile_rules, ["cc"]);
    assert_eq!(config.tools.ar, "llvm-ar");

    let options = config.generator_options().unwrap();
    assert_eq!(options.build_root(), Path::new("out/ninja"));
    assert_eq!(
        options.regen_command(),
        Some("cargo run --example configure --")
    );
    assert!(config.log_config().json_file());
}

#[test]
fn config_invalid_defaults_mode() {
    assert!(Config::parse("[generator]\ndefaults = \"sometimes\"\n").is_err());
}

#[test]
fn config_rejects_unknown_section() {
    let err = Config::parse("[task]\nmo_org = \"x\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("task"));
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn config_later_files_override_earlier() {
    let tmp = tempfile::tempdir().unwrap();
    let base = tmp.path().join("base.toml");
    let ci = tmp.path().join("ci.toml");
    std::fs::write(&base, "[tools]\ncc = \"gcc-14\"\ncxx = \"g++-14\"\n").unwrap();
    std::fs::write(&ci, "[tools]\ncc = \"clang\"\n").unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file(&base)
        .add_toml_file(&ci)
        .add_toml_file_optional(tmp.path().join("missing.toml"));
    assert_eq!(loader.loaded_files().len(), 2);

    let config = loader.build().unwrap();
    assert_eq!(config.tools.cc, "clang");
    assert_eq!(config.tools.cxx, "g++-14");
}

#[test]
fn config_missing_required_file() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(Config::from_file(tmp.path().join("nope.toml")).is_err());
}

#[test]
fn config_overrides_beat_files() {
    let config = ConfigLoader::new()
        .add_toml_str("[generator]\ndefaults = \"auto\"\n")
        .set("generator.defaults", "explicit")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.generator.defaults, DefaultsMode::Explicit);
}
