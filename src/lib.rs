// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! A project describes its build in a small configuration program that
//! links against this crate; running it writes a Ninja graph file that
//! re-runs the program whenever its scripts or globbed directories change.
//!
//! # Crate Architecture
//!
//! ```text
//!        configure program            ninjapie binary (main.rs)
//!                |                            |
//!                v                            v
//!        cmd::configure::run        cli (clap) -> cmd (options, inis, status)
//!                |                            |
//!                +-------------+--------------+
//!                              v
//!              ,-------------------------------,
//!              |            config             |
//!              |  ninjapie.toml, NINJAPIE_*    |
//!              '---------------+---------------'
//!                              v
//!                 env (Env, BuildRequest, recipes)
//!                              |
//!                              v
//!                 graph (Generator, rules, steps, writer)
//!                    |                      |
//!                    v                      v
//!             glob (tracker, ledger)      path (SourcePath, BuildPath)
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod env;
pub mod error;
pub mod glob;
pub mod graph;
pub mod logging;
pub mod path;
pub mod utility;
