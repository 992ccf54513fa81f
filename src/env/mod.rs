// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build environments: variable scopes that turn build requests into graph
//! steps.
//!
//! # Architecture
//!
//! ```text
//! Env (root, id 1)
//!   |  clone()          -> independent copy, new id
//!   |  set/append/...   -> local to this Env and its later clones
//!   v
//! build(gen, BuildRequest)
//!   resolve paths against cur_dir
//!   bind referenced variables from the scope
//!   overlay request bindings
//!   Generator::add_step   -> DuplicateOutput at add time
//!
//! recipes: cc, cxx, asm, objs, static_lib, shared_lib, c_exe, ...
//! ```

mod container;
pub mod recipes;
mod types;


pub use container::Env;
pub use recipes::builtin_rule;
pub use types::{BuildRequest, EnvFlags};
