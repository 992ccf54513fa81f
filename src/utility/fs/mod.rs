// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities: directory traversal and atomic writes.
//!
//! ```text
//! walk:    walk()            ignore::Walk, sorted, depth-limited
//!          WalkOptions       max_depth, hidden, gitignore, skip_paths
//! atomic:  write_atomic()    NamedTempFile + persist (rename)
//!          write_if_changed() skip identical contents
//! ```

pub mod atomic;
pub mod walk;
