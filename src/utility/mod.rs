// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! fs
//!   walk:    walk(), WalkOptions, WalkResult
//!   atomic:  write_atomic(), write_if_changed()
//! ```

pub mod fs;
