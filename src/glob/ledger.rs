// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persisted glob ledger.
//!
//! ```json
//! {
//!   "version": 1,
//!   "globs": {
//!     "src/*.c": {
//!       "base": "src",
//!       "glob": "*.c",
//!       "matches": ["src/a.c", "src/b.c"],
//!       "dirs": { "src": { "mtime_ns": 1700000000000000000, "entries": 2 } }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::path::SourcePath;

/// Current on-disk format version.
pub const LEDGER_VERSION: u32 = 1;

/// Signature of a scanned directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirStamp {
    pub mtime_ns: u64,
    pub entries: u64,
}

impl DirStamp {
    /// Reads the current signature of `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be stat'ed or listed.
    pub fn read(dir: &Path) -> std::io::Result<Self> {
        let modified = std::fs::metadata(dir)?.modified()?;
        let mtime_ns = modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
        let entries = std::fs::read_dir(dir)?.count() as u64;
        Ok(Self { mtime_ns, entries })
    }
}

/// Result of applying one glob pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobRecord {
    /// Literal directory prefix of the pattern, project-relative.
    pub base: SourcePath,
    /// Glob part matched against paths relative to `base`.
    pub glob: String,
    /// Matching files, sorted.
    pub matches: Vec<SourcePath>,
    /// Every listed directory (project-relative) with its signature.
    pub dirs: BTreeMap<SourcePath, DirStamp>,
}

impl GlobRecord {
    /// Project-relative pattern used as the ledger key.
    #[must_use]
    pub fn pattern(&self) -> String {
        if self.base.is_root() {
            self.glob.clone()
        } else {
            format!("{}/{}", self.base.as_str(), self.glob)
        }
    }
}

/// All glob records of one configuration run, keyed by pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub version: u32,
    pub globs: BTreeMap<String, GlobRecord>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            version: LEDGER_VERSION,
            globs: BTreeMap::new(),
        }
    }
}

impl Ledger {
    /// Parses a ledger, rejecting unknown format versions.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the JSON is malformed or the
    /// version does not match.
    pub fn parse(text: &str) -> Result<Self, String> {
        let ledger: Self = serde_json::from_str(text).map_err(|e| e.to_string())?;
        if ledger.version != LEDGER_VERSION {
            return Err(format!(
                "unsupported ledger version {} (expected {LEDGER_VERSION})",
                ledger.version
            ));
        }
        Ok(ledger)
    }

    /// Serializes the ledger as pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}
