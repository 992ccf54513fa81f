// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Glob resolution and staleness tracking.
//!
//! ```text
//! Env::glob("src/**/*.c")
//!    |  split_pattern: base "src" + glob "**/*.c"
//!    v
//! resolve()  walk(base, depth 1 | unlimited), skip hidden + build root
//!    |       -> GlobRecord { matches (sorted), dirs { dir -> DirStamp } }
//!    v
//! GlobTracker (current ledger)  --write-->  build/.build.globs
//!
//! startup: check_ledger(previous)
//!    dir stamps equal        -> fresh
//!    stamps differ -> re-glob: same matches -> fresh, else stale
//! ```
//!
//! Directory signatures are an approximation: a change that keeps both the
//! mtime and the entry count of every scanned directory goes unnoticed.

pub mod ledger;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use wax::{Glob, Program};

use crate::error::{GraphError, GraphResult};
use crate::path::{NodePath, PathContext, SourcePath};
use crate::utility::fs::walk::{WalkOptions, walk};
use ledger::{DirStamp, GlobRecord, Ledger};

/// Outcome of comparing the previous ledger with the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Every recorded pattern still yields the recorded matches.
    Fresh,
    /// No ledger from a previous run.
    Missing,
    /// The ledger exists but cannot be parsed.
    Unreadable,
    /// These patterns now yield different matches.
    Changed(Vec<String>),
}

impl Staleness {
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => f.write_str("fresh"),
            Self::Missing => f.write_str("stale (no glob ledger)"),
            Self::Unreadable => f.write_str("stale (unreadable glob ledger)"),
            Self::Changed(patterns) => {
                write!(f, "stale (changed globs: {})", patterns.join(", "))
            }
        }
    }
}

/// Splits a pattern into its literal directory prefix and the glob part.
///
/// The last component always belongs to the glob part.
#[must_use]
pub fn split_pattern(pattern: &str) -> (&str, &str) {
    const META: &[char] = &['*', '?', '[', ']', '{', '}', '<', '>', '!', '\\'];

    let mut base_end = 0;
    let mut offset = 0;
    let mut components = pattern.split('/').peekable();
    while let Some(component) = components.next() {
        if components.peek().is_none() || component.contains(META) {
            break;
        }
        offset += component.len() + 1;
        base_end = offset;
    }

    if base_end == 0 {
        ("", pattern)
    } else {
        (&pattern[..base_end - 1], &pattern[base_end..])
    }
}

/// Resolves `glob` below the source directory `base`.
///
/// # Errors
///
/// Returns [`GraphError::GlobResolution`] if the glob is malformed, the
/// base directory is missing, or any directory below it is unreadable.
pub fn resolve(ctx: &PathContext, base: &SourcePath, glob: &str) -> GraphResult<GlobRecord> {
    let record_pattern = if base.is_root() {
        glob.to_string()
    } else {
        format!("{}/{glob}", base.as_str())
    };
    let matcher = Glob::new(glob).map_err(|e| GraphError::glob(&record_pattern, e))?;

    let recursive = glob.contains('/') || glob.contains("**");
    let build_root = ctx.build_root();
    let options = WalkOptions::builder()
        .maybe_with_max_depth((!recursive).then_some(1))
        .with_skip_paths(vec![ctx.project_root().join(build_root.as_str())])
        .build();

    let abs_base = ctx.absolute(&base.clone().into());
    let result =
        walk(&abs_base, &options).map_err(|e| GraphError::glob(&record_pattern, format!("{e:#}")))?;
    if result.error_count() > 0 {
        return Err(GraphError::glob(
            &record_pattern,
            format!("{} entries below the base could not be read", result.error_count()),
        ));
    }

    let mut matches = Vec::new();
    for file in result.files() {
        let Some(rel) = relative_str(&abs_base, file) else {
            continue;
        };
        if matcher.is_match(Path::new(&rel)) {
            matches.push(ctx.join_source(base, &rel)?);
        }
    }
    matches.sort();

    let mut dirs = BTreeMap::new();
    for dir in result.directories() {
        let Some(rel) = relative_str(&abs_base, dir) else {
            continue;
        };
        let source = if rel.is_empty() {
            base.clone()
        } else {
            ctx.join_source(base, &rel)?
        };
        let stamp = DirStamp::read(dir).map_err(|e| GraphError::glob(&record_pattern, e))?;
        dirs.insert(source, stamp);
    }

    debug!(
        pattern = %record_pattern,
        matches = matches.len(),
        dirs = dirs.len(),
        "resolved glob"
    );

    Ok(GlobRecord {
        base: base.clone(),
        glob: glob.to_string(),
        matches,
        dirs,
    })
}

fn relative_str(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

/// Compares a previous ledger against the file system.
///
/// Patterns whose directory signatures are unchanged are trusted; the others
/// are re-applied and compared by their match lists.
#[must_use]
pub fn check_ledger(ctx: &PathContext, previous: &Ledger) -> Staleness {
    let mut changed = Vec::new();

    for (pattern, record) in &previous.globs {
        let unchanged = record.dirs.iter().all(|(dir, stamp)| {
            DirStamp::read(&ctx.absolute(&dir.clone().into()))
                .is_ok_and(|current| current == *stamp)
        });
        if unchanged {
            continue;
        }

        match resolve(ctx, &record.base, &record.glob) {
            Ok(current) if current.matches == record.matches => {
                debug!(%pattern, "directory changed but glob matches are the same");
            }
            Ok(_) => changed.push(pattern.clone()),
            Err(e) => {
                debug!(%pattern, error = %e, "glob no longer resolves");
                changed.push(pattern.clone());
            }
        }
    }

    if changed.is_empty() {
        Staleness::Fresh
    } else {
        Staleness::Changed(changed)
    }
}

/// Loads the ledger at `path` and evaluates its staleness.
#[must_use]
pub fn load_ledger(ctx: &PathContext, path: &Path) -> (Option<Ledger>, Staleness) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no glob ledger");
            return (None, Staleness::Missing);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read glob ledger");
            return (None, Staleness::Unreadable);
        }
    };

    match Ledger::parse(&text) {
        Ok(ledger) => {
            let staleness = check_ledger(ctx, &ledger);
            (Some(ledger), staleness)
        }
        Err(message) => {
            warn!(path = %path.display(), %message, "ignoring corrupt glob ledger");
            (None, Staleness::Unreadable)
        }
    }
}

/// Glob bookkeeping of one configuration run.
#[derive(Debug)]
pub struct GlobTracker {
    ledger_path: PathBuf,
    previous: Option<Ledger>,
    staleness: Staleness,
    current: Ledger,
    changed: bool,
}

impl GlobTracker {
    /// Loads the previous ledger from `ledger_path` and checks it.
    #[must_use]
    pub fn load(ctx: &PathContext, ledger_path: PathBuf) -> Self {
        let (previous, staleness) = load_ledger(ctx, &ledger_path);
        if staleness.is_stale() {
            info!(%staleness, "glob ledger check");
        }
        Self {
            ledger_path,
            previous,
            staleness,
            current: Ledger::default(),
            changed: false,
        }
    }

    /// Applies `pattern` relative to the context's current directory.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if the literal prefix escapes the
    /// project root (absolute prefixes included), or
    /// [`GraphError::GlobResolution`] if it cannot be resolved.
    pub fn glob(&mut self, ctx: &PathContext, pattern: &str) -> GraphResult<Vec<SourcePath>> {
        if pattern.is_empty() {
            return Err(GraphError::glob(pattern, "empty pattern"));
        }
        let (base, glob) = split_pattern(pattern);
        let base = if Path::new(pattern).is_absolute() {
            let abs = if base.is_empty() { "/" } else { base };
            match ctx.classify(abs)? {
                NodePath::Source(src) => src,
                NodePath::Build(build) => {
                    return Err(GraphError::invalid_path(
                        build.as_str(),
                        "globs cannot scan the build tree",
                    ));
                }
            }
        } else {
            ctx.join_source(&ctx.cur_dir(), base)?
        };
        let record = resolve(ctx, &base, glob)?;
        let key = record.pattern();

        let previous = self
            .previous
            .as_ref()
            .and_then(|ledger| ledger.globs.get(&key));
        if previous.is_none_or(|prev| prev.matches != record.matches) {
            debug!(pattern = %key, "glob matches differ from the previous run");
            self.changed = true;
        }

        let matches = record.matches.clone();
        self.current.globs.insert(key, record);
        Ok(matches)
    }

    /// Staleness of the previous ledger, evaluated at load time.
    #[must_use]
    pub const fn staleness(&self) -> &Staleness {
        &self.staleness
    }

    /// Whether any glob of this run differs from the previous run.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.changed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.globs.is_empty()
    }

    #[must_use]
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.current
    }

    /// All directories scanned during this run, project-relative.
    #[must_use]
    pub fn scanned_dirs(&self) -> BTreeSet<SourcePath> {
        self.current
            .globs
            .values()
            .flat_map(|record| record.dirs.keys().cloned())
            .collect()
    }
}
