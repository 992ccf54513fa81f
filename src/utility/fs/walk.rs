// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use bon::Builder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Options for directory traversal.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Maximum depth to traverse (None = unlimited)
    #[builder(setters(name = with_max_depth))]
    max_depth: Option<usize>,
    /// Follow symbolic links
    #[builder(setters(name = with_follow_links), default = false)]
    follow_links: bool,
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = false)]
    include_hidden: bool,
    /// Respect .gitignore files
    #[builder(setters(name = with_respect_gitignore), default = false)]
    respect_gitignore: bool,
    /// Skip these directories (absolute paths, exact match)
    #[builder(setters(name = with_skip_paths), default)]
    skip_paths: Vec<PathBuf>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    /// Returns the maximum depth to traverse.
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Returns whether to follow symbolic links.
    #[must_use]
    pub const fn follow_links(&self) -> bool {
        self.follow_links
    }

    /// Returns whether to include hidden files/directories.
    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Returns whether to respect .gitignore files.
    #[must_use]
    pub const fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    /// Returns the skipped directories.
    #[must_use]
    pub fn skip_paths(&self) -> &[PathBuf] {
        &self.skip_paths
    }
}

/// Result of a walk: files in traversal order plus every directory whose
/// contents were listed.
#[derive(Debug)]
pub struct WalkResult {
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
    error_count: usize,
}

impl WalkResult {
    pub(crate) const fn new(
        files: Vec<PathBuf>,
        directories: Vec<PathBuf>,
        error_count: usize,
    ) -> Self {
        Self {
            files,
            directories,
            error_count,
        }
    }

    /// Returns the files found during traversal.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Returns the directories that were listed, starting with the root.
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Returns the number of errors encountered.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }
}

/// Builds a `WalkBuilder` with the given options, using `filter_entry` for directory skipping.
pub(super) fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    if let Some(depth) = options.max_depth() {
        builder.max_depth(Some(depth));
    }

    builder.standard_filters(false);
    builder.follow_links(options.follow_links());
    builder.hidden(!options.include_hidden());

    builder.git_ignore(options.respect_gitignore());
    builder.git_global(options.respect_gitignore());
    builder.git_exclude(options.respect_gitignore());

    builder.sort_by_file_name(|a, b| a.cmp(b));

    // Evaluated before descending, so skipped trees are never listed
    if !options.skip_paths().is_empty() {
        let skip_paths: Arc<Vec<PathBuf>> = Arc::new(options.skip_paths().to_vec());
        builder.filter_entry(move |entry| {
            !(entry.file_type().is_some_and(|ft| ft.is_dir())
                && skip_paths.iter().any(|skip| skip == entry.path()))
        });
    }

    builder
}

/// Walks `root` sequentially in file-name order.
///
/// Directories at the depth limit are not listed and therefore not reported.
///
/// # Errors
///
/// Returns an error if the root directory does not exist or cannot be read.
///
/// # Example
/// ```no_run
/// use ninjapie::utility::fs::walk::{walk, WalkOptions};
///
/// let result = walk("/path/to/project/src", &WalkOptions::default())?;
/// println!("Found {} files", result.files().len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn walk<P: AsRef<Path>>(root: P, options: &WalkOptions) -> Result<WalkResult> {
    let root = root.as_ref();

    if !root.is_dir() {
        anyhow::bail!("directory does not exist: {}", root.display());
    }
    std::fs::read_dir(root)
        .map_err(|e| anyhow::anyhow!("cannot read directory {}: {e}", root.display()))?;

    let mut files = Vec::new();
    let mut directories = Vec::new();
    let mut error_count = 0;

    for entry_result in build_walker(root, options).build() {
        match entry_result {
            Ok(entry) => {
                let Some(file_type) = entry.file_type() else {
                    continue;
                };
                if file_type.is_dir() {
                    if options.max_depth().is_none_or(|max| entry.depth() < max) {
                        directories.push(entry.into_path());
                    }
                } else if file_type.is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                warn!(error = %e, "walk error");
                error_count += 1;
            }
        }
    }

    Ok(WalkResult::new(files, directories, error_count))
}
