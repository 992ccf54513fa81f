// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path model: source-tree locations vs build-output locations.
//!
//! ```text
//! PathArg (API boundary: &str | String | SourcePath | BuildPath | NodePath)
//!    |
//!    v  PathContext::classify / resolve / output   (once per argument)
//! NodePath
//!   Source(SourcePath)   "sub/foo.c"         (project-relative)
//!   Build(BuildPath)     "build/sub/foo.o"   (build root + source subdir)
//!
//! render(): "$" -> "$$", ":" -> "$:", " " -> "$ "
//! ```
//!
//! All paths are normalized, slash-separated and relative to the project
//! root, which is the directory Ninja runs in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::{GraphError, GraphResult};

/// A location in the source tree, relative to the project root.
///
/// The project root itself is the empty path and renders as `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourcePath(String);

/// A location in the build tree: the build root followed by the source
/// subdirectory the output originates from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildPath(String);

/// Either kind of path, as stored in build steps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodePath {
    Source(SourcePath),
    Build(BuildPath),
}

impl SourcePath {
    /// Returns the normalized path (empty for the project root).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the project root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the last path component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        file_name(&self.0)
    }

    /// Replaces the file extension, keeping the path in the source tree.
    #[must_use]
    pub fn with_extension(&self, ext: &str) -> Self {
        Self(replace_extension(&self.0, ext))
    }

    /// Renders the path for the graph file.
    #[must_use]
    pub fn render(&self) -> String {
        if self.0.is_empty() {
            ".".to_string()
        } else {
            escape_path(&self.0)
        }
    }
}

impl BuildPath {
    /// Returns the normalized path, including the build root.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last path component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        file_name(&self.0)
    }

    /// Returns the directory containing this path.
    #[must_use]
    pub fn parent(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Joins a relative path below this one.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if `rel` is empty, absolute or uses
    /// `..`, since a build path must stay inside the build tree.
    pub fn join(&self, rel: &str) -> GraphResult<Self> {
        if Path::new(rel).is_absolute() || rel.split('/').any(|seg| seg == "..") {
            return Err(GraphError::invalid_path(
                rel,
                "build paths cannot be joined with absolute or parent paths",
            ));
        }
        let joined = normalize(&format!("{}/{rel}", self.0), rel)?;
        if joined == self.0 {
            return Err(GraphError::invalid_path(rel, "empty path"));
        }
        Ok(Self(joined))
    }

    /// Replaces the file extension, keeping the path in the build tree.
    #[must_use]
    pub fn with_extension(&self, ext: &str) -> Self {
        Self(replace_extension(&self.0, ext))
    }

    /// Renders the path for the graph file.
    #[must_use]
    pub fn render(&self) -> String {
        escape_path(&self.0)
    }
}

impl NodePath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Source(p) => p.as_str(),
            Self::Build(p) => p.as_str(),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Source(p) => p.render(),
            Self::Build(p) => p.render(),
        }
    }

    #[must_use]
    pub const fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        file_name(self.as_str())
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl fmt::Display for BuildPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(p) => p.fmt(f),
            Self::Build(p) => p.fmt(f),
        }
    }
}

impl From<SourcePath> for NodePath {
    fn from(path: SourcePath) -> Self {
        Self::Source(path)
    }
}

impl From<BuildPath> for NodePath {
    fn from(path: BuildPath) -> Self {
        Self::Build(path)
    }
}

/// A path argument as accepted by the public API.
///
/// Raw strings are classified exactly once by [`PathContext`]; typed paths
/// pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathArg {
    Raw(String),
    Node(NodePath),
}

impl From<&str> for PathArg {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for PathArg {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<&String> for PathArg {
    fn from(raw: &String) -> Self {
        Self::Raw(raw.clone())
    }
}

impl From<NodePath> for PathArg {
    fn from(path: NodePath) -> Self {
        Self::Node(path)
    }
}

impl From<&NodePath> for PathArg {
    fn from(path: &NodePath) -> Self {
        Self::Node(path.clone())
    }
}

impl From<SourcePath> for PathArg {
    fn from(path: SourcePath) -> Self {
        Self::Node(NodePath::Source(path))
    }
}

impl From<&SourcePath> for PathArg {
    fn from(path: &SourcePath) -> Self {
        Self::Node(NodePath::Source(path.clone()))
    }
}

impl From<BuildPath> for PathArg {
    fn from(path: BuildPath) -> Self {
        Self::Node(NodePath::Build(path))
    }
}

impl From<&BuildPath> for PathArg {
    fn from(path: &BuildPath) -> Self {
        Self::Node(NodePath::Build(path.clone()))
    }
}

#[derive(Debug)]
struct Roots {
    project: PathBuf,
    build: String,
}

/// Resolution context: the project and build roots plus the current source
/// subdirectory.
///
/// Cloning is cheap; the roots are shared.
#[derive(Debug, Clone)]
pub struct PathContext {
    roots: Arc<Roots>,
    cur_dir: String,
}

impl PathContext {
    /// Creates a context rooted at `project_root` with outputs below
    /// `build_root`.
    ///
    /// A relative `project_root` is resolved against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if the build root is empty, not
    /// inside the project root, or not valid UTF-8.
    pub fn new(project_root: impl AsRef<Path>, build_root: impl AsRef<Path>) -> GraphResult<Self> {
        let project_root = project_root.as_ref();
        let project = if project_root.is_absolute() {
            project_root.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| {
                    GraphError::invalid_path(project_root.display().to_string(), e.to_string())
                })?
                .join(project_root)
        };

        let build_root = build_root.as_ref();
        let raw_build = if build_root.is_absolute() {
            relative_to(&project, build_root)?
        } else {
            path_to_str(build_root)?
        };
        let build = normalize(&raw_build, &raw_build)?;
        if build.is_empty() {
            return Err(GraphError::invalid_path(
                raw_build,
                "the build root must be a subdirectory of the project root",
            ));
        }

        Ok(Self {
            roots: Arc::new(Roots { project, build }),
            cur_dir: String::new(),
        })
    }

    /// Returns the absolute project root.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.roots.project
    }

    /// Returns the build root as a build path.
    #[must_use]
    pub fn build_root(&self) -> BuildPath {
        BuildPath(self.roots.build.clone())
    }

    /// Returns the current source subdirectory.
    #[must_use]
    pub fn cur_dir(&self) -> SourcePath {
        SourcePath(self.cur_dir.clone())
    }

    /// Returns the build directory mirroring the current source subdirectory.
    #[must_use]
    pub fn out_dir(&self) -> BuildPath {
        self.to_build(&self.cur_dir())
    }

    /// Returns a context whose current directory is `dir` below this one.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if `dir` escapes the project root
    /// or points into the build tree.
    pub fn enter(&self, dir: &str) -> GraphResult<Self> {
        match self.classify(dir)? {
            NodePath::Source(path) => Ok(Self {
                roots: Arc::clone(&self.roots),
                cur_dir: path.0,
            }),
            NodePath::Build(path) => Err(GraphError::invalid_path(
                path.0,
                "cannot enter a directory of the build tree",
            )),
        }
    }

    /// Classifies and normalizes a raw path relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] for empty paths, paths containing
    /// newlines or NUL, absolute paths outside the project root, and paths
    /// escaping the project root through `..`.
    pub fn classify(&self, raw: &str) -> GraphResult<NodePath> {
        if raw.is_empty() {
            return Err(GraphError::invalid_path(raw, "empty path"));
        }
        if raw.contains(['\n', '\r', '\0']) {
            return Err(GraphError::invalid_path(
                raw.escape_debug().to_string(),
                "paths cannot contain line breaks or NUL",
            ));
        }

        let as_path = Path::new(raw);
        let normalized = if as_path.is_absolute() {
            let rel = relative_to(&self.roots.project, as_path)?;
            normalize(&rel, raw)?
        } else {
            normalize(&format!("{}/{raw}", self.cur_dir), raw)?
        };

        Ok(self.kind_of(normalized))
    }

    /// Converts a path argument into a typed path.
    ///
    /// # Errors
    ///
    /// See [`PathContext::classify`].
    pub fn resolve(&self, arg: PathArg) -> GraphResult<NodePath> {
        match arg {
            PathArg::Raw(raw) => self.classify(&raw),
            PathArg::Node(node) => Ok(node),
        }
    }

    /// Converts a path argument into an output location in the build tree.
    ///
    /// Source locations are placed under the build root, keeping their
    /// subdirectory, so equally named files from different directories do
    /// not collide.
    ///
    /// # Errors
    ///
    /// See [`PathContext::classify`].
    pub fn output(&self, arg: PathArg) -> GraphResult<BuildPath> {
        match self.resolve(arg)? {
            NodePath::Source(src) => {
                if src.is_root() {
                    return Err(GraphError::invalid_path(
                        ".",
                        "the project root cannot be an output",
                    ));
                }
                Ok(self.to_build(&src))
            }
            NodePath::Build(build) => Ok(build),
        }
    }

    /// Places a source location under the build root.
    #[must_use]
    pub fn to_build(&self, src: &SourcePath) -> BuildPath {
        if src.is_root() {
            BuildPath(self.roots.build.clone())
        } else {
            BuildPath(format!("{}/{}", self.roots.build, src.0))
        }
    }

    /// Joins `rel` onto a source location, keeping it in the source tree.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if `rel` is absolute, or if the
    /// result escapes the project root or lands in the build tree.
    pub fn join_source(&self, base: &SourcePath, rel: &str) -> GraphResult<SourcePath> {
        if Path::new(rel).is_absolute() || rel.starts_with('/') {
            return Err(GraphError::invalid_path(rel, "expected a relative path"));
        }
        let joined = normalize(&format!("{}/{rel}", base.0), rel)?;
        match self.kind_of(joined) {
            NodePath::Source(src) => Ok(src),
            NodePath::Build(build) => Err(GraphError::invalid_path(
                build.0,
                "joining a source path must not enter the build tree",
            )),
        }
    }

    /// Expresses an absolute or current-directory-relative filesystem path
    /// relative to the project root.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPath`] if the path is outside the project
    /// root.
    pub fn relativize(&self, path: &Path) -> GraphResult<NodePath> {
        if path.is_absolute() {
            let rel = relative_to(&self.roots.project, path)?;
            let normalized = normalize(&rel, &rel)?;
            Ok(self.kind_of(normalized))
        } else {
            let raw = path_to_str(path)?;
            let normalized = normalize(&raw, &raw)?;
            Ok(self.kind_of(normalized))
        }
    }

    /// Returns the absolute filesystem location of a node.
    #[must_use]
    pub fn absolute(&self, path: &NodePath) -> PathBuf {
        let rel = path.as_str();
        if rel.is_empty() {
            self.roots.project.clone()
        } else {
            self.roots.project.join(rel)
        }
    }

    fn kind_of(&self, normalized: String) -> NodePath {
        let build = &self.roots.build;
        let in_build = normalized == *build
            || (normalized.starts_with(build.as_str())
                && normalized.as_bytes().get(build.len()) == Some(&b'/'));
        if in_build {
            NodePath::Build(BuildPath(normalized))
        } else {
            NodePath::Source(SourcePath(normalized))
        }
    }
}

/// Normalizes a slash-separated relative path: drops `.` and empty segments
/// and resolves `..`.
///
/// # Errors
///
/// Returns [`GraphError::InvalidPath`] (reported against `original`) if `..`
/// climbs above the root.
pub(crate) fn normalize(raw: &str, original: &str) -> GraphResult<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(GraphError::invalid_path(
                        original,
                        "escapes the project root",
                    ));
                }
            }
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Escapes a path for use in a build statement.
#[must_use]
pub fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '$' => out.push_str("$$"),
            ' ' => out.push_str("$ "),
            ':' => out.push_str("$:"),
            c => out.push(c),
        }
    }
    out
}

fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Replaces the extension of the last component (`foo.c` -> `foo.o`).
///
/// Leading dots do not start an extension (`.config` has none).
fn replace_extension(path: &str, ext: &str) -> String {
    let (dir, name) = path.rsplit_once('/').unwrap_or(("", path));
    let stem = match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => &name[..idx],
        _ => name,
    };
    let ext = ext.trim_start_matches('.');
    if dir.is_empty() {
        format!("{stem}.{ext}")
    } else {
        format!("{dir}/{stem}.{ext}")
    }
}

fn relative_to(root: &Path, path: &Path) -> GraphResult<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        GraphError::invalid_path(
            path.display().to_string(),
            "absolute path outside the project root",
        )
    })?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| {
                        GraphError::invalid_path(path.display().to_string(), "not valid UTF-8")
                    })?
                    .to_string(),
            ),
            Component::CurDir => {}
            Component::ParentDir => parts.push("..".to_string()),
            Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Ok(parts.join("/"))
}

fn path_to_str(path: &Path) -> GraphResult<String> {
    path.to_str()
        .map(|s| s.replace('\\', "/"))
        .ok_or_else(|| GraphError::invalid_path(path.display().to_string(), "not valid UTF-8"))
}
