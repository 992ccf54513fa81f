// ninjapie: Ninja build file generator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;
use std::panic::Location;

use crate::path::{BuildPath, NodePath};

/// Libraries a link step wants, resolved against the graph's own outputs
/// when the file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibLookup {
    pub(crate) names: Vec<String>,
    pub(crate) search: Vec<NodePath>,
}

impl LibLookup {
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn search(&self) -> &[NodePath] {
        &self.search
    }
}

/// One build statement: outputs produced from inputs by a rule.
#[derive(Debug, Clone)]
pub struct BuildStep {
    pub(crate) rule: String,
    pub(crate) outputs: Vec<BuildPath>,
    pub(crate) inputs: Vec<NodePath>,
    pub(crate) implicit: Vec<NodePath>,
    pub(crate) order_only: Vec<NodePath>,
    pub(crate) variables: BTreeMap<String, String>,
    pub(crate) always: bool,
    pub(crate) libs: Option<LibLookup>,
    pub(crate) origin: &'static Location<'static>,
}

impl BuildStep {
    pub(crate) fn new(rule: impl Into<String>, origin: &'static Location<'static>) -> Self {
        Self {
            rule: rule.into(),
            outputs: Vec::new(),
            inputs: Vec::new(),
            implicit: Vec::new(),
            order_only: Vec::new(),
            variables: BTreeMap::new(),
            always: false,
            libs: None,
            origin,
        }
    }

    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    #[must_use]
    pub fn outputs(&self) -> &[BuildPath] {
        &self.outputs
    }

    #[must_use]
    pub fn inputs(&self) -> &[NodePath] {
        &self.inputs
    }

    /// Implicit dependencies (`| deps`), deduplicated.
    #[must_use]
    pub fn implicit(&self) -> &[NodePath] {
        &self.implicit
    }

    /// Order-only dependencies (`|| deps`), deduplicated.
    #[must_use]
    pub fn order_only(&self) -> &[NodePath] {
        &self.order_only
    }

    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Whether the step depends on the `always` phony target.
    #[must_use]
    pub const fn is_always(&self) -> bool {
        self.always
    }

    #[must_use]
    pub const fn libs(&self) -> Option<&LibLookup> {
        self.libs.as_ref()
    }

    /// Call site that registered this step.
    #[must_use]
    pub const fn origin(&self) -> &'static Location<'static> {
        self.origin
    }

    /// Appends an implicit dependency unless already present.
    pub(crate) fn push_implicit(&mut self, dep: NodePath) {
        if !self.implicit.contains(&dep) {
            self.implicit.push(dep);
        }
    }

    pub(crate) fn push_order_only(&mut self, dep: NodePath) {
        if !self.order_only.contains(&dep) {
            self.order_only.push(dep);
        }
    }

    /// Marks non-phony steps without any inputs as always out of date.
    pub(crate) fn finish(&mut self) {
        self.always = self.rule != "phony" && self.inputs.is_empty() && self.implicit.is_empty();
    }
}
