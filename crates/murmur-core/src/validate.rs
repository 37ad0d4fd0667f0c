//! Integrity checks over a loaded story graph.
//!
//! Unknown node references are data bugs: the engine halts when it meets
//! one at runtime, so authors should catch them here first.

use std::collections::{HashSet, VecDeque};

use crate::story::StoryGraph;

/// A warning or error found during story validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// The node or ending where the issue was found.
    pub location: String,
    /// A human-readable description of the issue.
    pub message: String,
    /// Whether this is an error (true) or a warning (false).
    pub is_error: bool,
}

impl ValidationIssue {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
            is_error: true,
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
            is_error: false,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{level}: {}: {}", self.location, self.message)
    }
}

/// Validate a story graph.
///
/// Returns every issue found; an empty list means the story is clean.
pub fn validate(graph: &StoryGraph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_choices(graph, &mut issues);
    check_endings(graph, &mut issues);
    check_reachability(graph, &mut issues);
    check_dead_ends(graph, &mut issues);

    issues
}

/// Choice targets must exist and choice ids must be unique per node.
fn check_choices(graph: &StoryGraph, issues: &mut Vec<ValidationIssue>) {
    for node in graph.nodes() {
        let mut seen = HashSet::new();
        for choice in &node.choices {
            if !seen.insert(choice.id.as_str()) {
                issues.push(ValidationIssue::error(
                    format!("node '{}'", node.id),
                    format!("duplicate choice id '{}'", choice.id),
                ));
            }
            if !graph.contains(&choice.target) {
                issues.push(ValidationIssue::error(
                    format!("node '{}'", node.id),
                    format!(
                        "choice '{}' targets unknown node '{}'",
                        choice.id, choice.target
                    ),
                ));
            }
            if let Some(condition) = &choice.condition {
                for referenced in condition.referenced_nodes() {
                    if !graph.contains(referenced) {
                        issues.push(ValidationIssue::error(
                            format!("node '{}'", node.id),
                            format!(
                                "guard of choice '{}' names unknown node '{referenced}'",
                                choice.id
                            ),
                        ));
                    }
                }
            }
        }
    }
}

fn check_endings(graph: &StoryGraph, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for ending in graph.endings() {
        if !seen.insert(ending.id.as_str()) {
            issues.push(ValidationIssue::error(
                format!("ending '{}'", ending.id),
                "duplicate ending id",
            ));
        }
        for referenced in ending.condition.referenced_nodes() {
            if !graph.contains(referenced) {
                issues.push(ValidationIssue::error(
                    format!("ending '{}'", ending.id),
                    format!("condition names unknown node '{referenced}'"),
                ));
            }
        }
    }
}

/// Nodes that no chain of choices leads to from the start node.
fn check_reachability(graph: &StoryGraph, issues: &mut Vec<ValidationIssue>) {
    let mut reached: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::from([graph.start_id()]);

    while let Some(id) = queue.pop_front() {
        if !reached.insert(id) {
            continue;
        }
        if let Some(node) = graph.node(id) {
            for choice in &node.choices {
                if graph.contains(&choice.target) {
                    queue.push_back(&choice.target);
                }
            }
        }
    }

    for node in graph.nodes() {
        if !reached.contains(node.id.as_str()) {
            issues.push(ValidationIssue::warning(
                format!("node '{}'", node.id),
                "unreachable from the start node",
            ));
        }
    }
}

/// Terminal nodes that no ending mentions by id.
///
/// Endings keyed on state alone may still cover them, so these are warnings.
fn check_dead_ends(graph: &StoryGraph, issues: &mut Vec<ValidationIssue>) {
    let named: HashSet<&str> = graph
        .endings()
        .iter()
        .flat_map(|e| e.condition.referenced_nodes())
        .collect();

    for node in graph.nodes() {
        if node.choices.is_empty() && !named.contains(node.id.as_str()) {
            issues.push(ValidationIssue::warning(
                format!("node '{}'", node.id),
                "has no choices and no ending names it",
            ));
        }
    }
}
