//! Violation flattening, baseline diffing, and severity ordering.
//!
//! A rule counts as new only when its id is absent from every baseline
//! record; a known rule id hides all of its current occurrences.

use crate::models::{FlattenedViolation, Impact, Violation};
use std::collections::HashSet;

/// Expand each violation into one record per node.
pub fn flatten(violations: &[Violation]) -> Vec<FlattenedViolation> {
    violations
        .iter()
        .flat_map(|v| {
            v.nodes.iter().map(move |n| FlattenedViolation {
                id: v.id.clone(),
                help: v.help.clone(),
                help_url: v.help_url.clone(),
                impact: Impact::parse(n.impact.as_deref().or(v.impact.as_deref())),
                target: n.target.clone(),
                reasons: n.any.iter().map(|c| c.message.clone()).collect(),
            })
        })
        .collect()
}

/// Current records whose rule id never appears in `baseline`, in input order.
pub fn new_violations(
    current: &[FlattenedViolation],
    baseline: &[FlattenedViolation],
) -> Vec<FlattenedViolation> {
    let known: HashSet<&str> = baseline.iter().map(|v| v.id.as_str()).collect();
    current
        .iter()
        .filter(|v| !known.contains(v.id.as_str()))
        .cloned()
        .collect()
}

/// Stable sort by impact rank.
pub fn sort_by_impact(mut violations: Vec<FlattenedViolation>) -> Vec<FlattenedViolation> {
    violations.sort_by_key(|v| v.impact.rank());
    violations
}
