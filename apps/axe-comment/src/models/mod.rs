//! Shared data models for snapshots, scan targets, and flattened violations.

pub mod report;
pub mod target;

pub use report::{AxeReport, CheckResult, Impact, Marker, Node, Snapshot, Violation};
pub use target::{AttemptedUrls, ResolvedTargets, Role, ScanTarget};

use serde::Serialize;
use serde_json::Value as Json;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One rule violation merged with exactly one of its nodes.
///
/// Node-level fields win over rule-level fields, so `impact` is the node's
/// impact when the scanner reports one.
pub struct FlattenedViolation {
    pub id: String,
    pub help: String,
    pub help_url: String,
    pub impact: Impact,
    pub target: Json,
    pub reasons: Vec<String>,
}
