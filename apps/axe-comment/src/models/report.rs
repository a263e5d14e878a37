//! Snapshot schema: the axe-core JSON output and the marker shapes written
//! in its place when a scan is protected, skipped, or fails.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The subset of an axe-core result this tool reads.
pub struct AxeReport {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A failed rule with every DOM location it failed at.
pub struct Violation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Selector list; usually an array of strings, nested for shadow DOM.
    #[serde(default)]
    pub target: Json,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub any: Vec<CheckResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Severity as reported by axe; anything unrecognised is `Unknown`.
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
    Info,
    Unknown,
}

impl Impact {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("critical") => Impact::Critical,
            Some("serious") => Impact::Serious,
            Some("moderate") => Impact::Moderate,
            Some("minor") => Impact::Minor,
            Some("info") => Impact::Info,
            _ => Impact::Unknown,
        }
    }

    /// Sort rank: critical=1 .. minor=4, everything else 5.
    pub fn rank(self) -> u8 {
        match self {
            Impact::Critical => 1,
            Impact::Serious => 2,
            Impact::Moderate => 3,
            Impact::Minor => 4,
            Impact::Info | Impact::Unknown => 5,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Impact::Critical => "❗️",
            Impact::Serious => "⚠️",
            Impact::Moderate => "🔶",
            Impact::Minor => "🔷",
            Impact::Info => "ℹ️",
            Impact::Unknown => "❔",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A loaded snapshot, classified once at load time.
pub enum Snapshot {
    /// No file, or a file whose shape is not recognised
    Absent,
    /// The target redirected to a password page
    Protected { url: Option<String> },
    /// The scan was not attempted because the baseline is protected
    Skipped {
        url: Option<String>,
        reason: Option<String>,
    },
    /// The scanner failed; `message` is the captured error
    ScanError { url: Option<String>, message: String },
    Normal(AxeReport),
}

impl Snapshot {
    pub fn is_protected(&self) -> bool {
        matches!(self, Snapshot::Protected { .. })
    }

    pub fn report(&self) -> Option<&AxeReport> {
        match self {
            Snapshot::Normal(r) => Some(r),
            _ => None,
        }
    }

    /// Captured scanner error, if this snapshot is an error marker.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Snapshot::ScanError { message, .. } => Some(message),
            Snapshot::Skipped { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Stand-in file written instead of a scanner result.
pub struct Marker {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_protected: Option<bool>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    pub error: String,
}

impl Marker {
    pub fn protected(url: &str) -> Self {
        Marker {
            url: url.to_string(),
            password_protected: Some(true),
            skipped: false,
            error: "URL redirects to password protection page".into(),
        }
    }

    pub fn skipped(url: &str) -> Self {
        Marker {
            url: url.to_string(),
            password_protected: Some(false),
            skipped: true,
            error: "Tests skipped because live URL is password protected".into(),
        }
    }

    pub fn failed(url: &str, message: impl Into<String>) -> Self {
        Marker {
            url: url.to_string(),
            password_protected: None,
            skipped: false,
            error: message.into(),
        }
    }
}
