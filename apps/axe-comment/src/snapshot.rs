//! Snapshot loading and shape normalization.
//!
//! Accepted shapes:
//! - marker objects (`passwordProtected`, `skipped`, or a bare `error`)
//! - `{ "violations": [...] }`
//! - `[ { "violations": [...] } ]` as written by axe-cli
//!
//! Anything else, including unreadable JSON, loads as `Snapshot::Absent`.

use crate::models::{AxeReport, Snapshot};
use serde_json::Value as Json;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub fn load_snapshot(path: &Path) -> Snapshot {
    if !path.exists() {
        debug!(path = %path.display(), "snapshot file not found");
        return Snapshot::Absent;
    }
    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "snapshot file is not readable");
            return Snapshot::Absent;
        }
    };
    let json: Json = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "snapshot file is not valid JSON");
            return Snapshot::Absent;
        }
    };
    let snapshot = classify(json);
    debug!(path = %path.display(), kind = kind(&snapshot), "snapshot loaded");
    snapshot
}

/// Classify a parsed snapshot document.
pub fn classify(json: Json) -> Snapshot {
    let url = json.get("url").and_then(Json::as_str).map(String::from);
    let flag = |key: &str| json.get(key).and_then(Json::as_bool) == Some(true);

    if flag("passwordProtected") {
        return Snapshot::Protected { url };
    }
    if flag("skipped") {
        let reason = json.get("error").and_then(Json::as_str).map(String::from);
        return Snapshot::Skipped { url, reason };
    }

    let body = if has_violations(&json) {
        json
    } else if let Some(items) = json.as_array() {
        match items.first() {
            Some(first) if has_violations(first) => first.clone(),
            _ => return Snapshot::Absent,
        }
    } else {
        return match json.get("error").and_then(Json::as_str) {
            Some(message) => Snapshot::ScanError {
                url,
                message: message.to_string(),
            },
            None => Snapshot::Absent,
        };
    };

    match serde_json::from_value::<AxeReport>(body) {
        Ok(report) => Snapshot::Normal(report),
        Err(e) => {
            warn!(error = %e, "snapshot violations have an unexpected shape");
            Snapshot::Absent
        }
    }
}

fn has_violations(json: &Json) -> bool {
    json.get("violations").is_some_and(Json::is_array)
}

fn kind(s: &Snapshot) -> &'static str {
    match s {
        Snapshot::Absent => "absent",
        Snapshot::Protected { .. } => "protected",
        Snapshot::Skipped { .. } => "skipped",
        Snapshot::ScanError { .. } => "error",
        Snapshot::Normal(_) => "normal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> Json {
        json!({
            "url": "https://shop.test/?pb=0",
            "violations": [{
                "id": "image-alt",
                "help": "Images must have alternate text",
                "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/image-alt",
                "impact": "critical",
                "nodes": [{
                    "target": ["img.hero"],
                    "any": [{ "id": "has-alt", "message": "Element has no alt attribute" }]
                }]
            }]
        })
    }

    #[test]
    fn test_object_and_wrapped_array_normalize_identically() {
        let direct = classify(sample());
        let wrapped = classify(json!([sample()]));
        assert!(matches!(direct, Snapshot::Normal(_)));
        assert_eq!(direct, wrapped);
        let report = direct.report().unwrap();
        assert_eq!(report.violations[0].nodes[0].any[0].message, "Element has no alt attribute");
    }

    #[test]
    fn test_markers() {
        let p = classify(json!({
            "url": "https://x.test/",
            "passwordProtected": true,
            "error": "e"
        }));
        assert!(p.is_protected());
        let s = classify(json!({
            "url": "u",
            "passwordProtected": false,
            "skipped": true,
            "error": "why"
        }));
        assert_eq!(
            s,
            Snapshot::Skipped {
                url: Some("u".into()),
                reason: Some("why".into())
            }
        );
        let e = classify(json!({"error": "Command failed", "url": "u"}));
        assert_eq!(e.error_message(), Some("Command failed"));
    }

    #[test]
    fn test_unknown_shapes_are_absent() {
        assert_eq!(classify(json!({"violations": "nope"})), Snapshot::Absent);
        assert_eq!(classify(json!([])), Snapshot::Absent);
        assert_eq!(classify(json!([{"foo": 1}])), Snapshot::Absent);
        assert_eq!(classify(json!(42)), Snapshot::Absent);
    }

    #[test]
    fn test_missing_and_malformed_files_are_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("axe-report-preview.json");
        assert_eq!(load_snapshot(&path), Snapshot::Absent);
        fs::write(&path, "{ truncated").unwrap();
        assert_eq!(load_snapshot(&path), Snapshot::Absent);
        fs::write(&path, serde_json::to_string(&sample()).unwrap()).unwrap();
        assert!(matches!(load_snapshot(&path), Snapshot::Normal(_)));
    }
}
