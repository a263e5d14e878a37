//! Scan roles, resolved targets, and the attempted-URL side file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fs;
use std::path::Path;

pub const ATTEMPTED_URLS_FILE: &str = "attempted-urls.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Logical role of a scanned URL. `Default` is the live baseline.
pub enum Role {
    Preview,
    Default,
}

impl Role {
    /// Key used in `attempted-urls.json` and in snapshot file names.
    pub fn key(self) -> &'static str {
        match self {
            Role::Preview => "preview",
            Role::Default => "default",
        }
    }

    /// Human label used in console output and the comment.
    pub fn label(self) -> &'static str {
        match self {
            Role::Preview => "preview",
            Role::Default => "live",
        }
    }

    pub fn report_file(self) -> String {
        format!("axe-report-{}.json", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A ready-to-invoke URL for one role.
pub struct ScanTarget {
    pub role: Role,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Finalized role → URL mapping, at most one entry per role, in
/// registration order.
pub struct ResolvedTargets {
    targets: Vec<ScanTarget>,
}

impl ResolvedTargets {
    pub(crate) fn from_vec(targets: Vec<ScanTarget>) -> Self {
        ResolvedTargets { targets }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn get(&self, role: Role) -> Option<&ScanTarget> {
        self.targets.iter().find(|t| t.role == role)
    }

    pub fn url(&self, role: Role) -> Option<&str> {
        self.get(role).map(|t| t.url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanTarget> {
        self.targets.iter()
    }

    /// `{ "preview": url, "default": url }` in registration order.
    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        for t in &self.targets {
            map.insert(t.role.key().to_string(), Json::String(t.url.clone()));
        }
        Json::Object(map)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Contents of `attempted-urls.json`, read back only to enrich messages.
pub struct AttemptedUrls {
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

impl AttemptedUrls {
    /// Load from `path`; a missing or unreadable file yields empty urls.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return AttemptedUrls::default();
        }
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<AttemptedUrls>(&s).map_err(|e| e.to_string()));
        match parsed {
            Ok(urls) => urls,
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "error reading attempted urls");
                AttemptedUrls::default()
            }
        }
    }

    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::Preview => self.preview.as_deref(),
            Role::Default => self.default.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_to_json_keeps_registration_order() {
        let targets = ResolvedTargets::from_vec(vec![
            ScanTarget {
                role: Role::Preview,
                url: "https://a.test/?pb=0".into(),
            },
            ScanTarget {
                role: Role::Default,
                url: "https://b.test/?pb=0".into(),
            },
        ]);
        let s = serde_json::to_string(&targets.to_json()).unwrap();
        assert_eq!(
            s,
            r#"{"preview":"https://a.test/?pb=0","default":"https://b.test/?pb=0"}"#
        );
        assert_eq!(targets.url(Role::Default), Some("https://b.test/?pb=0"));
    }

    #[test]
    fn test_attempted_urls_missing_or_malformed_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(ATTEMPTED_URLS_FILE);
        assert_eq!(AttemptedUrls::load(&path), AttemptedUrls::default());
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AttemptedUrls::load(&path), AttemptedUrls::default());
        fs::write(&path, r#"{"preview":"https://p.test/"}"#).unwrap();
        let urls = AttemptedUrls::load(&path);
        assert_eq!(urls.get(Role::Preview), Some("https://p.test/"));
        assert_eq!(urls.get(Role::Default), None);
    }
}
