//! Preview/live URL resolution from a PR body.
//!
//! The first extracted URL carrying a preview marker becomes the preview
//! target. The live target is derived from it with a `BaselineStrategy`.
//! Both get `pb=0` appended so the theme preview banner is not scanned.

use crate::extract::{find_preview_candidate, UrlExtractor};
use crate::models::{ResolvedTargets, Role, ScanTarget};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

pub const PREVIEW_PARAM: &str = "preview_theme_id";
pub const BANNER_PARAM: &str = "pb";

pub fn default_preview_markers() -> Vec<String> {
    vec![format!("{PREVIEW_PARAM}="), "shopifypreview.com".to_string()]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
/// How the live URL is derived from the preview URL.
pub enum BaselineStrategy {
    /// Keep every preview query parameter, then drop `preview_theme_id` for live
    #[default]
    StripParam,
    /// Keep only `preview_theme_id` for preview; live is `live_origin` + preview path
    OriginPath,
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub markers: Vec<String>,
    pub strategy: BaselineStrategy,
    pub live_origin: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            markers: default_preview_markers(),
            strategy: BaselineStrategy::default(),
            live_origin: None,
        }
    }
}

/// Resolve scan targets from `body`. No preview candidate yields empty targets.
pub fn resolve(body: &str, extractor: &dyn UrlExtractor, opts: &ResolveOptions) -> ResolvedTargets {
    let urls = extractor.extract(body);
    debug!(?urls, "urls found in body");

    let mut registry = UrlsToTest::new();
    let Some(raw) = find_preview_candidate(&urls, &opts.markers) else {
        debug!("no preview url found in body");
        return registry.finish();
    };
    debug!(raw, "raw preview url");

    let preview = clean_preview_url(trim_trailing_punctuation(raw), opts.strategy);
    let live = preview
        .as_deref()
        .and_then(|p| derive_live_url(p, opts.strategy, opts.live_origin.as_deref()));
    debug!(?preview, ?live, "resolved urls");

    if let Some(p) = preview.as_deref() {
        registry.register(Role::Preview, p);
    }
    if let Some(l) = live.as_deref() {
        registry.register(Role::Default, l);
    }
    registry.finish()
}

/// Rebuild the preview URL from origin and path plus the query parameters
/// the strategy keeps. Returns `None` when `raw` does not parse.
pub fn clean_preview_url(raw: &str, strategy: BaselineStrategy) -> Option<String> {
    let parsed = match Url::parse(raw) {
        Ok(u) => u,
        Err(e) => {
            warn!("Invalid preview URL: {raw}");
            debug!(url = raw, error = %e, "error parsing preview url");
            return None;
        }
    };
    let base = format!("{}{}", parsed.origin().ascii_serialization(), parsed.path());
    let mut clean = match Url::parse(&base) {
        Ok(u) => u,
        Err(e) => {
            warn!("Invalid preview URL: {raw}");
            debug!(url = raw, error = %e, "preview url has no usable origin");
            return None;
        }
    };
    match strategy {
        BaselineStrategy::StripParam => {
            let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
            if !pairs.is_empty() {
                clean.query_pairs_mut().extend_pairs(pairs);
            }
        }
        BaselineStrategy::OriginPath => {
            if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == PREVIEW_PARAM) {
                clean.query_pairs_mut().append_pair(PREVIEW_PARAM, &id);
            }
        }
    }
    Some(clean.to_string())
}

/// Derive the live URL from a cleaned preview URL.
pub fn derive_live_url(
    preview: &str,
    strategy: BaselineStrategy,
    live_origin: Option<&str>,
) -> Option<String> {
    let parsed = match Url::parse(preview) {
        Ok(u) => u,
        Err(e) => {
            debug!(error = %e, "error deriving live url");
            return None;
        }
    };
    match strategy {
        BaselineStrategy::StripParam => {
            // Nothing to strip means live would just be the preview again
            if !parsed.query_pairs().any(|(k, _)| k == PREVIEW_PARAM) {
                debug!(preview, "preview url has no {PREVIEW_PARAM}; no live url");
                return None;
            }
            Some(without_param(parsed, PREVIEW_PARAM))
        }
        BaselineStrategy::OriginPath => {
            let Some(origin) = live_origin.map(str::trim).filter(|o| !o.is_empty()) else {
                debug!("origin-path strategy without live origin; no live url");
                return None;
            };
            Some(format!("{}{}", origin.trim_end_matches('/'), parsed.path()))
        }
    }
}

/// Remove every occurrence of `param`; an emptied query is dropped entirely.
fn without_param(mut url: Url, param: &str) -> String {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.set_query(None);
    if !kept.is_empty() {
        url.query_pairs_mut().extend_pairs(kept);
    }
    url.to_string()
}

/// Append `pb=0` unless a `pb` parameter is already present.
pub fn with_banner_param(url: &str) -> String {
    let present = Url::parse(url)
        .map(|u| u.query_pairs().any(|(k, _)| k == BANNER_PARAM))
        .unwrap_or(false);
    if present {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{BANNER_PARAM}=0")
}

/// Display form of a URL: `pb` removed, no dangling `?`.
pub fn strip_banner_param(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => without_param(u, BANNER_PARAM).trim_end_matches('?').to_string(),
        Err(_) => url.to_string(),
    }
}

pub fn trim_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches([')', ',', '.'])
}

/// Accumulates one URL per role; later registrations for a role are no-ops.
#[derive(Debug, Default)]
pub struct UrlsToTest {
    entries: Vec<ScanTarget>,
}

impl UrlsToTest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `url` for `role`. Returns true when the url was accepted.
    pub fn register(&mut self, role: Role, url: &str) -> bool {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            debug!(role = role.key(), reason = "empty", "skipping url");
            return false;
        }
        if self.entries.iter().any(|e| e.role == role) {
            debug!(role = role.key(), url, reason = "already exists", "skipping url");
            return false;
        }
        let clean = trim_trailing_punctuation(trimmed);
        if Url::parse(clean).is_err() {
            warn!("Invalid URL for {}: {clean}", role.key());
            return false;
        }
        let final_url = with_banner_param(clean);
        debug!(
            role = role.key(),
            original = url,
            clean,
            final_url = %final_url,
            "added url to test"
        );
        self.entries.push(ScanTarget {
            role,
            url: final_url,
        });
        true
    }

    pub fn finish(self) -> ResolvedTargets {
        ResolvedTargets::from_vec(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RegexExtractor;

    fn resolve_body(body: &str, opts: &ResolveOptions) -> ResolvedTargets {
        resolve(body, &RegexExtractor, opts)
    }

    #[test]
    fn test_resolve_strip_param_keeps_query_and_derives_live() {
        let body =
            "Check it out: https://shop.test/collections/all?preview_theme_id=123&variant=9#top";
        let targets = resolve_body(body, &ResolveOptions::default());
        assert_eq!(
            targets.url(Role::Preview),
            Some("https://shop.test/collections/all?preview_theme_id=123&variant=9&pb=0")
        );
        assert_eq!(
            targets.url(Role::Default),
            Some("https://shop.test/collections/all?variant=9&pb=0")
        );
    }

    #[test]
    fn test_resolve_only_preview_param_drops_query_for_live() {
        let body = "https://shop.test/?preview_theme_id=5.";
        let targets = resolve_body(body, &ResolveOptions::default());
        assert_eq!(targets.url(Role::Preview), Some("https://shop.test/?preview_theme_id=5&pb=0"));
        assert_eq!(targets.url(Role::Default), Some("https://shop.test/?pb=0"));
    }

    #[test]
    fn test_resolve_origin_path_strategy() {
        let opts = ResolveOptions {
            strategy: BaselineStrategy::OriginPath,
            live_origin: Some("https://live.test/".into()),
            ..ResolveOptions::default()
        };
        let body = "https://abc.shopifypreview.com/products/x?preview_theme_id=7&utm=1";
        let targets = resolve_body(body, &opts);
        assert_eq!(
            targets.url(Role::Preview),
            Some("https://abc.shopifypreview.com/products/x?preview_theme_id=7&pb=0")
        );
        assert_eq!(targets.url(Role::Default), Some("https://live.test/products/x?pb=0"));
    }

    #[test]
    fn test_resolve_origin_path_without_origin_has_no_live() {
        let opts = ResolveOptions {
            strategy: BaselineStrategy::OriginPath,
            ..ResolveOptions::default()
        };
        let targets = resolve_body("https://shop.test/?preview_theme_id=1", &opts);
        assert!(targets.get(Role::Preview).is_some());
        assert!(targets.get(Role::Default).is_none());
    }

    #[test]
    fn test_resolve_host_only_preview_has_no_live() {
        let body = "Preview: https://abc123.shopifypreview.com/products/x";
        let targets = resolve_body(body, &ResolveOptions::default());
        assert_eq!(
            targets.url(Role::Preview),
            Some("https://abc123.shopifypreview.com/products/x?pb=0")
        );
        assert_eq!(targets.url(Role::Default), None);
        assert_eq!(targets.len(), 1);
        assert_eq!(
            derive_live_url(
                "https://abc123.shopifypreview.com/products/x?utm=1",
                BaselineStrategy::StripParam,
                None
            ),
            None
        );
    }

    #[test]
    fn test_resolve_without_marker_is_empty() {
        let targets = resolve_body("see https://example.test/page", &ResolveOptions::default());
        assert!(targets.is_empty());
    }

    #[test]
    fn test_register_keeps_first_per_role() {
        let mut reg = UrlsToTest::new();
        assert!(reg.register(Role::Preview, "https://first.test/"));
        assert!(!reg.register(Role::Preview, "https://second.test/"));
        assert!(!reg.register(Role::Preview, "not a url"));
        let targets = reg.finish();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.url(Role::Preview), Some("https://first.test/?pb=0"));
    }

    #[test]
    fn test_register_skips_empty_and_invalid() {
        let mut reg = UrlsToTest::new();
        assert!(!reg.register(Role::Default, "   "));
        assert!(!reg.register(Role::Default, "::not-a-url"));
        assert!(reg.register(Role::Default, " https://ok.test/path), "));
        assert_eq!(reg.finish().url(Role::Default), Some("https://ok.test/path?pb=0"));
    }

    #[test]
    fn test_with_banner_param_separator_and_idempotence() {
        assert_eq!(with_banner_param("https://a.test/"), "https://a.test/?pb=0");
        assert_eq!(with_banner_param("https://a.test/?x=1"), "https://a.test/?x=1&pb=0");
        assert_eq!(with_banner_param("https://a.test/?pb=0"), "https://a.test/?pb=0");
        let once = with_banner_param("https://a.test/?x=1");
        assert_eq!(with_banner_param(&once), once);
    }

    #[test]
    fn test_strip_banner_param_for_display() {
        assert_eq!(strip_banner_param("https://a.test/?pb=0"), "https://a.test/");
        assert_eq!(
            strip_banner_param("https://a.test/p?preview_theme_id=1&pb=0"),
            "https://a.test/p?preview_theme_id=1"
        );
        assert_eq!(strip_banner_param("garbage"), "garbage");
    }

    #[test]
    fn test_clean_preview_invalid_is_none() {
        assert_eq!(clean_preview_url("https://", BaselineStrategy::StripParam), None);
    }
}
