//! URL extraction from free-form PR text.
//!
//! Extraction sits behind `UrlExtractor` so a stricter parser can replace the
//! regex without touching the resolver.

use once_cell::sync::Lazy;
use regex::Regex;

/// Stops at whitespace and closing brackets so markdown links stay clean.
const URL_PATTERN: &str = r"https?://[^\s)\]}]+";

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(URL_PATTERN).expect("URL_PATTERN is a valid regex"));

/// Pulls candidate URLs out of a text blob, in order of appearance.
pub trait UrlExtractor {
    fn extract(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RegexExtractor;

impl UrlExtractor for RegexExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        URL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// First URL containing any of `markers`.
pub fn find_preview_candidate<'a>(urls: &'a [String], markers: &[String]) -> Option<&'a str> {
    urls.iter()
        .map(String::as_str)
        .find(|u| markers.iter().any(|m| !m.is_empty() && u.contains(m.as_str())))
}
