//! Markdown rendering of the PR comment.
//!
//! Body precedence:
//! 1. live snapshot protected: protection notice only
//! 2. preview snapshot unavailable: "not generated" notice with hints
//! 3. preview snapshot protected: preview protection notice
//! 4. otherwise: summary counts and collapsible violation tables

use crate::diff::{flatten, new_violations, sort_by_impact};
use crate::error::{write_file, Result};
use crate::models::target::ATTEMPTED_URLS_FILE;
use crate::models::{AttemptedUrls, FlattenedViolation, Role, Snapshot};
use crate::resolve::strip_banner_param;
use crate::snapshot::load_snapshot;
use serde_json::Value as Json;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const COMMENT_FILE: &str = "axe-comment.md";
pub const TITLE: &str = "### 🧪 Axe Accessibility Report\n\n";

/// Load both snapshots from `dir`, render, and write `axe-comment.md`.
pub fn write_comment(dir: &Path) -> Result<PathBuf> {
    let preview = load_snapshot(&dir.join(Role::Preview.report_file()));
    let baseline = load_snapshot(&dir.join(Role::Default.report_file()));
    let attempted = AttemptedUrls::load(&dir.join(ATTEMPTED_URLS_FILE));
    debug!(
        preview_url = ?preview.report().and_then(|r| r.url.as_deref()),
        baseline_url = ?baseline.report().and_then(|r| r.url.as_deref()),
        attempted_preview = ?attempted.preview,
        attempted_default = ?attempted.default,
        preview_protected = preview.is_protected(),
        baseline_protected = baseline.is_protected(),
        "report files status"
    );
    let md = render_comment(&preview, &baseline, &attempted);
    let out = dir.join(COMMENT_FILE);
    write_file(&out, &md)?;
    debug!(output_length = md.len(), path = %out.display(), "comment written");
    Ok(out)
}

pub fn render_comment(
    preview: &Snapshot,
    baseline: &Snapshot,
    attempted: &AttemptedUrls,
) -> String {
    let mut out = String::from(TITLE);
    if baseline.is_protected() {
        out.push_str("🔒 Site is password protected.\n\n");
        out.push_str(
            "Accessibility tests cannot be run because the live URL redirects to a password protection page.",
        );
        return out;
    }
    match preview {
        Snapshot::Protected { .. } => {
            out.push_str("🔒 Preview site is password protected.\n\n");
            out.push_str(
                "Accessibility tests cannot be run because the preview URL redirects to a password protection page.",
            );
        }
        Snapshot::Normal(report) => {
            let current = flatten(&report.violations);
            let preview_url = display_url(report.url.as_deref(), attempted.get(Role::Preview));
            match baseline.report() {
                Some(base) => {
                    let previous = flatten(&base.violations);
                    let live_url = display_url(base.url.as_deref(), attempted.get(Role::Default));
                    let new = new_violations(&current, &previous);
                    let _ = writeln!(out, "- {} new violations found compared to live", new.len());
                    let _ = writeln!(
                        out,
                        "- {} violations found on the preview url (`{}`)",
                        current.len(),
                        preview_url
                    );
                    let _ = writeln!(
                        out,
                        "- {} violations found on the live url (`{}`)",
                        previous.len(),
                        live_url
                    );
                    out.push_str(&violations_table(
                        "⚠️ New violations compared to live",
                        &sort_by_impact(new),
                    ));
                    out.push_str(&violations_table(
                        "🔗 All preview link violations",
                        &sort_by_impact(current),
                    ));
                    out.push_str(&violations_table(
                        "🧪 All live violations",
                        &sort_by_impact(previous),
                    ));
                }
                None => {
                    let _ = writeln!(
                        out,
                        "- {} violations found on the preview url (`{}`)\n",
                        current.len(),
                        preview_url
                    );
                    out.push_str(&violations_table(
                        "🔗 All preview violations",
                        &sort_by_impact(current),
                    ));
                }
            }
        }
        _ => out.push_str(&not_generated(preview, baseline, attempted)),
    }
    out
}

fn not_generated(preview: &Snapshot, baseline: &Snapshot, attempted: &AttemptedUrls) -> String {
    let live_missing = baseline.report().is_none();
    let mut out = String::new();
    if live_missing {
        out.push_str("Preview and live reports were not generated.\n");
    } else {
        out.push_str("Preview report was not generated.\n");
    }
    out.push_str("- ❌ Preview report\n");
    push_attempt_details(&mut out, preview, attempted.get(Role::Preview));
    out.push_str("  - Ensure a preview URL with `preview_theme_id` was included in the PR body\n");
    out.push_str("  - Try rerunning the action\n");
    out.push_str("  - Try making the preview URL more prominent (removing markdown)\n");
    out.push_str("  - Check the action logs for more details\n");
    if live_missing {
        out.push_str("- ❌ Live report\n");
        push_attempt_details(&mut out, baseline, attempted.get(Role::Default));
    }
    out
}

fn push_attempt_details(out: &mut String, snapshot: &Snapshot, attempted: Option<&str>) {
    if let Some(url) = attempted {
        let _ = writeln!(out, "  - URL used: `{url}`");
    }
    if let Some(msg) = snapshot.error_message() {
        let _ = writeln!(out, "  - Error: `{}`", single_line(msg));
    }
}

/// Attempted URL wins over the snapshot URL; `pb` is stripped either way.
fn display_url(report_url: Option<&str>, attempted: Option<&str>) -> String {
    attempted
        .or(report_url)
        .map(strip_banner_param)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Collapsible table; empty input renders nothing.
pub fn violations_table(title: &str, violations: &[FlattenedViolation]) -> String {
    if violations.is_empty() {
        return String::new();
    }
    let mut table = String::from("<details>");
    let _ = write!(table, "<summary>{title}</summary>\n\n");
    table.push_str("| Issue | Target | Summary |\n");
    table.push_str("|-------|--------|---------|\n");
    for v in violations {
        let summary = v
            .reasons
            .iter()
            .map(|r| format!("- {}", cell(r)))
            .collect::<Vec<_>>()
            .join("<br>");
        let _ = writeln!(
            table,
            "| {} [{}]({}) | `{}` | {} |",
            v.impact.glyph(),
            cell(&v.help),
            v.help_url,
            locator(&v.target),
            summary
        );
    }
    table.push_str("</details>\n\n");
    table
}

/// Comma-joined selector list, or `n/a` when the target is not an array.
fn locator(target: &Json) -> String {
    match target {
        Json::Array(parts) => parts.iter().map(selector).collect::<Vec<_>>().join(", "),
        _ => "n/a".to_string(),
    }
}

fn selector(part: &Json) -> String {
    match part {
        Json::String(s) => cell(s),
        Json::Array(inner) => inner.iter().map(selector).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Keep a value inside one table cell.
fn cell(s: &str) -> String {
    single_line(s).replace('|', "\\|")
}

fn single_line(s: &str) -> String {
    s.split(['\r', '\n']).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Impact;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(id: &str, impact: Impact) -> FlattenedViolation {
        FlattenedViolation {
            id: id.into(),
            help: "Images must have alternate text".into(),
            help_url: "https://rules.test/image-alt".into(),
            impact,
            target: json!(["img.hero", "div > img"]),
            reasons: vec!["No alt".into(), "Role is not presentation".into()],
        }
    }

    #[test]
    fn test_violations_table_row_format() {
        let out = violations_table("T", &[record("image-alt", Impact::Critical)]);
        assert_eq!(
            out,
            "<details><summary>T</summary>\n\n\
             | Issue | Target | Summary |\n\
             |-------|--------|---------|\n\
             | ❗️ [Images must have alternate text](https://rules.test/image-alt) | `img.hero, div > img` | - No alt<br>- Role is not presentation |\n\
             </details>\n\n"
        );
    }

    #[test]
    fn test_empty_table_is_omitted() {
        assert_eq!(violations_table("T", &[]), "");
    }

    #[test]
    fn test_locator_non_array_is_na() {
        assert_eq!(locator(&json!("img")), "n/a");
        assert_eq!(locator(&Json::Null), "n/a");
        assert_eq!(locator(&json!([["#host", "button"], "a|b"])), "#host,button, a\\|b");
    }

    #[test]
    fn test_display_url_prefers_attempted_and_strips_banner() {
        assert_eq!(
            display_url(Some("https://r.test/?pb=0"), Some("https://a.test/?x=1&pb=0")),
            "https://a.test/?x=1"
        );
        assert_eq!(display_url(Some("https://r.test/?pb=0"), None), "https://r.test/");
        assert_eq!(display_url(None, None), "unknown");
    }

    #[test]
    fn test_preview_protected_notice() {
        let out = render_comment(
            &Snapshot::Protected { url: None },
            &Snapshot::Absent,
            &AttemptedUrls::default(),
        );
        assert!(out.contains("Preview site is password protected"));
        assert!(!out.contains("<details>"));
    }

    #[test]
    fn test_preview_scan_error_is_reported() {
        let preview = Snapshot::ScanError {
            url: Some("https://p.test/?pb=0".into()),
            message: "Command failed: axe\nexit 1".into(),
        };
        let attempted = AttemptedUrls {
            preview: Some("https://p.test/?pb=0".into()),
            default: None,
        };
        let base = Snapshot::Normal(Default::default());
        let out = render_comment(&preview, &base, &attempted);
        assert!(out.starts_with(TITLE));
        assert!(out.contains("Preview report was not generated.\n"));
        assert!(out.contains("  - URL used: `https://p.test/?pb=0`\n"));
        assert!(out.contains("  - Error: `Command failed: axe exit 1`\n"));
        assert!(!out.contains("Live report"));
    }
}
