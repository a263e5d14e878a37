//! Console output for the resolve, scan, and comment commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-target fields and a top-level summary.

use crate::models::{ResolvedTargets, Role};
use crate::scan::{ScanOutcome, ScanStatus};
use crate::utils::{error_prefix, note_prefix, use_colors, warn_prefix};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn json_mode(output: &str) -> bool {
    output == "json"
}

/// Print the resolved preview and live URLs.
pub fn print_resolved(targets: &ResolvedTargets, output: &str) {
    if json_mode(output) {
        println!("{}", pretty(&compose_resolved_json(targets)));
        return;
    }
    println!("Preview URL: {}", targets.url(Role::Preview).unwrap_or(""));
    println!("Live URL: {}", targets.url(Role::Default).unwrap_or(""));
    if targets.is_empty() {
        println!("No valid URLs found for accessibility testing.");
    }
}

/// Print one line per scanned target, then a summary line.
pub fn print_scan(outcome: &ScanOutcome, output: &str) {
    if json_mode(output) {
        println!("{}", pretty(&compose_scan_json(outcome)));
        return;
    }
    if outcome.baseline_protected {
        eprintln!(
            "{} Live URL is password protected, skipped all accessibility tests",
            warn_prefix()
        );
    }
    for r in &outcome.results {
        match r.status {
            ScanStatus::Saved => {
                if use_colors() {
                    println!("{} {} ({})", "Saved:".green().bold(), r.report, r.url);
                } else {
                    println!("Saved: {} ({})", r.report, r.url);
                }
            }
            ScanStatus::Missing => {
                eprintln!("{} ❌ Report file not created: {}", error_prefix(), r.report)
            }
            ScanStatus::Failed => eprintln!(
                "{} ❌ Error running axe on {}: {}",
                error_prefix(),
                r.role.key(),
                r.error.as_deref().unwrap_or("unknown error")
            ),
            ScanStatus::Skipped | ScanStatus::Protected => {
                println!("{} {} marker written: {}", note_prefix(), r.role.label(), r.report)
            }
        }
    }
    let summary = format!(
        "— Summary — saved={} failed={} missing={} total={}",
        count(outcome, ScanStatus::Saved),
        count(outcome, ScanStatus::Failed),
        count(outcome, ScanStatus::Missing),
        outcome.results.len()
    );
    if use_colors() {
        println!("{}", summary.bold());
    } else {
        println!("{}", summary);
    }
}

pub fn print_comment(path: &Path, output: &str) {
    if json_mode(output) {
        println!("{}", pretty(&json!({ "comment": path.to_string_lossy() })));
    } else {
        println!("✅ {} generated", path.to_string_lossy());
    }
}

fn count(outcome: &ScanOutcome, status: ScanStatus) -> usize {
    outcome.results.iter().filter(|r| r.status == status).count()
}

fn pretty(v: &JsonVal) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

/// Compose resolved-targets JSON (pure) for testing purposes.
pub fn compose_resolved_json(targets: &ResolvedTargets) -> JsonVal {
    json!({
        "urls": targets.to_json(),
        "total": targets.len(),
    })
}

/// Compose scan JSON (pure) for testing purposes.
pub fn compose_scan_json(outcome: &ScanOutcome) -> JsonVal {
    let summary = json!({
        "saved": count(outcome, ScanStatus::Saved),
        "failed": count(outcome, ScanStatus::Failed),
        "missing": count(outcome, ScanStatus::Missing),
        "total": outcome.results.len(),
        "baselineProtected": outcome.baseline_protected,
    });
    json!({ "results": outcome.results, "summary": summary })
}
