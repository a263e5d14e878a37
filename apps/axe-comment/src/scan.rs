//! Scanner driver: runs the accessibility scanner once per resolved target.
//!
//! Scans run strictly one after another. A failed scan leaves an error
//! marker in the role's snapshot file so the comment stage always has
//! something to read. A protected live URL stops the run before any scan.

use crate::error::{write_json, Result, ScanError};
use crate::models::target::ATTEMPTED_URLS_FILE;
use crate::models::{Marker, ResolvedTargets, Role};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

static CHROMEDRIVER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"CHROMEDRIVER_TEST_PATH="([^"]+)""#)
        .expect("chromedriver pattern is a valid regex")
});

/// Runs one scan, writing its result to `save_path`.
pub trait Scanner {
    fn scan(
        &self,
        url: &str,
        save_path: &Path,
        driver_path: Option<&Path>,
    ) -> std::result::Result<(), ScanError>;
}

/// The `axe` command from `@axe-core/cli`.
#[derive(Debug, Clone)]
pub struct AxeCli {
    pub program: String,
}

impl Default for AxeCli {
    fn default() -> Self {
        AxeCli {
            program: "axe".to_string(),
        }
    }
}

impl AxeCli {
    /// Build the invocation. The child runs inside the report directory, so
    /// relative program and driver paths are anchored at `cwd` first.
    pub fn command(
        &self,
        url: &str,
        save_path: &Path,
        driver_path: Option<&Path>,
        cwd: &Path,
    ) -> Command {
        // axe-cli resolves --save against its working directory
        let dir = save_path.parent().filter(|p| !p.as_os_str().is_empty());
        let file = save_path.file_name().unwrap_or(save_path.as_os_str());
        let mut cmd = Command::new(program_path(&self.program, cwd));
        cmd.arg(url).arg("--save").arg(file);
        if let Some(p) = driver_path {
            cmd.arg("--chromedriver-path").arg(anchored(p, cwd));
        }
        if let Some(d) = dir {
            cmd.current_dir(anchored(d, cwd));
        }
        cmd
    }
}

impl Scanner for AxeCli {
    fn scan(
        &self,
        url: &str,
        save_path: &Path,
        driver_path: Option<&Path>,
    ) -> std::result::Result<(), ScanError> {
        let cwd = std::env::current_dir().unwrap_or_default();
        let mut cmd = self.command(url, save_path, driver_path, &cwd);
        debug!(command = ?cmd, "executing axe command");
        let status = cmd.status().map_err(|source| ScanError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(ScanError::Exit {
                command: format!("{cmd:?}"),
                status,
            })
        }
    }
}

fn anchored(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Bare program names stay as-is for `PATH` lookup.
fn program_path(program: &str, cwd: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.components().count() > 1 {
        anchored(path, cwd)
    } else {
        path.to_path_buf()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Scanner succeeded and the snapshot file exists
    Saved,
    /// Scanner succeeded but wrote no snapshot file
    Missing,
    /// Scanner failed; an error marker was written
    Failed,
    /// Not scanned because the live URL is protected
    Skipped,
    /// Live URL is protected; protection marker written
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub role: Role,
    pub url: String,
    pub report: String,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub baseline_protected: bool,
    pub results: Vec<ScanResult>,
}

/// Persist the role → URL map used for diagnostics in the comment stage.
pub fn write_attempted_urls(dir: &Path, targets: &ResolvedTargets) -> Result<PathBuf> {
    let path = dir.join(ATTEMPTED_URLS_FILE);
    write_json(&path, "attempted urls", &targets.to_json())?;
    Ok(path)
}

/// Scan every target in registration order.
///
/// `baseline_protected` is the probe result for the live target; when true
/// only marker files are written.
pub fn run_scans<S: Scanner + ?Sized>(
    dir: &Path,
    targets: &ResolvedTargets,
    baseline_protected: bool,
    scanner: &S,
    driver_path: Option<&Path>,
) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();

    if let (true, Some(live)) = (baseline_protected, targets.get(Role::Default)) {
        debug!(url = %live.url, "live url is password protected");
        let report = dir.join(Role::Default.report_file());
        write_json(&report, "protection marker", &Marker::protected(&live.url))?;
        outcome.baseline_protected = true;
        outcome.results.push(ScanResult {
            role: Role::Default,
            url: live.url.clone(),
            report: report.to_string_lossy().to_string(),
            status: ScanStatus::Protected,
            error: None,
        });
        if let Some(preview) = targets.get(Role::Preview) {
            let report = dir.join(Role::Preview.report_file());
            write_json(&report, "skipped marker", &Marker::skipped(&preview.url))?;
            outcome.results.push(ScanResult {
                role: Role::Preview,
                url: preview.url.clone(),
                report: report.to_string_lossy().to_string(),
                status: ScanStatus::Skipped,
                error: None,
            });
        }
        return Ok(outcome);
    }

    for target in targets.iter() {
        let report = dir.join(target.role.report_file());
        debug!(
            role = target.role.key(),
            url = %target.url,
            report = %report.display(),
            exists_before = report.exists(),
            "starting axe test"
        );
        let (status, error) = match scanner.scan(&target.url, &report, driver_path) {
            Ok(()) => {
                let exists = report.exists();
                if exists {
                    let len = fs::metadata(&report).map(|m| m.len()).unwrap_or(0);
                    debug!(report = %report.display(), content_length = len, "report file written");
                    (ScanStatus::Saved, None)
                } else {
                    debug!(report = %report.display(), "report file not found after axe execution");
                    (ScanStatus::Missing, None)
                }
            }
            Err(e) => {
                let message = e.to_string();
                debug!(
                    role = target.role.key(),
                    error = %message,
                    exists_after_error = report.exists(),
                    "error running axe test"
                );
                write_json(&report, "error marker", &Marker::failed(&target.url, &message))?;
                (ScanStatus::Failed, Some(message))
            }
        };
        outcome.results.push(ScanResult {
            role: target.role,
            url: target.url.clone(),
            report: report.to_string_lossy().to_string(),
            status,
            error,
        });
    }
    Ok(outcome)
}

/// Extract `CHROMEDRIVER_TEST_PATH="..."` from browser-driver-manager output.
pub fn driver_path_from_output(output: &str) -> Option<PathBuf> {
    let path = CHROMEDRIVER_RE
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| PathBuf::from(m.as_str()));
    if path.is_none() && !output.trim().is_empty() {
        let head: String = output.chars().take(500).collect();
        debug!(output = %head, "CHROMEDRIVER_TEST_PATH not found in output");
    }
    path
}
