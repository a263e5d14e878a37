//! Configuration discovery and effective settings resolution.
//!
//! axe-comment reads `axe-comment.toml|yaml|yml` from the working directory
//! (or closest ancestor) and merges it with CLI flags and environment input
//! to produce an `Effective` config.
//! Defaults:
//! - `dir`: `.`
//! - `output`: `human`
//! - `resolve.strategy`: `strip-param`
//! - `resolve.preview_markers`: `["preview_theme_id=", "shopifypreview.com"]`
//! - `scan.command`: `axe`
//! - `scan.probe_timeout_secs`: 10
//!
//! Overrides precedence: CLI > environment > config file > defaults.

use crate::probe::PROBE_TIMEOUT;
use crate::resolve::{default_preview_markers, BaselineStrategy, ResolveOptions};
use crate::scan::driver_path_from_output;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILES: [&str; 3] = ["axe-comment.toml", "axe-comment.yaml", "axe-comment.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// URL resolution section under `[resolve]`.
pub struct ResolveCfg {
    pub strategy: Option<BaselineStrategy>,
    pub live_origin: Option<String>,
    pub preview_markers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Scanner section under `[scan]`.
pub struct ScanCfg {
    pub command: Option<String>,
    pub chromedriver_path: Option<String>,
    pub probe_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `axe-comment.toml|yaml`.
pub struct AxeCommentConfig {
    pub dir: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub resolve: Option<ResolveCfg>,
    #[serde(default)]
    pub scan: Option<ScanCfg>,
}

#[derive(Debug, Default, Clone)]
/// Values taken from the command line and the process environment.
pub struct Overrides {
    pub dir: Option<String>,
    pub output: Option<String>,
    pub strategy: Option<BaselineStrategy>,
    pub live_origin: Option<String>,
    pub axe: Option<String>,
    pub chromedriver_path: Option<String>,
    /// Raw `BROWSER_DRIVER_OUTPUT` text
    pub browser_driver_output: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub config_root: PathBuf,
    pub config_found: bool,
    pub dir: PathBuf,
    pub output: String,
    pub resolve: ResolveOptions,
    pub axe_command: String,
    pub chromedriver_path: Option<PathBuf>,
    pub probe_timeout: Duration,
}

/// Walk upward from `start` to the directory holding a config file or `.git`.
pub fn detect_config_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `AxeCommentConfig` from `axe-comment.toml` or `axe-comment.yaml|yml`.
pub fn load_config(root: &Path) -> Option<AxeCommentConfig> {
    let toml_path = root.join(CONFIG_FILES[0]);
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!(path = %toml_path.display(), error = %e, "ignoring invalid config");
                None
            }
        };
    }
    for yml in &CONFIG_FILES[1..] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "ignoring invalid config");
                    None
                }
            };
        }
    }
    None
}

/// `DEBUG=true` in the environment enables debug logging.
pub fn debug_from_env() -> bool {
    std::env::var("DEBUG").is_ok_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Resolve `Effective` by merging overrides, discovered config, and defaults.
pub fn resolve_effective(ov: &Overrides) -> Effective {
    match std::env::current_dir() {
        Ok(cwd) => resolve_effective_in(ov, &cwd),
        Err(e) => {
            tracing::debug!(error = %e, "current dir unavailable; using --dir as given");
            resolve_effective_in(ov, Path::new(""))
        }
    }
}

/// Like `resolve_effective`, with relative paths taken against `cwd`.
pub fn resolve_effective_in(ov: &Overrides, cwd: &Path) -> Effective {
    let start = absolute(Path::new(ov.dir.as_deref().unwrap_or(".")), cwd);
    let config_root = detect_config_root(&start);
    let loaded = load_config(&config_root);
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    let rcfg = cfg.resolve.clone().unwrap_or_default();
    let scfg = cfg.scan.clone().unwrap_or_default();

    // Config `dir` is relative to the config root
    let dir = match (&ov.dir, &cfg.dir) {
        (Some(d), _) => PathBuf::from(d),
        (None, Some(d)) => config_root.join(d),
        (None, None) => start.clone(),
    };

    let output = ov
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let resolve = ResolveOptions {
        markers: rcfg
            .preview_markers
            .filter(|m| !m.is_empty())
            .unwrap_or_else(default_preview_markers),
        strategy: ov.strategy.or(rcfg.strategy).unwrap_or_default(),
        live_origin: ov.live_origin.clone().or(rcfg.live_origin),
    };

    let axe_command = ov
        .axe
        .clone()
        .or(scfg.command)
        .unwrap_or_else(|| "axe".to_string());

    let chromedriver_path = ov
        .chromedriver_path
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| ov.browser_driver_output.as_deref().and_then(driver_path_from_output))
        .or_else(|| scfg.chromedriver_path.map(PathBuf::from));

    let probe_timeout = scfg
        .probe_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(PROBE_TIMEOUT);

    Effective {
        config_root,
        config_found,
        dir,
        output,
        resolve,
        axe_command,
        chromedriver_path,
        probe_timeout,
    }
}

/// `cwd.join(path)` with `.` components dropped, so `parent()` walks real ancestors.
fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let normalized: PathBuf = joined.components().collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
