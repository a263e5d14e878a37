//! axe-comment CLI binary entry point.
//! Delegates to the library for resolve/scan/comment and prints results.

use axe_comment::cli::{Cli, Commands, CommonOpts, ResolveOpts};
use axe_comment::config::{self, Effective, Overrides};
use axe_comment::error::{Error, Result};
use axe_comment::extract::RegexExtractor;
use axe_comment::models::{ResolvedTargets, Role};
use axe_comment::scan::AxeCli;
use axe_comment::{logging, output, probe, render, resolve, scan, utils};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

fn main() {
    let cli = Cli::parse();
    let result = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Resolve { common, resolve } => {
            let eff = effective(&common, &resolve, Overrides::default());
            run_resolve(&eff, &resolve)
        }
        Commands::Scan {
            common,
            resolve,
            axe,
            chromedriver_path,
            browser_driver_output,
        } => {
            let eff = effective(
                &common,
                &resolve,
                Overrides {
                    axe,
                    chromedriver_path,
                    browser_driver_output,
                    ..Overrides::default()
                },
            );
            run_scan(&eff, &resolve)
        }
        Commands::Comment { common } => {
            let eff = effective(&common, &ResolveOpts::default(), Overrides::default());
            run_comment(&eff)
        }
    };
    if let Err(e) = result {
        eprintln!("{} {}", utils::error_prefix(), e);
        std::process::exit(2);
    }
}

/// Install logging, then merge CLI flags into the discovered config.
fn effective(common: &CommonOpts, resolve: &ResolveOpts, mut ov: Overrides) -> Effective {
    logging::init(common.debug || config::debug_from_env());
    ov.dir = common.dir.clone();
    ov.output = common.output.clone();
    ov.strategy = resolve.strategy;
    ov.live_origin = resolve.live_origin.clone();
    let eff = config::resolve_effective(&ov);
    if !eff.config_found {
        debug!(root = %eff.config_root.display(), "no axe-comment config found; using defaults");
    }
    eff
}

/// `--body-file` wins over `--body`/`PR_BODY`; no body at all is empty text.
fn read_body(opts: &ResolveOpts) -> Result<String> {
    if let Some(file) = opts.body_file.as_deref() {
        return fs::read_to_string(file).map_err(|source| Error::ReadBody {
            path: PathBuf::from(file),
            source,
        });
    }
    Ok(opts.body.clone().unwrap_or_default())
}

fn resolve_targets(eff: &Effective, opts: &ResolveOpts) -> Result<ResolvedTargets> {
    let body = read_body(opts)?;
    let head: String = body.chars().take(200).collect();
    debug!(
        body = %head,
        truncated = body.chars().count() > 200,
        event = ?std::env::var("GITHUB_EVENT_NAME").ok(),
        "pr body"
    );
    Ok(resolve::resolve(&body, &RegexExtractor, &eff.resolve))
}

fn run_resolve(eff: &Effective, opts: &ResolveOpts) -> Result<()> {
    let targets = resolve_targets(eff, opts)?;
    output::print_resolved(&targets, &eff.output);
    Ok(())
}

fn run_scan(eff: &Effective, opts: &ResolveOpts) -> Result<()> {
    let targets = resolve_targets(eff, opts)?;
    if eff.output != "json" || targets.is_empty() {
        output::print_resolved(&targets, &eff.output);
    }
    if targets.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(&eff.dir).map_err(|e| Error::write(&eff.dir, e))?;
    scan::write_attempted_urls(&eff.dir, &targets)?;

    let protected = probe_live(eff, &targets)?;
    match eff.chromedriver_path.as_deref() {
        Some(p) => debug!(path = %p.display(), "using chromedriver path"),
        None => debug!("no chromedriver path configured"),
    }
    let scanner = AxeCli {
        program: eff.axe_command.clone(),
    };
    let outcome = scan::run_scans(
        &eff.dir,
        &targets,
        protected,
        &scanner,
        eff.chromedriver_path.as_deref(),
    )?;
    output::print_scan(&outcome, &eff.output);
    Ok(())
}

/// Probe the live URL, if any, before any scan is dispatched.
fn probe_live(eff: &Effective, targets: &ResolvedTargets) -> Result<bool> {
    let Some(live) = targets.get(Role::Default) else {
        return Ok(false);
    };
    if eff.output != "json" {
        println!(
            "{} Checking if live URL is password protected...",
            utils::info_prefix()
        );
    }
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;
    Ok(rt.block_on(probe::is_password_protected(&live.url, eff.probe_timeout)))
}

fn run_comment(eff: &Effective) -> Result<()> {
    let preview = eff.dir.join(Role::Preview.report_file());
    if !preview.exists() {
        eprintln!(
            "{} ❌ No {} file found",
            utils::error_prefix(),
            preview.to_string_lossy()
        );
    }
    let path = render::write_comment(&eff.dir)?;
    output::print_comment(&path, &eff.output);
    Ok(())
}
