//! axe-comment core library.
//!
//! This crate exposes the two pipeline stages used by the CI action: scanning
//! a theme preview URL (and its live counterpart) with axe, and rendering
//! the resulting snapshots as a Markdown PR comment.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `extract`: URL extraction from free-form text.
//! - `resolve`: Preview/live URL resolution and the per-role URL registry.
//! - `probe`: Password-protection probe for the live URL.
//! - `scan`: Scanner trait, axe-cli invocation, and the scan driver.
//! - `snapshot`: Snapshot loading and shape normalization.
//! - `diff`: Flattening, baseline diffing, and severity ordering.
//! - `render`: Markdown comment rendering.
//! - `models`: Data models for snapshots, targets, and violations.
//! - `output`: Human/JSON console printers.
//! - `logging`, `error`, `utils`: Supporting pieces.
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod render;
pub mod resolve;
pub mod scan;
pub mod snapshot;
pub mod utils;
