//! Error types for the scan and comment stages.
//!
//! Only failures to write required output files surface as `Error`; scan
//! failures are captured as `ScanError` and turned into marker snapshots.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Fatal errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required output file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A marker or side file could not be serialized
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The PR body file passed on the command line could not be read
    #[error("failed to read PR body from {}: {source}", path.display())]
    ReadBody {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The async runtime used by the protection probe failed to start
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Failure of one external scanner invocation.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command} ({status})")]
    Exit { command: String, status: ExitStatus },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Write `contents` to `path`, mapping the io error to `Error::Write`.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| Error::write(path, e))
}

/// Serialize `value` as pretty JSON and write it to `path`.
pub fn write_json<T: serde::Serialize>(path: &Path, what: &'static str, value: &T) -> Result<()> {
    let s =
        serde_json::to_string_pretty(value).map_err(|source| Error::Serialize { what, source })?;
    write_file(path, &s)
}
