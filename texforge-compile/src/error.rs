//! Error types for texforge-compile.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// All errors that can arise while compiling or viewing a document.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The `.tex` file to compile does not exist.
    #[error("source file not found: {path}")]
    SourceMissing { path: PathBuf },

    /// No engine was given to try.
    #[error("no compilation engine specified")]
    NoEngines,

    /// An engine name that cannot be used as a program.
    #[error("invalid engine name '{name}'")]
    InvalidEngine { name: String },

    /// The last engine tried ran past the timeout and was killed.
    #[error(
        "{engine} timed out after {}s (tried: {})",
        .after.as_secs(),
        .attempted.join(", ")
    )]
    Timeout {
        engine: String,
        after: Duration,
        attempted: Vec<String>,
    },

    /// Every engine was tried and none produced a PDF.
    #[error("compilation failed with every engine (tried: {}){}", .attempted.join(", "), details(.last_stderr))]
    AllEnginesFailed {
        attempted: Vec<String>,
        last_stderr: String,
    },

    /// The platform PDF viewer could not be launched.
    #[error("cannot open {path}: {source}")]
    Viewer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn details(log: &str) -> String {
    let log = log.trim();
    if log.is_empty() {
        String::new()
    } else {
        format!("\n{log}")
    }
}
