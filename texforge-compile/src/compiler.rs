//! Engine fallback.
//!
//! [`Compiler::compile`] tries each engine in order and stops at the first
//! one that exits successfully. Missing binaries, failures and timeouts are
//! all recorded as [`Attempt`]s; the error returned when every engine fails
//! depends on how the last attempt ended.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::EngineKind;
use crate::error::CompileError;
use crate::runner::{CommandRunner, Exit, RunOutput, SystemRunner};

/// Per-engine timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Lines of engine output kept for error reports.
const LOG_TAIL_LINES: usize = 20;

/// How one engine run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Succeeded,
    /// Exited non-zero (or by signal). `log` is the tail of stderr, or of
    /// stdout when stderr was empty.
    Failed { code: Option<i32>, log: String },
    TimedOut { after: Duration },
    NotFound,
}

/// One engine that was tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub engine: EngineKind,
    pub result: AttemptResult,
}

/// A successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    /// The engine that produced the PDF.
    pub engine: EngineKind,
    pub pdf_path: PathBuf,
    /// Every attempt in order, ending with the successful one.
    pub attempts: Vec<Attempt>,
}

/// Compiles `.tex` files through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct Compiler<R = SystemRunner> {
    runner: R,
    timeout: Duration,
}

impl Compiler<SystemRunner> {
    pub fn new() -> Self {
        Compiler::with_runner(SystemRunner::new())
    }
}

impl Default for Compiler<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Compiler<R> {
    pub fn with_runner(runner: R) -> Self {
        Compiler {
            runner,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-engine timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Compile `source` with the first engine in `engines` that succeeds.
    pub fn compile(&self, source: &Path, engines: &[EngineKind]) -> Result<CompileOutcome, CompileError> {
        if !source.is_file() {
            return Err(CompileError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        if engines.is_empty() {
            return Err(CompileError::NoEngines);
        }

        let mut attempts = Vec::with_capacity(engines.len());
        for engine in engines {
            let invocation = engine.invocation(source);
            tracing::info!("compiling {} with {engine}", source.display());

            let result = match self.runner.run(&invocation, self.timeout) {
                Ok(output) => classify(&output, self.timeout),
                Err(err) if err.kind() == ErrorKind::NotFound => AttemptResult::NotFound,
                Err(err) => AttemptResult::Failed {
                    code: None,
                    log: err.to_string(),
                },
            };

            match &result {
                AttemptResult::Succeeded => {
                    tracing::info!("{engine} succeeded");
                    attempts.push(Attempt {
                        engine: engine.clone(),
                        result,
                    });
                    return Ok(CompileOutcome {
                        engine: engine.clone(),
                        pdf_path: source.with_extension("pdf"),
                        attempts,
                    });
                }
                AttemptResult::Failed { code, .. } => {
                    tracing::warn!("{engine} failed (exit code {code:?}), trying next engine")
                }
                AttemptResult::TimedOut { after } => {
                    tracing::warn!("{engine} timed out after {after:?}, trying next engine")
                }
                AttemptResult::NotFound => {
                    tracing::warn!("{engine} not found on PATH, trying next engine")
                }
            }
            attempts.push(Attempt {
                engine: engine.clone(),
                result,
            });
        }

        Err(all_failed(attempts))
    }
}

fn classify(output: &RunOutput, timeout: Duration) -> AttemptResult {
    match output.exit {
        Exit::TimedOut => AttemptResult::TimedOut { after: timeout },
        exit if exit.success() => AttemptResult::Succeeded,
        Exit::Code(code) => {
            let log = if output.stderr.trim().is_empty() {
                &output.stdout
            } else {
                &output.stderr
            };
            AttemptResult::Failed {
                code,
                log: tail(log, LOG_TAIL_LINES),
            }
        }
    }
}

fn all_failed(attempts: Vec<Attempt>) -> CompileError {
    let attempted: Vec<String> = attempts.iter().map(|a| a.engine.to_string()).collect();
    match attempts.last() {
        Some(Attempt {
            engine,
            result: AttemptResult::TimedOut { after },
        }) => CompileError::Timeout {
            engine: engine.to_string(),
            after: *after,
            attempted,
        },
        Some(Attempt { engine, result }) => CompileError::AllEnginesFailed {
            last_stderr: match result {
                AttemptResult::Failed { log, .. } => log.clone(),
                _ => format!("{engine}: program not found"),
            },
            attempted,
        },
        None => CompileError::NoEngines,
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
