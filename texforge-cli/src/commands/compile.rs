//! `texforge compile <file.tex> [--engine E]... [--fallback] [--timeout SECS] [--open]`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use texforge_compile::{open_pdf, AttemptResult, Compiler, EngineKind};
use texforge_core::config::Settings;

/// Compile a .tex file to PDF.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// The .tex file to compile.
    pub file: PathBuf,

    #[command(flatten)]
    pub engines: EngineArgs,

    /// Open the PDF in the system viewer afterwards.
    #[arg(long)]
    pub open: bool,
}

/// Engine selection shared by `compile` and `generate --compile`.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Engine to use: tectonic, xelatex, pdflatex, lualatex or any program
    /// name. Repeat to try several in order.
    #[arg(long = "engine", short = 'e', value_name = "ENGINE")]
    pub engines: Vec<EngineKind>,

    /// After the named engines, try the configured fallback order.
    #[arg(long)]
    pub fallback: bool,

    /// Seconds each engine may run before it is killed.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl CompileArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings()?;
        compile_document(&settings, &self.file, &self.engines, self.open)?;
        Ok(())
    }
}

/// Compile `file` and report which engine produced the PDF.
pub fn compile_document(settings: &Settings, file: &Path, args: &EngineArgs, open: bool) -> Result<PathBuf> {
    let engines = super::engine_order(settings, &args.engines, args.fallback)?;
    let compiler = Compiler::new().with_timeout(super::compile_timeout(settings, args.timeout));

    println!("Compiling {} ...", file.display());
    let outcome = compiler
        .compile(file, &engines)
        .with_context(|| format!("failed to compile '{}'", file.display()))?;

    for attempt in &outcome.attempts {
        let note = match &attempt.result {
            AttemptResult::Succeeded => continue,
            AttemptResult::NotFound => "not installed".to_string(),
            AttemptResult::TimedOut { after } => format!("timed out after {}s", after.as_secs()),
            AttemptResult::Failed { code: Some(code), .. } => format!("exited with {code}"),
            AttemptResult::Failed { code: None, .. } => "failed".to_string(),
        };
        println!("  {} {}: {note}", "·".bright_black(), attempt.engine);
    }
    println!(
        "{} {} (via {})",
        "✓ Compiled".green(),
        outcome.pdf_path.display(),
        outcome.engine
    );

    if open {
        open_pdf(&outcome.pdf_path)?;
    }
    Ok(outcome.pdf_path)
}
