//! texforge: LaTeX documents from parameterized templates.
//!
//! # Usage
//!
//! ```text
//! texforge list [-t DIR]
//! texforge info <name> [-t DIR]
//! texforge init [-t DIR] [--force]
//! texforge generate <name> <output> [-v FILE] [--set key=value]... [--overwrite] [--validate] [--compile]
//! texforge compile <file.tex> [--engine E]... [--fallback] [--timeout SECS] [--open]
//! texforge assets list|import|import-dir
//! texforge wizard [-t DIR]
//! ```

mod commands;
mod prompt;
mod values;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    assets::AssetsCommand, compile::CompileArgs, generate::GenerateArgs, info::InfoArgs,
    init::InitArgs, list::ListArgs, wizard::WizardArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "texforge",
    version,
    about = "Generate LaTeX documents from templates and compile them to PDF",
    long_about = None,
)]
struct Cli {
    /// More log output on stderr (repeat for debug). RUST_LOG overrides.
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the templates in the template directory.
    List(ListArgs),

    /// Show a template's metadata and fields.
    Info(InfoArgs),

    /// Write the example template into the template directory.
    Init(InitArgs),

    /// Render a template with values from a file and the command line.
    Generate(GenerateArgs),

    /// Compile a .tex file to PDF with an external engine.
    Compile(CompileArgs),

    /// Manage fonts and images under assets/.
    Assets {
        #[command(subcommand)]
        command: AssetsCommand,
    },

    /// Interactive document creation.
    Wizard(WizardArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::List(args) => args.run(),
        Commands::Info(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Generate(args) => args.run(),
        Commands::Compile(args) => args.run(),
        Commands::Assets { command } => commands::assets::run(command),
        Commands::Wizard(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
