//! `texforge assets list`, `texforge assets import <kind> <path>` and
//! `texforge assets import-dir <kind> <dir>`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use texforge_core::assets::{AssetKind, AssetManager, ImportOutcome};

/// Manage fonts and images under assets/.
#[derive(Subcommand, Debug)]
pub enum AssetsCommand {
    /// List imported fonts and images.
    List(RootArgs),

    /// Copy one font or image into assets/.
    Import(ImportArgs),

    /// Copy every font or image found in a directory.
    ImportDir(ImportArgs),
}

#[derive(Args, Debug)]
pub struct RootArgs {
    /// Project root holding assets/. Defaults to the configured root or ".".
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// font | image
    pub kind: AssetKindArg,

    /// File (import) or directory (import-dir) to copy from.
    pub path: PathBuf,

    /// Replace files that already exist in assets/.
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub root: RootArgs,
}

/// Thin wrapper so clap can parse [`AssetKind`].
#[derive(Debug, Clone, Copy)]
pub struct AssetKindArg(pub AssetKind);

impl FromStr for AssetKindArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "font" | "fonts" => Ok(Self(AssetKind::Font)),
            "image" | "images" => Ok(Self(AssetKind::Image)),
            other => Err(format!("unknown asset kind '{other}'; expected: font, image")),
        }
    }
}

impl fmt::Display for AssetKindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "format")]
    format: String,
    #[tabled(rename = "size")]
    size: String,
}

pub fn run(cmd: AssetsCommand) -> Result<()> {
    match cmd {
        AssetsCommand::List(args) => list(args),
        AssetsCommand::Import(args) => import(args, false),
        AssetsCommand::ImportDir(args) => import(args, true),
    }
}

fn manager(root: &RootArgs) -> Result<AssetManager> {
    let root = match &root.root {
        Some(dir) => dir.clone(),
        None => super::load_settings()?.assets_root(),
    };
    Ok(AssetManager::new(root))
}

fn list(args: RootArgs) -> Result<()> {
    print_assets(&manager(&args)?)
}

/// Table of everything under `assets/`, or a hint when it is empty.
pub fn print_assets(manager: &AssetManager) -> Result<()> {
    let entries = manager.list().context("failed to read assets")?;
    if entries.is_empty() {
        println!("No assets in {}.", manager.assets_dir().display());
        println!("Run: texforge assets import font <file>");
        return Ok(());
    }

    let rows: Vec<AssetRow> = entries
        .into_iter()
        .map(|e| AssetRow {
            kind: e.kind.to_string(),
            name: e.name,
            format: e.extension,
            size: format_size(e.size_bytes),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn import(args: ImportArgs, whole_dir: bool) -> Result<()> {
    let manager = manager(&args.root)?;
    let kind = args.kind.0;
    let outcomes = if whole_dir {
        manager
            .import_dir(kind, &args.path, args.overwrite)
            .with_context(|| format!("failed to import {kind}s from '{}'", args.path.display()))?
    } else {
        vec![manager
            .import(kind, &args.path, args.overwrite)
            .with_context(|| format!("failed to import '{}'", args.path.display()))?]
    };

    if outcomes.is_empty() {
        println!("No {kind} files found in '{}'.", args.path.display());
        return Ok(());
    }
    for outcome in &outcomes {
        match outcome {
            ImportOutcome::Copied { dest } => println!("✓ Imported {}", dest.display()),
            ImportOutcome::Kept { dest } => println!(
                "{} {} exists; pass --overwrite to replace it",
                "·".yellow(),
                dest.display()
            ),
        }
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}
