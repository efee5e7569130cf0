//! `texforge generate <name> <output> [-v FILE] [--set key=value]... [--compile]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use texforge_core::ValueMap;
use texforge_renderer::{GenerateOptions, RenderError};

use super::compile::{compile_document, EngineArgs};
use crate::values;

/// Render a template to a .tex file.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Template name, with or without the .tex.j2 suffix.
    pub name: String,

    /// Where to write the generated document.
    pub output: PathBuf,

    /// YAML or JSON file with template values.
    #[arg(long = "values", short = 'v', value_name = "FILE")]
    pub values: Option<PathBuf>,

    /// Set one value, e.g. --set student.name=Ada. Applied after --values.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Directory containing templates.
    #[arg(long = "template-dir", short = 't', value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Replace the output file if it exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Check values against the template's field definitions first.
    #[arg(long)]
    pub validate: bool,

    /// Compile the generated document to PDF.
    #[arg(long)]
    pub compile: bool,

    #[command(flatten)]
    pub engines: EngineArgs,

    /// Open the PDF after compiling.
    #[arg(long, requires = "compile")]
    pub open: bool,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings()?;
        let engine = super::template_engine(&settings, self.template_dir.as_deref());

        let mut user_values = match &self.values {
            Some(path) => values::load_values_file(path)?,
            None => ValueMap::new(),
        };
        values::apply_assignments(&mut user_values, &self.set)?;

        let options = GenerateOptions {
            output: Some(self.output.clone()),
            overwrite: self.overwrite,
            validate: self.validate,
        };
        match engine.generate(&self.name, user_values, &options) {
            Ok(_) => {}
            Err(RenderError::OutputExists { path }) => anyhow::bail!(
                "'{}' already exists; pass --overwrite to replace it",
                path.display()
            ),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to generate from template '{}'", self.name))
            }
        }
        println!("{} {}", "✓ Generated".green(), self.output.display());

        if self.compile {
            compile_document(&settings, &self.output, &self.engines, self.open)?;
        }
        Ok(())
    }
}
