//! `texforge init [-t DIR] [--force]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use texforge_renderer::RenderError;

/// Write the example template and its sidecar into the template directory.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to create the templates in.
    #[arg(long = "template-dir", short = 't', value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Replace an existing example template.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings()?;
        let engine = super::template_engine(&settings, self.template_dir.as_deref());

        let path = match engine.create_example(self.force) {
            Ok(path) => path,
            Err(RenderError::OutputExists { path }) => {
                anyhow::bail!(
                    "'{}' already exists; pass --force to replace it",
                    path.display()
                )
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to initialize '{}'", engine.dir().display())
                })
            }
        };

        println!("✓ Initialized template directory '{}'", engine.dir().display());
        println!("  Created: {}", path.display());
        println!("  Try: texforge info example -t {}", engine.dir().display());
        Ok(())
    }
}
