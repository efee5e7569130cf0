//! `texforge list [-t DIR]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use texforge_renderer::{RenderError, TemplateEngine};

/// List the templates in the template directory.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory containing templates.
    #[arg(long = "template-dir", short = 't', value_name = "DIR")]
    pub template_dir: Option<PathBuf>,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "description")]
    description: String,
    #[tabled(rename = "type")]
    document_type: String,
    #[tabled(rename = "path")]
    path: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings()?;
        let engine = super::template_engine(&settings, self.template_dir.as_deref());
        let names = engine
            .list_templates()
            .with_context(|| format!("cannot list templates in '{}'", engine.dir().display()))?;

        if names.is_empty() {
            println!("{}", "No templates found.".yellow());
            println!("Run: texforge init");
            return Ok(());
        }

        let rows = names
            .iter()
            .map(|name| row(&engine, name))
            .collect::<Result<Vec<_>>>()?;
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn row(engine: &TemplateEngine, name: &str) -> Result<TemplateRow> {
    let path = engine.template_path(name)?;
    let (description, document_type) = match engine.resolve(name) {
        Ok(template) => match template.schema {
            Some(schema) => (schema.description, schema.document_type.to_string()),
            None => (String::new(), "-".to_string()),
        },
        Err(err @ (RenderError::SchemaParse { .. } | RenderError::SchemaValidation { .. })) => {
            tracing::warn!("{err}");
            ("(invalid sidecar)".to_string(), "-".to_string())
        }
        Err(err) => return Err(err.into()),
    };
    Ok(TemplateRow {
        name: name.to_string(),
        description,
        document_type,
        path: path.display().to_string(),
    })
}
