//! `texforge info <name> [-t DIR]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use texforge_core::{FieldSpec, TemplateSchema};

/// Show a template's metadata and fields.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Template name, with or without the .tex.j2 suffix.
    pub name: String,

    /// Directory containing templates.
    #[arg(long = "template-dir", short = 't', value_name = "DIR")]
    pub template_dir: Option<PathBuf>,
}

#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "property")]
    property: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "type")]
    kind: String,
    #[tabled(rename = "required")]
    required: &'static str,
    #[tabled(rename = "default")]
    default: String,
    #[tabled(rename = "description")]
    description: String,
}

impl InfoArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings()?;
        let engine = super::template_engine(&settings, self.template_dir.as_deref());
        let template = engine
            .resolve(&self.name)
            .with_context(|| format!("cannot load template '{}'", self.name))?;

        let Some(schema) = template.schema else {
            println!(
                "{}",
                format!("Template '{}' has no sidecar schema.", template.name).yellow()
            );
            println!("  Source: {}", template.path.display());
            return Ok(());
        };

        println!("{}", format!("Template: {}", schema.name).bold());
        let mut table = Table::new(properties(&schema));
        table.with(Style::rounded());
        println!("{table}");

        if !schema.fields.is_empty() {
            println!("{}", "Fields".bold());
            let mut fields = Table::new(schema.fields.iter().map(field_row));
            fields.with(Style::rounded());
            println!("{fields}");
        }
        for section in &schema.sections {
            let repeat = section
                .repeat
                .as_ref()
                .map(|counter| format!(" (one per {counter})"))
                .unwrap_or_default();
            println!(
                "{}",
                format!(
                    "Section: {}{}{repeat}",
                    section.title,
                    if section.optional { " (optional)" } else { "" }
                )
                .bold()
            );
            if !section.fields.is_empty() {
                let mut fields = Table::new(section.fields.iter().map(field_row));
                fields.with(Style::rounded());
                println!("{fields}");
            }
        }
        Ok(())
    }
}

fn properties(schema: &TemplateSchema) -> Vec<PropertyRow> {
    let mut rows = vec![
        PropertyRow {
            property: "description",
            value: schema.description.clone(),
        },
        PropertyRow {
            property: "document type",
            value: schema.document_type.to_string(),
        },
        PropertyRow {
            property: "version",
            value: schema.version.clone(),
        },
    ];
    if let Some(author) = &schema.author {
        rows.push(PropertyRow {
            property: "author",
            value: author.clone(),
        });
    }
    let class = if schema.class_options.is_empty() {
        schema.document_class.clone()
    } else {
        format!("{} [{}]", schema.document_class, schema.class_options.join(","))
    };
    rows.push(PropertyRow {
        property: "document class",
        value: class,
    });
    if !schema.packages.is_empty() {
        rows.push(PropertyRow {
            property: "packages",
            value: schema.packages.join(", "),
        });
    }
    if !schema.tags.is_empty() {
        rows.push(PropertyRow {
            property: "tags",
            value: schema.tags.join(", "),
        });
    }
    if !schema.variables.is_empty() {
        rows.push(PropertyRow {
            property: "variables",
            value: schema.variables.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }
    rows
}

fn field_row(field: &FieldSpec) -> FieldRow {
    let kind = match field.choices.as_deref() {
        Some(choices) if !choices.is_empty() => format!("{} ({})", field.kind, choices.join("|")),
        _ => field.kind.to_string(),
    };
    FieldRow {
        name: field.name.clone(),
        kind,
        required: if field.required { "yes" } else { "no" },
        default: field
            .default
            .as_ref()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
            .unwrap_or_default(),
        description: field.description.clone().unwrap_or_default(),
    }
}
