//! `texforge wizard [-t DIR]`: interactive document creation.
//!
//! Everything the flow needs lives in one [`WizardSession`]; nothing is kept
//! between runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use texforge_compile::open_pdf;
use texforge_core::assets::{AssetKind, AssetManager, ImportOutcome};
use texforge_core::collect::Collector;
use texforge_core::config::Settings;
use texforge_core::naming::{derive_output_name, slugify, DEFAULT_STEM};
use texforge_core::nested;
use texforge_core::{TemplateSchema, ValueMap};
use texforge_renderer::{GenerateOptions, LoadedTemplate, RenderContext, TemplateEngine};

use super::compile::{compile_document, EngineArgs};
use crate::prompt::TerminalPrompter;

/// Interactive document creation.
#[derive(Args, Debug)]
pub struct WizardArgs {
    /// Directory containing templates.
    #[arg(long = "template-dir", short = 't', value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Project root holding assets/.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl WizardArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings()?;
        let engine = super::template_engine(&settings, self.template_dir.as_deref());
        let assets = AssetManager::new(self.root.clone().unwrap_or_else(|| settings.assets_root()));
        WizardSession {
            settings,
            engine,
            assets,
            prompter: TerminalPrompter::new(),
        }
        .start()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    SetupAssets,
    ListAssets,
    Exit,
}

impl Action {
    const ALL: [Action; 4] = [
        Action::Create,
        Action::SetupAssets,
        Action::ListAssets,
        Action::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            Action::Create => "Create a new document from a template",
            Action::SetupAssets => "Set up fonts and images for templates",
            Action::ListAssets => "List available assets",
            Action::Exit => "Exit",
        }
    }
}

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "field")]
    field: String,
    #[tabled(rename = "value")]
    value: String,
}

/// State for one wizard run.
pub struct WizardSession {
    settings: Settings,
    engine: TemplateEngine,
    assets: AssetManager,
    prompter: TerminalPrompter,
}

impl WizardSession {
    pub fn start(mut self) -> Result<()> {
        println!("{}", "texforge".bold().blue());
        println!("{}", "Interactive document creator".bright_black());

        let labels: Vec<String> = Action::ALL.iter().map(|a| a.label().to_string()).collect();
        let choice = self
            .prompter
            .select("What would you like to do?", &labels, 0)
            .context("failed to read selection")?;
        match choice.map(|i| Action::ALL[i]) {
            Some(Action::Create) => self.create_document(),
            Some(Action::SetupAssets) => self.setup_assets(),
            Some(Action::ListAssets) => super::assets::print_assets(&self.assets),
            Some(Action::Exit) | None => Ok(()),
        }
    }

    fn setup_assets(&mut self) -> Result<()> {
        self.assets
            .ensure_dirs()
            .context("failed to create asset directories")?;
        for kind in [AssetKind::Font, AssetKind::Image] {
            let answer = self
                .prompter
                .text(
                    &format!("Path to a {kind} file or a directory of {kind}s (empty to skip)"),
                    None,
                )
                .context("failed to read path")?;
            let answer = answer.trim();
            if answer.is_empty() {
                continue;
            }
            self.import(kind, Path::new(answer))?;
        }

        println!("{}", "✓ Asset setup complete".green());
        super::assets::print_assets(&self.assets)?;

        if self.prompter.confirm("Create a document now?", true)? {
            self.create_document()?;
        }
        Ok(())
    }

    fn import(&self, kind: AssetKind, path: &Path) -> Result<()> {
        let path = texforge_core::assets::expand_home(path);
        let outcomes = if path.is_dir() {
            self.assets.import_dir(kind, &path, false)?
        } else {
            vec![self.assets.import(kind, &path, false)?]
        };
        for outcome in outcomes {
            match outcome {
                ImportOutcome::Copied { dest } => println!("✓ Imported {}", dest.display()),
                ImportOutcome::Kept { dest } => println!("· Kept existing {}", dest.display()),
            }
        }
        Ok(())
    }

    fn create_document(&mut self) -> Result<()> {
        let Some(template) = self.choose_template()? else {
            return Ok(());
        };

        let mut values = match &template.schema {
            Some(schema) => self.collect(schema)?,
            None => {
                println!(
                    "{}",
                    "This template has no sidecar; it will be rendered without values.".yellow()
                );
                ValueMap::new()
            }
        };
        self.assets
            .inject_paths(&mut values)
            .context("failed to add asset paths")?;

        self.preview(&values);
        if !self
            .prompter
            .confirm("Generate the LaTeX document with these values?", true)?
        {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }

        let resolved = RenderContext::for_schema(template.schema.as_ref(), values.clone())?;
        let Some(output) = self.choose_output(&derive_output_name(resolved.values()))? else {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        };

        let options = GenerateOptions {
            output: Some(output.clone()),
            overwrite: true,
            validate: false,
        };
        self.engine
            .generate(&template.name, values, &options)
            .with_context(|| format!("failed to generate from template '{}'", template.name))?;
        println!("{} {}", "✓ Generated".green(), output.display());

        if self.prompter.confirm("Compile the document now?", true)? {
            let pdf = compile_document(&self.settings, &output, &EngineArgs::default(), false)?;
            if self.prompter.confirm("Open the PDF?", true)? {
                open_pdf(&pdf)?;
            }
        }
        Ok(())
    }

    fn choose_template(&self) -> Result<Option<LoadedTemplate>> {
        let names = self.engine.list_templates()?;
        if names.is_empty() {
            println!(
                "{} in {}. Run: texforge init",
                "No templates found".red(),
                self.engine.dir().display()
            );
            return Ok(None);
        }

        let items: Vec<String> = names
            .iter()
            .map(|name| match self.engine.resolve(name) {
                Ok(LoadedTemplate {
                    schema: Some(schema),
                    ..
                }) => format!("{name}  {}", schema.description.bright_black()),
                _ => name.clone(),
            })
            .collect();
        let Some(index) = self.prompter.select("Template", &items, 0)? else {
            return Ok(None);
        };

        let template = self
            .engine
            .resolve(&names[index])
            .with_context(|| format!("cannot load template '{}'", names[index]))?;
        if let Some(schema) = &template.schema {
            println!("{} {}", "Loaded template:".green(), schema.name);
            println!("{}", schema.description.bright_black());
        }
        Ok(Some(template))
    }

    fn collect(&mut self, schema: &TemplateSchema) -> Result<ValueMap> {
        println!("\n{}", format!("Configuring {}", schema.name).bold());
        let mut values = Collector::new(&mut self.prompter)
            .collect_all(&schema.fields)
            .context("failed to collect field values")?;

        for section in &schema.sections {
            if section.fields.is_empty() {
                continue;
            }
            let count = match &section.repeat {
                Some(_) => match schema.repeat_count(section, &values) {
                    Some(0) | None => continue,
                    count => count,
                },
                None => None,
            };
            if section.optional
                && !self
                    .prompter
                    .confirm(&format!("Include section '{}'?", section.title), true)?
            {
                continue;
            }
            println!("\n{}", section.title.bold());
            let mut collector = Collector::new(&mut self.prompter);
            match count {
                Some(count) => {
                    let items = collector
                        .collect_repeated(section, count)
                        .with_context(|| format!("failed to collect section '{}'", section.name))?;
                    nested::assign(&mut values, &section.name, Value::Array(items))?;
                }
                None => {
                    let section_values = collector
                        .collect_all(&section.fields)
                        .with_context(|| format!("failed to collect section '{}'", section.name))?;
                    merge_into(&mut values, section_values);
                }
            }
        }
        Ok(values)
    }

    fn preview(&self, values: &ValueMap) {
        println!("\n{}", "Configuration preview".bold());
        let rows: Vec<PreviewRow> = values
            .iter()
            .map(|(key, value)| PreviewRow {
                field: key.clone(),
                value: display_value(value),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    /// Output path in the working directory, asking before replacing a file.
    fn choose_output(&self, suggested: &str) -> Result<Option<PathBuf>> {
        let path = PathBuf::from(suggested);
        if !path.exists()
            || self
                .prompter
                .confirm(&format!("{} exists. Overwrite?", path.display()), false)?
        {
            return Ok(Some(path));
        }

        let stem = path
            .file_stem()
            .map(|s| slugify(&s.to_string_lossy()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STEM.to_string());
        let answer = self
            .prompter
            .text("New file name (empty to cancel)", Some(&format!("{stem}_new.tex")))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        let path = PathBuf::from(answer);
        if path.exists()
            && !self
                .prompter
                .confirm(&format!("{} exists too. Overwrite?", path.display()), false)?
        {
            return Ok(None);
        }
        Ok(Some(path))
    }
}

/// Deep merge: mappings present on both sides are merged key by key.
fn merge_into(target: &mut ValueMap, overlay: ValueMap) {
    for (key, value) in overlay {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge_into(existing, incoming),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", display_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
