//! Template resolution and document generation.
//!
//! # Directory layout
//!
//! ```text
//! <template_dir>/
//!   homework.tex.j2   (template in `<< >>` / `<% %>` syntax)
//!   homework.yaml     (optional sidecar schema)
//!   header.tex.j2     (other templates, usable through `<% include %>`)
//! ```

use std::path::{Path, PathBuf};

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, ErrorKind, Template, UndefinedBehavior};
use texforge_core::{nested, TemplateSchema, ValueMap};

use crate::context::RenderContext;
use crate::error::RenderError;

/// File suffix of template artifacts.
pub const TEMPLATE_SUFFIX: &str = ".tex.j2";

/// File suffix of sidecar schemas.
pub const SCHEMA_SUFFIX: &str = ".yaml";

// ---------------------------------------------------------------------------
// Embedded starter template, written by `texforge init`
// ---------------------------------------------------------------------------

pub const EXAMPLE_NAME: &str = "example";
pub const EXAMPLE_TEMPLATE: &str = include_str!("templates/example.tex.j2");
pub const EXAMPLE_SCHEMA: &str = include_str!("templates/example.yaml");

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A template read from disk together with its sidecar, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTemplate {
    pub name: String,
    pub path: PathBuf,
    pub source: String,
    pub schema: Option<TemplateSchema>,
}

/// How [`TemplateEngine::generate`] treats values and output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Write the rendered text here.
    pub output: Option<PathBuf>,
    /// Replace `output` if it already exists.
    pub overwrite: bool,
    /// Check the merged values against the sidecar fields before rendering.
    pub validate: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

fn template_key(name: &str) -> String {
    format!("{name}{TEMPLATE_SUFFIX}")
}

/// Accepts `homework` or `homework.tex.j2`; refuses anything that could
/// leave the template directory.
fn normalize_name(name: &str) -> Result<&str, RenderError> {
    let stem = name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(name);
    let bad = stem.is_empty()
        || stem.contains(|c: char| c == '/' || c == '\\')
        || stem.contains("..")
        || stem.starts_with('.');
    if bad {
        return Err(RenderError::InvalidTemplateName {
            name: name.to_string(),
        });
    }
    Ok(stem)
}

/// A minijinja environment speaking the LaTeX-safe delimiters:
/// `<< expr >>`, `<% stmt %>` and `<# comment #>`.
///
/// Whitespace follows Jinja's `trim_blocks` + `lstrip_blocks`, the final
/// newline is kept, undefined values are errors and nothing is escaped.
fn new_env() -> Result<Environment<'static>, RenderError> {
    let syntax = SyntaxConfig::builder()
        .block_delimiters("<%", "%>")
        .variable_delimiters("<<", ">>")
        .comment_delimiters("<#", "#>")
        .build()
        .map_err(RenderError::Environment)?;

    let mut env = Environment::new();
    env.set_syntax(syntax);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    Ok(env)
}

/// Errors raised while compiling a template source.
fn load_error(template: &str, err: minijinja::Error) -> RenderError {
    let detail = err.detail().map(str::to_string).unwrap_or_else(|| err.to_string());
    match err.kind() {
        ErrorKind::SyntaxError => RenderError::Syntax {
            template: template.to_string(),
            line: err.line().unwrap_or(0),
            detail,
        },
        _ => RenderError::Parse {
            template: template.to_string(),
            detail,
        },
    }
}

/// Errors raised while evaluating. The failing line of the template is
/// appended to the detail so the offending expression is visible.
fn render_error(env: &Environment<'_>, template: &str, values: &ValueMap, err: minijinja::Error) -> RenderError {
    let origin = err
        .name()
        .and_then(|name| env.get_template(name).ok())
        .or_else(|| env.get_template(&template_key(template)).ok());
    let line = match (&origin, err.line()) {
        (Some(t), Some(line)) => t
            .source()
            .lines()
            .nth(line.saturating_sub(1))
            .map(|l| l.trim().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    if err.kind() == ErrorKind::UndefinedError {
        let name = origin
            .as_ref()
            .and_then(|t| undefined_name(t, values, &line))
            .unwrap_or_else(|| line.clone());
        return RenderError::UndefinedVariable {
            template: template.to_string(),
            name,
        };
    }

    let mut detail = err.to_string();
    if !line.is_empty() {
        detail.push_str(&format!(" near `{line}`"));
    }
    RenderError::Render {
        template: template.to_string(),
        detail,
    }
}

/// The dotted variable that failed to resolve.
///
/// Candidates are the template's undeclared variables missing from
/// `values`; one that appears on the failing line wins, otherwise the
/// first in sorted order.
fn undefined_name(template: &Template<'_, '_>, values: &ValueMap, line: &str) -> Option<String> {
    let mut missing: Vec<String> = template
        .undeclared_variables(true)
        .into_iter()
        .filter(|name| nested::lookup(values, name).is_none())
        .collect();
    missing.sort();
    missing
        .iter()
        .find(|name| line.contains(name.as_str()))
        .or_else(|| missing.first())
        .cloned()
}

fn render_in(env: &Environment<'_>, name: &str, ctx: &RenderContext) -> Result<String, RenderError> {
    let template = env
        .get_template(&template_key(name))
        .map_err(|e| load_error(name, e))?;
    template
        .render(ctx.values())
        .map_err(|e| render_error(env, name, ctx.values(), e))
}

/// Render a template source without touching the filesystem.
///
/// The source uses `<< >>` syntax; `name` appears in error messages.
/// Includes are not available here, see [`TemplateEngine::render`].
pub fn render_str(name: &str, source: &str, ctx: &RenderContext) -> Result<String, RenderError> {
    let mut env = new_env()?;
    env.add_template_owned(template_key(name), source.to_string())
        .map_err(|e| load_error(name, e))?;
    render_in(&env, name, ctx)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Resolves templates in one directory and renders them.
///
/// Holds no template state between calls; each render reads the directory
/// and builds a fresh environment.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    dir: PathBuf,
}

impl TemplateEngine {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TemplateEngine { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of all `*.tex.j2` files in the template directory, sorted.
    /// A missing directory has no templates.
    pub fn list_templates(&self) -> Result<Vec<String>, RenderError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let entries = std::fs::read_dir(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stem) = file_name.strip_suffix(TEMPLATE_SUFFIX) {
                if !stem.is_empty() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// `<dir>/<name>.tex.j2`. No I/O.
    pub fn template_path(&self, name: &str) -> Result<PathBuf, RenderError> {
        Ok(self.dir.join(template_key(normalize_name(name)?)))
    }

    /// `<dir>/<name>.yaml`. No I/O.
    pub fn schema_path(&self, name: &str) -> Result<PathBuf, RenderError> {
        Ok(self.dir.join(format!("{}{SCHEMA_SUFFIX}", normalize_name(name)?)))
    }

    /// Read a template and its sidecar.
    ///
    /// A missing sidecar is not an error; a malformed one is.
    pub fn resolve(&self, name: &str) -> Result<LoadedTemplate, RenderError> {
        let stem = normalize_name(name)?;
        let path = self.template_path(stem)?;
        if !path.is_file() {
            return Err(RenderError::TemplateNotFound {
                name: stem.to_string(),
                path,
            });
        }
        let source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let schema = self.load_schema(stem)?;
        tracing::debug!(
            template = stem,
            has_schema = schema.is_some(),
            "resolved {}",
            path.display()
        );
        Ok(LoadedTemplate {
            name: stem.to_string(),
            path,
            source,
            schema,
        })
    }

    fn load_schema(&self, name: &str) -> Result<Option<TemplateSchema>, RenderError> {
        let path = self.schema_path(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let schema: TemplateSchema = serde_yaml::from_str(&contents).map_err(|e| {
            RenderError::SchemaParse {
                path: path.clone(),
                source: e,
            }
        })?;
        schema
            .validate()
            .map_err(|e| RenderError::SchemaValidation { path, source: e })?;
        Ok(Some(schema))
    }

    /// Render a loaded template. Every other template in the directory is
    /// registered too, so includes resolve by file name.
    pub fn render(&self, template: &LoadedTemplate, ctx: &RenderContext) -> Result<String, RenderError> {
        let env = self.build_env(template)?;
        render_in(&env, &template.name, ctx)
    }

    /// Resolve `name`, merge its defaults with `user_values`, render, and
    /// write the result to `options.output` when set.
    ///
    /// Nothing is written unless rendering succeeds.
    pub fn generate(
        &self,
        name: &str,
        user_values: ValueMap,
        options: &GenerateOptions,
    ) -> Result<String, RenderError> {
        let template = self.resolve(name)?;

        if let Some(output) = &options.output {
            if output.exists() && !options.overwrite {
                return Err(RenderError::OutputExists {
                    path: output.clone(),
                });
            }
        }

        let ctx = RenderContext::for_schema(template.schema.as_ref(), user_values)?;
        if options.validate {
            if let Some(schema) = &template.schema {
                schema.check_values(ctx.values())?;
            }
        }

        let text = self.render(&template, &ctx)?;

        if let Some(output) = &options.output {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            std::fs::write(output, &text).map_err(|e| io_err(output, e))?;
            tracing::info!("wrote {} ({} bytes)", output.display(), text.len());
        }
        Ok(text)
    }

    /// Write `<name>.tex.j2` and, when given, `<name>.yaml`.
    ///
    /// Existing files are kept unless `overwrite` is set.
    pub fn create_template(
        &self,
        name: &str,
        content: &str,
        schema: Option<&TemplateSchema>,
        overwrite: bool,
    ) -> Result<PathBuf, RenderError> {
        let path = self.template_path(name)?;
        let schema_path = self.schema_path(name)?;
        let blocked = if path.exists() {
            Some(&path)
        } else if schema.is_some() && schema_path.exists() {
            Some(&schema_path)
        } else {
            None
        };
        if let (Some(existing), false) = (blocked, overwrite) {
            return Err(RenderError::OutputExists {
                path: existing.clone(),
            });
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        std::fs::write(&path, content).map_err(|e| io_err(&path, e))?;
        if let Some(schema) = schema {
            let yaml = schema.to_yaml().map_err(RenderError::SchemaSerialize)?;
            std::fs::write(&schema_path, yaml).map_err(|e| io_err(&schema_path, e))?;
        }
        tracing::info!("created template {}", path.display());
        Ok(path)
    }

    /// Write the embedded starter template and its sidecar.
    pub fn create_example(&self, overwrite: bool) -> Result<PathBuf, RenderError> {
        let schema = TemplateSchema::from_yaml(EXAMPLE_SCHEMA).map_err(|e| RenderError::Parse {
            template: EXAMPLE_NAME.to_string(),
            detail: e.to_string(),
        })?;
        self.create_template(EXAMPLE_NAME, EXAMPLE_TEMPLATE, Some(&schema), overwrite)
    }

    fn build_env(&self, target: &LoadedTemplate) -> Result<Environment<'static>, RenderError> {
        let mut env = new_env()?;
        for name in self.list_templates()? {
            if name == target.name {
                continue;
            }
            let path = self.dir.join(template_key(&name));
            let source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            if let Err(err) = env.add_template_owned(template_key(&name), source) {
                tracing::warn!("skipping template '{name}': {err}");
            }
        }
        env.add_template_owned(template_key(&target.name), target.source.clone())
            .map_err(|e| load_error(&target.name, e))?;
        Ok(env)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
