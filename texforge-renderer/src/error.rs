//! Error types for texforge-renderer.

use std::path::PathBuf;

use texforge_core::{FieldError, PathError, SchemaError};
use thiserror::Error;

/// All errors that can arise while resolving, rendering or writing a
/// template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No `<name>.tex.j2` in the template directory.
    #[error("template '{name}' not found (looked for {path})")]
    TemplateNotFound { name: String, path: PathBuf },

    /// Template names are plain file stems; separators and `..` are refused.
    #[error("invalid template name '{name}'")]
    InvalidTemplateName { name: String },

    /// The sidecar is not valid YAML or does not match the schema shape.
    #[error("malformed schema at {path}: {source}")]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The sidecar parsed but breaks a schema rule.
    #[error("invalid schema at {path}: {source}")]
    SchemaValidation {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    /// The template source does not parse.
    #[error("syntax error in '{template}' at line {line}: {detail}")]
    Syntax {
        template: String,
        line: usize,
        detail: String,
    },

    /// A template or the built-in sidecar could not be loaded.
    #[error("cannot load template '{template}': {detail}")]
    Parse { template: String, detail: String },

    /// A variable used by the template is in neither the defaults nor the
    /// user values.
    #[error("undefined variable '{name}' in template '{template}'")]
    UndefinedVariable { template: String, name: String },

    /// Any other failure while evaluating the template.
    #[error("failed to render '{template}': {detail}")]
    Render { template: String, detail: String },

    /// Refusing to replace an existing output file.
    #[error("output file {path} already exists (use overwrite to replace it)")]
    OutputExists { path: PathBuf },

    /// Building the render context from dotted keys failed.
    #[error("cannot build render context: {0}")]
    Path(#[from] PathError),

    /// User values failed schema checks.
    #[error("invalid template values: {0}")]
    Values(#[from] FieldError),

    /// The template environment could not be configured.
    #[error("cannot configure template environment: {0}")]
    Environment(#[source] minijinja::Error),

    /// A schema could not be written back to YAML.
    #[error("cannot serialize schema: {0}")]
    SchemaSerialize(#[source] serde_yaml::Error),

    /// Filesystem error while reading templates or writing output.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
