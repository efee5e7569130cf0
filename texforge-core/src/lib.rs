//! texforge core library: template schema, nested-path merging, field
//! collection, assets, settings.
//!
//! - [`schema`] — sidecar schema types and validation
//! - [`nested`] — dotted-key assignment into nested mappings
//! - [`collect`] — per-field value collection through a [`collect::Prompter`]
//! - [`assets`] — font/image import under `assets/`
//! - [`config`] — `~/.texforge/config.yaml` settings
//! - [`error`] — error enums for all of the above

pub mod assets;
pub mod collect;
pub mod config;
pub mod error;
pub mod naming;
pub mod nested;
pub mod schema;

pub use error::{AssetError, ConfigError, FieldError, PathError, SchemaError, SchemaParseError};
pub use schema::{DocumentType, FieldKind, FieldSpec, SectionSpec, TemplateSchema};

/// A mapping of variable names to values, as used for template variables
/// and collected user input.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;
