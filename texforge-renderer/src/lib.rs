//! # texforge-renderer
//!
//! Resolves `.tex.j2` templates and their sidecar schemas, merges template
//! defaults with user values, and renders LaTeX through minijinja with
//! `<< >>`, `<% %>` and `<# #>` delimiters.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use texforge_renderer::{GenerateOptions, TemplateEngine};
//! use texforge_core::ValueMap;
//!
//! fn write_homework(values: ValueMap) {
//!     let engine = TemplateEngine::new("templates");
//!     let options = GenerateOptions {
//!         output: Some("homework_3.tex".into()),
//!         ..GenerateOptions::default()
//!     };
//!     if let Err(err) = engine.generate("homework", values, &options) {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::RenderContext;
pub use engine::{render_str, GenerateOptions, LoadedTemplate, TemplateEngine};
pub use error::RenderError;
