//! # texforge-compile
//!
//! Runs an external TeX engine over a generated `.tex` file, falling back
//! through a list of engines until one produces a PDF.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use texforge_compile::{Compiler, EngineKind};
//!
//! let outcome = Compiler::new().compile(Path::new("homework.tex"), &EngineKind::default_order());
//! match outcome {
//!     Ok(done) => println!("{} via {}", done.pdf_path.display(), done.engine),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod compiler;
pub mod engine;
pub mod error;
pub mod runner;
pub mod viewer;

pub use compiler::{Attempt, AttemptResult, CompileOutcome, Compiler, DEFAULT_TIMEOUT};
pub use engine::EngineKind;
pub use error::CompileError;
pub use runner::{CommandRunner, Exit, Invocation, RunOutput, SystemRunner};
pub use viewer::open_pdf;
