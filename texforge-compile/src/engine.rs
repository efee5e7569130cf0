//! TeX engines and how each one is invoked.
//!
//! | Engine   | Command line                                             |
//! |----------|----------------------------------------------------------|
//! | tectonic | `tectonic <path>`                                        |
//! | xelatex  | `xelatex -interaction=nonstopmode <file>` (in its dir)   |
//! | pdflatex | `pdflatex -interaction=nonstopmode <file>` (in its dir)  |
//! | lualatex | `lualatex -interaction=nonstopmode <file>` (in its dir)  |
//! | other    | same shape as the LaTeX engines                          |

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::CompileError;
use crate::runner::Invocation;

/// A typesetting engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Tectonic,
    Xelatex,
    Pdflatex,
    Lualatex,
    /// Any other program taking LaTeX-style arguments.
    Custom(String),
}

impl EngineKind {
    /// Fallback order used when no engine is named.
    pub fn default_order() -> Vec<EngineKind> {
        vec![EngineKind::Tectonic, EngineKind::Xelatex, EngineKind::Pdflatex]
    }

    pub fn program(&self) -> &str {
        match self {
            EngineKind::Tectonic => "tectonic",
            EngineKind::Xelatex => "xelatex",
            EngineKind::Pdflatex => "pdflatex",
            EngineKind::Lualatex => "lualatex",
            EngineKind::Custom(program) => program,
        }
    }

    /// Command line that compiles `source`.
    pub fn invocation(&self, source: &Path) -> Invocation {
        match self {
            EngineKind::Tectonic => Invocation {
                program: self.program().to_string(),
                args: vec![source.to_string_lossy().into_owned()],
                cwd: None,
            },
            _ => {
                let file_name = source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| source.to_string_lossy().into_owned());
                let cwd = source
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf);
                Invocation {
                    program: self.program().to_string(),
                    args: vec!["-interaction=nonstopmode".to_string(), file_name],
                    cwd,
                }
            }
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for EngineKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name.to_ascii_lowercase().as_str() {
            "tectonic" => Ok(EngineKind::Tectonic),
            "xelatex" => Ok(EngineKind::Xelatex),
            "pdflatex" => Ok(EngineKind::Pdflatex),
            "lualatex" => Ok(EngineKind::Lualatex),
            _ if name.is_empty() || name.contains(char::is_whitespace) => {
                Err(CompileError::InvalidEngine {
                    name: s.to_string(),
                })
            }
            _ => Ok(EngineKind::Custom(name.to_string())),
        }
    }
}
