//! Opening a compiled PDF in the platform viewer.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::CompileError;
use crate::runner::Invocation;

/// The command that hands `pdf` to the desktop's default viewer.
pub fn viewer_invocation(pdf: &Path) -> Invocation {
    let path = pdf.to_string_lossy().into_owned();
    if cfg!(target_os = "macos") {
        Invocation::new("open", [path])
    } else if cfg!(windows) {
        Invocation::new("cmd", ["/C".to_string(), "start".to_string(), String::new(), path])
    } else {
        Invocation::new("xdg-open", [path])
    }
}

/// Launch the viewer without waiting for it to exit.
pub fn open_pdf(pdf: &Path) -> Result<(), CompileError> {
    let viewer_err = |source| CompileError::Viewer {
        path: pdf.to_path_buf(),
        source,
    };
    if !pdf.is_file() {
        return Err(viewer_err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        )));
    }

    let inv = viewer_invocation(pdf);
    tracing::debug!(program = %inv.program, "opening {}", pdf.display());
    Command::new(&inv.program)
        .args(&inv.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(viewer_err)?;
    Ok(())
}
