//! Invokes an external Graphviz `dot` binary to turn DOT source into an
//! image.
//!
//! The source is written to a temporary file whose lifetime is scoped to
//! the render call; it is removed on every exit path, success or failure.
//! The output format is taken from the output filename's extension.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::trace;

use crate::error::Error;

/// Renders DOT source through a configurable `dot` command.
///
/// ```no_run
/// use machina::prelude::*;
///
/// Renderer::new()
///     .with_source("digraph {\n  a -> b\n}")
///     .with_filename("graph.png")
///     .render()?;
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Renderer {
    source: String,
    filename: String,
    dot_command: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a renderer using the `dot` binary from the search path.
    pub fn new() -> Self {
        Self {
            source: String::new(),
            filename: String::new(),
            dot_command: "dot".to_string(),
        }
    }

    /// The DOT source to render. Required.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// The output filename; its extension selects the format (`-T<ext>`).
    /// Required.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Overrides the command used to render, e.g. an absolute path to a
    /// specific Graphviz installation.
    pub fn with_dot_command(mut self, command: impl Into<String>) -> Self {
        self.dot_command = command.into();
        self
    }

    fn target(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Runs the external command and writes the image to the configured
    /// output path.
    ///
    /// Fails with [`Error::NoDotSource`] when no source was set; a nonzero
    /// exit of the subprocess is reported as [`Error::Render`] carrying the
    /// captured stderr.
    pub fn render(&self) -> Result<(), Error> {
        if self.source.is_empty() {
            return Err(Error::NoDotSource);
        }
        let mut tmpfile = tempfile::Builder::new().suffix(".dot").tempfile()?;
        tmpfile.write_all(self.source.as_bytes())?;
        tmpfile.flush()?;

        let format = format!("-T{}", self.target());
        trace!(
            command = %self.dot_command,
            format = %format,
            output = %self.filename,
            "rendering dot source"
        );
        let output = Command::new(&self.dot_command)
            .arg(&format)
            .arg(tmpfile.path())
            .arg("-o")
            .arg(&self.filename)
            .output()?;
        if !output.status.success() {
            return Err(Error::Render {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}
