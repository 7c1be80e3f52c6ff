//! Rendering backends for composed graphs.
//!
//! A [`Renderer`] turns a [`RenderedGraph`] into an image file. The
//! bundled [`GraphvizRenderer`] encodes the graph as DOT and hands it to
//! the Graphviz `dot` binary.

mod dot;
mod graphviz;

use std::io;
use std::path::{Path, PathBuf};

use crate::graph::RenderedGraph;

pub use dot::to_dot;
pub use graphviz::GraphvizRenderer;

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The Graphviz binary is not installed.
    #[error("'{program}' not found in PATH, install Graphviz to render images")]
    NotFound { program: String },

    /// Graphviz exited with an error.
    #[error("Graphviz failed (exit code {code}): {stderr}")]
    Graphviz { code: i32, stderr: String },

    /// Writing the image or talking to Graphviz failed.
    #[error("I/O error while rendering: {0}")]
    Io(#[from] io::Error),

    /// The rendered image could not be opened in a viewer.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Turns a rendered graph into an image.
pub trait Renderer {
    /// Writes the graph to `output` in `format` (e.g. "svg", "png", "dot").
    fn render_to(&self, graph: &RenderedGraph, format: &str, output: &Path) -> Result<(), RenderError>;

    /// Writes the graph to a new temporary file and returns its path.
    ///
    /// The file is kept after the renderer is dropped.
    fn render(&self, graph: &RenderedGraph, format: &str) -> Result<PathBuf, RenderError> {
        let file = tempfile::Builder::new()
            .prefix("graph-composer-")
            .suffix(&format!(".{}", format))
            .tempfile()?;
        let path = file.into_temp_path();

        self.render_to(graph, format, &path)?;
        path.keep().map_err(|e| RenderError::Io(e.error))
    }

    /// Renders the graph and opens it with the system viewer.
    fn display(&self, graph: &RenderedGraph, format: &str) -> Result<PathBuf, RenderError> {
        let path = self.render(graph, format)?;
        open::that(&path).map_err(|source| RenderError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
