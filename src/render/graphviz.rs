//! Graphviz-backed renderer.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

use super::dot::to_dot;
use super::{RenderError, Renderer};
use crate::graph::RenderedGraph;

/// Formats written as DOT text without invoking Graphviz.
const DOT_FORMATS: [&str; 2] = ["dot", "gv"];

/// Renders graphs through the Graphviz `dot` binary.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: String,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizRenderer {
    /// Uses a specific Graphviz layout program (e.g. "dot", "neato").
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Renderer for GraphvizRenderer {
    fn render_to(&self, graph: &RenderedGraph, format: &str, output: &Path) -> Result<(), RenderError> {
        let dot = to_dot(graph);

        if DOT_FORMATS.contains(&format.to_lowercase().as_str()) {
            fs::write(output, dot)?;
            return Ok(());
        }

        let program = which::which(&self.program).map_err(|_| RenderError::NotFound {
            program: self.program.clone(),
        })?;

        let mut child = Command::new(program)
            .arg(format!("-T{}", format))
            .arg("-o")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        // warnings are read while the graph is still being written
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buffer = Vec::new();
                pipe.read_to_end(&mut buffer).map(|_| buffer)
            })
        });

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes())?;
        }

        let status = child.wait()?;
        let stderr = stderr
            .and_then(|handle| handle.join().ok())
            .and_then(Result::ok)
            .unwrap_or_default();

        if !status.success() {
            return Err(RenderError::Graphviz {
                code: status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        debug!(output = %output.display(), format, "rendered graph");
        Ok(())
    }
}
