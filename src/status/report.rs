//! Sources of raw outdated reports.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// How often a running report command is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Errors that can occur while retrieving an outdated report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report program is not installed.
    #[error("'{program}' not found in PATH")]
    NotFound { program: String },

    /// The report program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting on the report program failed.
    #[error("I/O error while reading report: {0}")]
    Io(#[from] io::Error),

    /// The report program did not finish in time.
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Produces the line-oriented outdated report for a project.
///
/// Each package line has the shape
/// `<name> <installed> ... <latest> [description]`; lines mentioning
/// `abandoned` flag unmaintained packages.
pub trait ReportSource {
    /// Returns the raw report text for the project in `project_dir`.
    fn fetch(&self, project_dir: &Path) -> Result<String, ReportError>;
}

/// A fixed, already retrieved report.
#[derive(Debug, Clone, Default)]
pub struct StaticReport {
    text: String,
}

impl StaticReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ReportSource for StaticReport {
    fn fetch(&self, _project_dir: &Path) -> Result<String, ReportError> {
        Ok(self.text.clone())
    }
}

/// Runs an external command (by default `composer outdated`) in the
/// project directory and captures its combined output.
#[derive(Debug, Clone)]
pub struct OutdatedCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for OutdatedCommand {
    fn default() -> Self {
        Self {
            program: "composer".to_string(),
            args: vec!["outdated".to_string()],
            timeout: Duration::from_secs(30),
        }
    }
}

impl OutdatedCommand {
    /// Uses a custom program and arguments.
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets how long the command may run before it is killed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ReportSource for OutdatedCommand {
    fn fetch(&self, project_dir: &Path) -> Result<String, ReportError> {
        let program = which::which(&self.program).map_err(|_| ReportError::NotFound {
            program: self.program.clone(),
        })?;

        let start = Instant::now();
        let mut child = Command::new(program)
            .args(&self.args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ReportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Drain both pipes while waiting so a chatty child never blocks
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() >= self.timeout {
                // Best effort, the child may have exited in between
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReportError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let mut output = collect(stdout);
        output.extend(collect(stderr));

        debug!(
            program = %self.program,
            exit_code = status.code().unwrap_or(-1),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "outdated report retrieved"
        );
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

fn drain(mut reader: impl Read + Send + 'static) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .and_then(Result::ok)
        .unwrap_or_default()
}
