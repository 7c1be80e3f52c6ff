//! Parsing of outdated reports into per-package statuses.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::report::ReportSource;
use super::VersionStatus;

/// Marker word flagging an unmaintained package in a report line.
const ABANDONED_MARKER: &str = "abandoned";

/// Classifies a single report line.
///
/// Returns `None` for lines that carry no package information, such as
/// headers, blank lines or progress output.
///
/// # Example
///
/// ```rust
/// use graph_composer::status::{classify_line, VersionStatus};
///
/// assert_eq!(
///     classify_line("monolog/monolog 3.5.0 ~ 3.6.0 Sends your logs"),
///     Some(("monolog/monolog".to_string(), VersionStatus::MinorAvailable))
/// );
/// assert_eq!(classify_line("Direct dependencies required in composer.json:"), None);
/// ```
pub fn classify_line(line: &str) -> Option<(String, VersionStatus)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if line.contains(ABANDONED_MARKER) {
        let name = match tokens.as_slice() {
            ["Package", name, ..] => name,
            [name, ..] => name,
            [] => return None,
        };
        return Some((name.to_string(), VersionStatus::Abandoned));
    }

    let [name, installed, rest @ ..] = tokens.as_slice() else {
        return None;
    };
    let installed = components(installed)?;
    let latest = rest.iter().find_map(|token| components(token))?;

    Some((name.to_string(), compare(installed, latest)))
}

/// Parses a whole report, skipping lines that don't describe a package.
///
/// An [`VersionStatus::Abandoned`] entry is never replaced by a later
/// line for the same package.
pub fn parse_report(report: &str) -> HashMap<String, VersionStatus> {
    let mut statuses = HashMap::new();

    for line in report.lines() {
        let Some((name, status)) = classify_line(line) else {
            trace!(line, "skipping report line");
            continue;
        };

        if statuses.get(&name) != Some(&VersionStatus::Abandoned) {
            statuses.insert(name, status);
        }
    }

    statuses
}

/// Splits a version into its major, minor and patch components.
fn components(version: &str) -> Option<[&str; 3]> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let mut parts = version.split('.');
    let triple = [parts.next()?, parts.next()?, parts.next()?];

    let numeric = triple
        .iter()
        .all(|part| part.starts_with(|c: char| c.is_ascii_digit()));
    numeric.then_some(triple)
}

fn compare(installed: [&str; 3], latest: [&str; 3]) -> VersionStatus {
    if installed[0] != latest[0] {
        VersionStatus::MajorAvailable
    } else if installed[1] != latest[1] {
        VersionStatus::MinorAvailable
    } else if installed[2] != latest[2] {
        VersionStatus::PatchAvailable
    } else {
        VersionStatus::Latest
    }
}

/// Lazily fetched, cached status lookup for one project.
///
/// The report is retrieved on the first lookup only. A failed retrieval
/// is logged and leaves every package at [`VersionStatus::Latest`].
pub struct VersionStatusClassifier {
    project_dir: PathBuf,
    source: Box<dyn ReportSource>,
    statuses: OnceCell<HashMap<String, VersionStatus>>,
}

impl VersionStatusClassifier {
    /// Creates a classifier reading reports for `project_dir` from `source`.
    pub fn new(project_dir: impl Into<PathBuf>, source: impl ReportSource + 'static) -> Self {
        Self {
            project_dir: project_dir.into(),
            source: Box::new(source),
            statuses: OnceCell::new(),
        }
    }

    /// Status of a package, [`VersionStatus::Latest`] when unreported.
    pub fn status(&self, package: &str) -> VersionStatus {
        self.statuses().get(package).copied().unwrap_or_default()
    }

    /// Every status recorded in the report.
    pub fn statuses(&self) -> &HashMap<String, VersionStatus> {
        self.statuses.get_or_init(|| self.load())
    }

    /// The project directory the report is fetched for.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn load(&self) -> HashMap<String, VersionStatus> {
        match self.source.fetch(&self.project_dir) {
            Ok(report) => {
                let statuses = parse_report(&report);
                debug!(packages = statuses.len(), "classified outdated report");
                statuses
            }
            Err(err) => {
                warn!(
                    dir = %self.project_dir.display(),
                    error = %err,
                    "outdated report unavailable, treating all packages as latest"
                );
                HashMap::new()
            }
        }
    }
}

impl fmt::Debug for VersionStatusClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionStatusClassifier")
            .field("project_dir", &self.project_dir)
            .field("loaded", &self.statuses.get().is_some())
            .finish()
    }
}
