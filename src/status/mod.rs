//! Version staleness classification.
//!
//! A project's "outdated" report lists installed and latest versions per
//! package. [`parse_report`] turns that text into a [`VersionStatus`] per
//! package, and [`VersionStatusClassifier`] fetches and parses the report
//! once, answering lookups from the cached result afterwards.
//!
//! # Example
//!
//! ```rust
//! use graph_composer::status::{StaticReport, VersionStatus, VersionStatusClassifier};
//!
//! let report = StaticReport::new("psr/log 1.1.4 ! 3.0.0 Common interface for logging");
//! let classifier = VersionStatusClassifier::new(".", report);
//!
//! assert_eq!(classifier.status("psr/log"), VersionStatus::MajorAvailable);
//! assert_eq!(classifier.status("unlisted/package"), VersionStatus::Latest);
//! ```

mod classifier;
mod report;

use std::fmt;

pub use classifier::{classify_line, parse_report, VersionStatusClassifier};
pub use report::{OutdatedCommand, ReportError, ReportSource, StaticReport};

/// How far an installed version lags behind the latest release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VersionStatus {
    /// Installed version is the latest known one
    #[default]
    Latest,
    /// Only the patch component differs
    PatchAvailable,
    /// The minor component differs
    MinorAvailable,
    /// The major component differs
    MajorAvailable,
    /// The package is no longer maintained
    Abandoned,
}

impl VersionStatus {
    /// All statuses, freshest first.
    pub const ALL: [VersionStatus; 5] = [
        VersionStatus::Latest,
        VersionStatus::PatchAvailable,
        VersionStatus::MinorAvailable,
        VersionStatus::MajorAvailable,
        VersionStatus::Abandoned,
    ];

    /// Fill color used for vertices with this status.
    pub fn color(&self) -> &'static str {
        match self {
            VersionStatus::Abandoned => "#FF5A52",
            VersionStatus::MajorAvailable => "#FF7e0d",
            VersionStatus::MinorAvailable => "#FFFA5C",
            VersionStatus::PatchAvailable => "#90DB27",
            VersionStatus::Latest => "#3ABA4D",
        }
    }

    /// Returns true for every status other than [`VersionStatus::Latest`].
    pub fn is_outdated(&self) -> bool {
        *self != VersionStatus::Latest
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionStatus::Latest => "latest",
            VersionStatus::PatchAvailable => "patch available",
            VersionStatus::MinorAvailable => "minor available",
            VersionStatus::MajorAvailable => "major available",
            VersionStatus::Abandoned => "abandoned",
        };
        write!(f, "{}", s)
    }
}
