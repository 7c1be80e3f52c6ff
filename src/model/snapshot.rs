//! Loader for pre-resolved dependency snapshots.
//!
//! A snapshot is a JSON document describing an already-resolved package
//! graph. It is produced by whatever tool resolved the project's
//! dependencies; this module only turns it into a [`PackageGraph`].
//!
//! ```json
//! {
//!   "root": "acme/app",
//!   "packages": [
//!     {
//!       "name": "acme/app",
//!       "version": "1.0.0",
//!       "dependencies": [
//!         {"name": "psr/log", "constraint": "^3.0"},
//!         {"name": "phpunit/phpunit", "constraint": "^10.5", "dev": true}
//!       ]
//!     },
//!     {"name": "psr/log", "version": "3.0.0"}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::package_graph::{DependencyEdge, PackageGraph, PackageNode};

/// Default snapshot file name looked up inside a project directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "dependency-graph.json";

/// Errors that can occur while loading a dependency model.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Failed to read the file from disk.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON content.
    #[error("Failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// The root package is not listed among the packages.
    #[error("Root package '{0}' is not listed in the snapshot")]
    MissingRoot(String),
}

/// Result type alias for dependency source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Supplies the resolved dependency model of a project.
pub trait DependencySource {
    /// Builds the package graph for the project in `project_dir`.
    fn analyze(&self, project_dir: &Path) -> SourceResult<PackageGraph>;
}

/// Serialized form of a resolved dependency model.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    /// Name of the root package.
    pub root: String,

    /// All known packages, root included.
    #[serde(default)]
    pub packages: Vec<SnapshotPackage>,
}

/// A package entry in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    /// Outgoing requirements, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<SnapshotDependency>,
}

/// A requirement entry in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDependency {
    pub name: String,

    #[serde(default = "any_constraint")]
    pub constraint: String,

    #[serde(default)]
    pub dev: bool,
}

fn any_constraint() -> String {
    "*".to_string()
}

impl Snapshot {
    /// Parses a snapshot from a JSON string.
    pub fn parse_str(content: &str) -> SourceResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parses a snapshot from a file.
    pub fn parse_file(path: &Path) -> SourceResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content)
    }

    /// Converts the snapshot into a [`PackageGraph`].
    ///
    /// Requirements naming a package that is not listed (platform
    /// packages such as `php` or `ext-json`) become version-less nodes.
    pub fn into_graph(self) -> SourceResult<PackageGraph> {
        let root = self
            .packages
            .iter()
            .find(|p| p.name == self.root)
            .ok_or_else(|| SourceError::MissingRoot(self.root.clone()))?;

        let root_node = PackageNode {
            name: root.name.clone(),
            version: root.version.clone(),
        };
        let mut graph = PackageGraph::new(root_node);

        for package in &self.packages {
            graph.add_package(&package.name, package.version.as_deref());
        }

        for package in &self.packages {
            for dep in &package.dependencies {
                graph.add_package(&dep.name, None);
                let edge = DependencyEdge {
                    version_constraint: dep.constraint.clone(),
                    is_dev: dep.dev,
                };
                graph.add_dependency(&package.name, &dep.name, edge);
            }
        }

        debug!(
            packages = graph.package_count(),
            dependencies = graph.dependency_count(),
            "loaded dependency snapshot"
        );
        Ok(graph)
    }
}

/// Reads a [`Snapshot`] file from the project directory.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    file: PathBuf,
}

impl Default for SnapshotSource {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_FILE)
    }
}

impl SnapshotSource {
    /// Uses `file`, relative to the project directory unless absolute.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }
}

impl DependencySource for SnapshotSource {
    fn analyze(&self, project_dir: &Path) -> SourceResult<PackageGraph> {
        Snapshot::parse_file(&project_dir.join(&self.file))?.into_graph()
    }
}
