//! Export of dependency statistics.
//!
//! After a composition, the drawn packages and their version statuses are
//! reduced to [`ExportStatistics`] and written through an [`Exporter`]
//! picked by the destination file's extension.

pub mod json;

use crate::graph::DrawnPackages;
use crate::model::Dependency;
use crate::status::VersionStatus;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors that can occur while exporting statistics.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The destination has no `<name>.<extension>` shape.
    #[error("Invalid export file name {}", .0.display())]
    InvalidFileName(PathBuf),

    /// No exporter is registered for the extension.
    #[error("Not supported export format {0}")]
    UnsupportedFormat(String),

    /// Writing the destination failed.
    #[error("Failed to write export file: {0}")]
    Io(#[from] io::Error),
}

/// Dependency counts of a composed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DependencyCounts {
    /// Dependencies required by the root package
    pub direct: usize,
    /// Dependencies pulled in by other dependencies
    pub indirect: usize,
    /// All drawn packages except the root
    pub total: usize,
}

/// Per-status package counts of a composed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub latest: usize,
    pub patch_available: usize,
    pub minor_available: usize,
    pub major_available: usize,
    pub abandoned: usize,
}

/// Summary of a composed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportStatistics {
    pub dependencies: DependencyCounts,
    pub dependency_status: StatusCounts,
}

impl ExportStatistics {
    /// Reduces a composition to its statistics.
    ///
    /// Statuses of packages that were not drawn are ignored, and every
    /// drawn package without an outdated status counts as latest.
    pub fn aggregate(
        drawn: &DrawnPackages,
        statuses: &HashMap<String, VersionStatus>,
        root_dependencies: &[Dependency<'_>],
    ) -> Self {
        let drawn_statuses: Vec<VersionStatus> = statuses
            .iter()
            .filter(|(name, _)| drawn.contains(name))
            .map(|(_, &status)| status)
            .collect();
        let count = |status: VersionStatus| drawn_statuses.iter().filter(|&&s| s == status).count();

        // a package required both normally and as dev counts once
        let direct = root_dependencies
            .iter()
            .map(|d| d.dest_package().name.as_str())
            .filter(|name| drawn.contains(name))
            .collect::<HashSet<_>>()
            .len();
        // minus one for the root package
        let total = drawn.len().saturating_sub(1);
        let outdated = drawn_statuses.iter().filter(|s| s.is_outdated()).count();

        Self {
            dependencies: DependencyCounts {
                direct,
                indirect: total.saturating_sub(direct),
                total,
            },
            dependency_status: StatusCounts {
                latest: total.saturating_sub(outdated),
                patch_available: count(VersionStatus::PatchAvailable),
                minor_available: count(VersionStatus::MinorAvailable),
                major_available: count(VersionStatus::MajorAvailable),
                abandoned: count(VersionStatus::Abandoned),
            },
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the statistics to the given writer.
    fn export(&self, stats: &ExportStatistics, writer: &mut dyn Write) -> io::Result<()>;
}

/// Export statistics to a string.
pub fn export_to_string(exporter: &dyn Exporter, stats: &ExportStatistics) -> io::Result<String> {
    let mut buffer = Vec::new();
    exporter.export(stats, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Constructor registered for an export format.
pub type ExporterFactory = fn() -> Box<dyn Exporter>;

/// Maps export formats (file extensions) to exporters.
///
/// Lookups are case-insensitive. The default registry knows `json`.
#[derive(Debug, Clone)]
pub struct ExporterRegistry {
    factories: HashMap<String, ExporterFactory>,
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("json", || Box::new(json::JsonExporter));
        registry
    }
}

impl ExporterRegistry {
    /// A registry without any format.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers (or replaces) the exporter for `format`.
    pub fn register(&mut self, format: &str, factory: ExporterFactory) {
        self.factories.insert(format.to_lowercase(), factory);
    }

    /// Creates the exporter for `format`.
    pub fn get(&self, format: &str) -> Result<Box<dyn Exporter>, ExportError> {
        self.factories
            .get(&format.to_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| ExportError::UnsupportedFormat(format.to_uppercase()))
    }

    pub fn supports(&self, format: &str) -> bool {
        self.factories.contains_key(&format.to_lowercase())
    }

    /// Registered formats, sorted.
    pub fn formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        formats.sort_unstable();
        formats
    }
}

/// Returns the extension of an export destination.
///
/// The file name must look like `<name>.<extension>` with a word-character
/// extension.
pub fn export_extension(path: &Path) -> Result<&str, ExportError> {
    let invalid = || ExportError::InvalidFileName(path.to_path_buf());

    let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    let (stem, extension) = file_name.rsplit_once('.').ok_or_else(invalid)?;

    let word = |c: char| c.is_alphanumeric() || c == '_';
    if stem.is_empty() || extension.is_empty() || !extension.chars().all(word) {
        return Err(invalid());
    }
    Ok(extension)
}

/// Writes statistics to files, choosing the format by extension.
#[derive(Debug, Clone, Default)]
pub struct ExportWriter {
    registry: ExporterRegistry,
}

impl ExportWriter {
    pub fn new(registry: ExporterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ExporterRegistry {
        &self.registry
    }

    /// Checks that `path` can be written, without touching the file system.
    pub fn validate(&self, path: &Path) -> Result<(), ExportError> {
        let extension = export_extension(path)?;
        self.registry.get(extension).map(|_| ())
    }

    /// Writes `stats` to `path`.
    pub fn write(&self, stats: &ExportStatistics, path: &Path) -> Result<(), ExportError> {
        let exporter = self.registry.get(export_extension(path)?)?;

        let mut writer = BufWriter::new(File::create(path)?);
        exporter.export(stats, &mut writer)?;
        writer.flush()?;

        info!(path = %path.display(), total = stats.dependencies.total, "exported statistics");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DependencyEdge, PackageGraph, PackageNode};
    use petgraph::graph::NodeIndex;

    fn drawn(names: &[&str]) -> DrawnPackages {
        let mut drawn = DrawnPackages::new();
        for (i, name) in names.iter().enumerate() {
            drawn.insert(*name, NodeIndex::new(i));
        }
        drawn
    }

    fn packages() -> PackageGraph {
        let mut graph = PackageGraph::new(PackageNode::new("root"));
        for name in ["a", "b", "c", "d", "e", "hidden"] {
            graph.add_package(name, Some("1.0.0"));
        }
        for name in ["a", "b", "c", "hidden"] {
            graph.add_dependency("root", name, DependencyEdge::new("^1.0"));
        }
        graph.add_dependency("a", "d", DependencyEdge::new("^1.0"));
        graph.add_dependency("b", "e", DependencyEdge::new("^1.0"));
        graph
    }

    #[test]
    fn test_aggregate_counts() {
        let graph = packages();
        let drawn = drawn(&["root", "a", "b", "c", "d", "e"]);
        let statuses = HashMap::from([
            ("a".to_string(), VersionStatus::MajorAvailable),
            ("d".to_string(), VersionStatus::PatchAvailable),
            ("e".to_string(), VersionStatus::Abandoned),
            ("hidden".to_string(), VersionStatus::MinorAvailable),
        ]);

        let stats = ExportStatistics::aggregate(&drawn, &statuses, &graph.dependencies(graph.root()));

        assert_eq!(
            stats.dependencies,
            DependencyCounts {
                direct: 3,
                indirect: 2,
                total: 5
            }
        );
        assert_eq!(
            stats.dependency_status,
            StatusCounts {
                latest: 2,
                patch_available: 1,
                minor_available: 0,
                major_available: 1,
                abandoned: 1,
            }
        );
    }

    #[test]
    fn test_reported_latest_entries_count_as_latest() {
        let graph = packages();
        let drawn = drawn(&["root", "a"]);
        let statuses = HashMap::from([("a".to_string(), VersionStatus::Latest)]);

        let stats = ExportStatistics::aggregate(&drawn, &statuses, &graph.dependencies(graph.root()));
        assert_eq!(stats.dependency_status.latest, 1);
    }

    #[test]
    fn test_direct_counts_each_package_once() {
        let mut graph = PackageGraph::new(PackageNode::new("root"));
        graph.add_package("x", Some("1.0.0"));
        graph.add_dependency("root", "x", DependencyEdge::new("^1.0"));
        graph.add_dependency("root", "x", DependencyEdge::dev("^1.0"));

        let stats = ExportStatistics::aggregate(
            &drawn(&["root", "x"]),
            &HashMap::new(),
            &graph.dependencies(graph.root()),
        );
        assert_eq!(
            stats.dependencies,
            DependencyCounts {
                direct: 1,
                indirect: 0,
                total: 1
            }
        );
    }

    #[test]
    fn test_aggregate_root_only() {
        let stats = ExportStatistics::aggregate(&drawn(&["root"]), &HashMap::new(), &[]);
        assert_eq!(stats, ExportStatistics::default());
    }

    #[test]
    fn test_export_extension() {
        assert_eq!(export_extension(Path::new("stats.json")).unwrap(), "json");
        assert_eq!(export_extension(Path::new("out/report.v2.JSON")).unwrap(), "JSON");
        assert!(export_extension(Path::new("stats")).is_err());
        assert!(export_extension(Path::new(".json")).is_err());
        assert!(export_extension(Path::new("stats.")).is_err());
        assert!(export_extension(Path::new("stats.js-on")).is_err());
    }

    #[test]
    fn test_registry_is_case_insensitive() {
        let registry = ExporterRegistry::default();
        assert!(registry.supports("JSON"));
        assert!(registry.get("Json").is_ok());
        assert_eq!(registry.formats(), vec!["json"]);
    }

    #[test]
    fn test_unsupported_format_names_extension() {
        let err = ExporterRegistry::default().get("xml").err().unwrap();
        assert!(matches!(err, ExportError::UnsupportedFormat(ref f) if f == "XML"));
        assert!(err.to_string().contains("XML"));
    }

    struct CountExporter;

    impl Exporter for CountExporter {
        fn export(&self, stats: &ExportStatistics, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(writer, "{}", stats.dependencies.total)
        }
    }

    #[test]
    fn test_custom_exporter_registration() {
        let mut registry = ExporterRegistry::empty();
        assert!(registry.get("json").is_err());

        registry.register("TXT", || Box::new(CountExporter));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.txt");

        ExportWriter::new(registry)
            .write(&ExportStatistics::default(), &path)
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "0\n");
    }

    #[test]
    fn test_writer_rejects_before_creating_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::default();

        let path = dir.path().join("stats.xml");
        assert!(matches!(
            writer.write(&ExportStatistics::default(), &path),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(!path.exists());

        let path = dir.path().join("stats");
        assert!(matches!(
            writer.validate(&path),
            Err(ExportError::InvalidFileName(_))
        ));
    }
}
