//! Dependency model consumed by the composer.
//!
//! This module provides [`PackageGraph`], the resolved package graph a
//! composition walks, and the [`DependencySource`] trait that produces it.
//!
//! # Example
//!
//! ```rust
//! use graph_composer::model::{DependencyEdge, PackageGraph, PackageNode};
//!
//! let mut graph = PackageGraph::new(PackageNode::with_version("acme/app", "1.0.0"));
//! graph.add_package("psr/log", Some("3.0.0"));
//! graph.add_dependency("acme/app", "psr/log", DependencyEdge::new("^3.0"));
//!
//! assert_eq!(graph.package_count(), 2);
//! assert_eq!(graph.dependency_count(), 1);
//! ```

mod package_graph;
mod snapshot;

pub use package_graph::{Dependency, DependencyEdge, PackageGraph, PackageId, PackageNode};
pub use snapshot::{
    DependencySource, Snapshot, SnapshotDependency, SnapshotPackage, SnapshotSource, SourceError,
    SourceResult, DEFAULT_SNAPSHOT_FILE,
};
