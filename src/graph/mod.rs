//! Graph composition.
//!
//! This module provides [`GraphComposer`], which walks a
//! [`PackageGraph`](crate::model::PackageGraph) from its root and builds a
//! deduplicated, styled [`RenderedGraph`] subject to exclusion rules, a
//! depth limit and the dev-dependency policy.
//!
//! # Example
//!
//! ```rust
//! use graph_composer::graph::GraphComposer;
//! use graph_composer::model::{DependencyEdge, PackageGraph, PackageNode};
//! use graph_composer::status::{StaticReport, VersionStatusClassifier};
//!
//! let mut packages = PackageGraph::new(PackageNode::new("acme/app"));
//! packages.add_package("psr/log", Some("3.0.0"));
//! packages.add_package("phpunit/phpunit", Some("10.5.0"));
//! packages.add_dependency("acme/app", "psr/log", DependencyEdge::new("^3.0"));
//! packages.add_dependency("acme/app", "phpunit/phpunit", DependencyEdge::dev("^10.5"));
//! packages.add_dependency("phpunit/phpunit", "psr/log", DependencyEdge::new("^3.0"));
//!
//! let classifier = VersionStatusClassifier::new(".", StaticReport::default());
//! let composition = GraphComposer::new(packages, classifier).compose();
//!
//! assert_eq!(composition.graph.vertex_count(), 3);
//! assert_eq!(composition.graph.edge_count(), 3);
//! ```

mod composer;
mod rendered;
mod style;

pub use composer::{ComposeError, Composition, GraphComposer};
pub use rendered::{AttrValue, Attributes, DrawnPackages, Edge, RenderedGraph, Vertex, VertexId};
pub use style::{GraphStyle, NEUTRAL_FILL};
