//! Resolved package graph using petgraph.
//!
//! Nodes are packages keyed by name, edges are "requires" relationships
//! carrying a version constraint and a dev flag. The graph may contain
//! cycles and diamonds.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt;

/// Index of a package inside a [`PackageGraph`].
pub type PackageId = NodeIndex;

/// A single resolved package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    /// Package name, unique within a graph (e.g. "symfony/console")
    pub name: String,
    /// Installed version, if the source knows it
    pub version: Option<String>,
}

impl PackageNode {
    /// Creates a package without version information.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Creates a package with a known version.
    pub fn with_version(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Returns the version when present and non-empty.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    /// Returns the display label, `name: version` or just `name`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use graph_composer::model::PackageNode;
    ///
    /// assert_eq!(PackageNode::with_version("psr/log", "3.0.0").label(), "psr/log: 3.0.0");
    /// assert_eq!(PackageNode::new("php").label(), "php");
    /// ```
    pub fn label(&self) -> String {
        match self.version() {
            Some(version) => format!("{}: {}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for PackageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Metadata carried by a "requires" edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// Version constraint as declared by the dependent (e.g. "^2.0")
    pub version_constraint: String,
    /// Whether the dependency is only needed for development
    pub is_dev: bool,
}

impl DependencyEdge {
    /// Creates a regular (runtime) dependency edge.
    pub fn new(version_constraint: impl Into<String>) -> Self {
        Self {
            version_constraint: version_constraint.into(),
            is_dev: false,
        }
    }

    /// Creates a development-only dependency edge.
    pub fn dev(version_constraint: impl Into<String>) -> Self {
        Self {
            version_constraint: version_constraint.into(),
            is_dev: true,
        }
    }
}

/// Borrowed view of one outgoing dependency of a package.
#[derive(Debug, Clone, Copy)]
pub struct Dependency<'g> {
    /// The dependent package
    pub source: &'g PackageNode,
    /// The required package
    pub target: &'g PackageNode,
    /// Index of the required package, used to continue a traversal
    pub target_id: PackageId,
    /// Edge metadata
    pub edge: &'g DependencyEdge,
}

impl<'g> Dependency<'g> {
    /// The package this dependency points at.
    pub fn dest_package(&self) -> &'g PackageNode {
        self.target
    }

    /// The declared version constraint.
    pub fn version_constraint(&self) -> &'g str {
        &self.edge.version_constraint
    }

    /// Whether this is a dev dependency.
    pub fn is_dev_dependency(&self) -> bool {
        self.edge.is_dev
    }
}

/// A directed graph of resolved packages anchored at a root package.
///
/// # Example
///
/// ```rust
/// use graph_composer::model::{DependencyEdge, PackageGraph, PackageNode};
///
/// let mut graph = PackageGraph::new(PackageNode::new("acme/app"));
/// graph.add_package("psr/log", Some("3.0.0"));
/// graph.add_dependency("acme/app", "psr/log", DependencyEdge::new("^3.0"));
///
/// let deps = graph.dependencies(graph.root());
/// assert_eq!(deps.len(), 1);
/// assert_eq!(deps[0].dest_package().name, "psr/log");
/// ```
#[derive(Debug, Clone)]
pub struct PackageGraph {
    /// The underlying directed graph
    graph: DiGraph<PackageNode, DependencyEdge>,
    /// Maps package names to their node indices for O(1) lookup
    node_indices: HashMap<String, PackageId>,
    /// The package whose dependencies are being inspected
    root: PackageId,
}

impl PackageGraph {
    /// Creates a graph containing only the root package.
    pub fn new(root: PackageNode) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let name = root.name.clone();
        let idx = graph.add_node(root);
        node_indices.insert(name, idx);

        Self {
            graph,
            node_indices,
            root: idx,
        }
    }

    /// Index of the root package.
    pub fn root(&self) -> PackageId {
        self.root
    }

    /// The root package itself.
    pub fn root_package(&self) -> &PackageNode {
        &self.graph[self.root]
    }

    /// Adds a package to the graph.
    ///
    /// If a package with the same name already exists, returns its
    /// existing index without modification.
    pub fn add_package(&mut self, name: &str, version: Option<&str>) -> PackageId {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }

        let node = PackageNode {
            name: name.to_string(),
            version: version.map(str::to_string),
        };
        let idx = self.graph.add_node(node);
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    /// Adds a dependency edge from `from` (the dependent) to `to`.
    ///
    /// Returns `false` if either package doesn't exist.
    pub fn add_dependency(&mut self, from: &str, to: &str, edge: DependencyEdge) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return false;
        };

        self.graph.add_edge(from_idx, to_idx, edge);
        true
    }

    /// Gets a package by index.
    pub fn package(&self, id: PackageId) -> Option<&PackageNode> {
        self.graph.node_weight(id)
    }

    /// Looks up a package index by name.
    pub fn find(&self, name: &str) -> Option<PackageId> {
        self.node_indices.get(name).copied()
    }

    /// Gets a package by name.
    pub fn get_package(&self, name: &str) -> Option<&PackageNode> {
        self.find(name).and_then(|idx| self.package(idx))
    }

    /// Outgoing dependencies of a package, in the order they were added.
    pub fn dependencies(&self, id: PackageId) -> Vec<Dependency<'_>> {
        let Some(source) = self.graph.node_weight(id) else {
            return Vec::new();
        };

        // petgraph walks adjacency lists newest-first
        let mut edges: Vec<_> = self.graph.edges_directed(id, Direction::Outgoing).collect();
        edges.sort_by_key(|edge| edge.id());

        edges
            .into_iter()
            .filter_map(|edge| {
                let target = self.graph.node_weight(edge.target())?;
                Some(Dependency {
                    source,
                    target,
                    target_id: edge.target(),
                    edge: edge.weight(),
                })
            })
            .collect()
    }

    /// Returns the number of packages, root included.
    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of dependency edges.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks whether a package exists.
    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }
}
