//! Rendered graph: vertices and edges with layout attribute bags.
//!
//! Every vertex and edge keeps its domain data (package name, version
//! constraint) apart from its [`Attributes`] bag, so layout keys such as
//! `label` can never clobber business data.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Handle of a vertex inside a [`RenderedGraph`].
pub type VertexId = NodeIndex;

/// A single layout attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => write!(f, "{}", text),
            AttrValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(i64::from(value))
    }
}

/// Ordered bag of layout attributes.
///
/// # Example
///
/// ```rust
/// use graph_composer::graph::Attributes;
///
/// let layout = Attributes::new().with("shape", "box").with("fontsize", 10);
/// assert_eq!(layout.get_str("shape"), Some("box"));
/// assert_eq!(layout.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute and returns the bag.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Copies every attribute of `other` over this bag.
    pub fn merge(&mut self, other: &Attributes) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    /// Returns a text attribute.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(AttrValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.set(key, value);
        }
        attributes
    }
}

/// A drawn package.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Package name
    pub name: String,
    /// Layout attributes
    pub layout: Attributes,
}

/// A drawn dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Version constraint of the dependency
    pub constraint: String,
    /// Whether the dependency is dev-only
    pub is_dev: bool,
    /// Layout attributes
    pub layout: Attributes,
}

/// The output of a composition, ready to be handed to a renderer.
#[derive(Debug, Clone, Default)]
pub struct RenderedGraph {
    graph: DiGraph<Vertex, Edge>,
}

impl RenderedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex. Callers are responsible for keeping names unique.
    pub fn add_vertex(&mut self, name: impl Into<String>, layout: Attributes) -> VertexId {
        self.graph.add_node(Vertex {
            name: name.into(),
            layout,
        })
    }

    /// Adds an edge between two existing vertices.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, edge: Edge) -> EdgeIndex {
        self.graph.add_edge(from, to, edge)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.node_weight(id)
    }

    /// Finds a vertex by package name.
    pub fn find_vertex(&self, name: &str) -> Option<VertexId> {
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].name == name)
    }

    /// All vertices with their handles, in creation order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx).map(|v| (idx, v)))
    }

    /// All edges as `(source, target, edge)`, in creation order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId, &Edge)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), edge.weight()))
    }

    /// Names of the packages a vertex points at, in creation order.
    pub fn targets_of(&self, name: &str) -> Vec<&str> {
        self.edges()
            .filter(|(source, _, _)| self.graph[*source].name == name)
            .filter_map(|(_, target, _)| self.vertex(target).map(|v| v.name.as_str()))
            .collect()
    }

    /// Returns the edge from `from` to `to`, both given by package name.
    pub fn edge_between(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges()
            .find(|(source, target, _)| {
                self.graph[*source].name == from && self.graph[*target].name == to
            })
            .map(|(_, _, edge)| edge)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// Packages drawn so far, keyed by name.
///
/// At most one vertex exists per package name; once present, a package
/// is never visited or styled again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawnPackages {
    vertices: HashMap<String, VertexId>,
}

impl DrawnPackages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<VertexId> {
        self.vertices.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vertices.contains_key(name)
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, vertex: VertexId) {
        self.vertices.insert(name.into(), vertex);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vertices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}
