//! Composition of a rendered graph from a package graph.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::rendered::{Attributes, DrawnPackages, Edge, RenderedGraph, VertexId};
use super::style::GraphStyle;
use crate::config::ComposerConfig;
use crate::export::{ExportError, ExportStatistics, ExportWriter};
use crate::model::{Dependency, DependencySource, PackageGraph, PackageId, SourceError};
use crate::render::{GraphvizRenderer, RenderError, Renderer};
use crate::rules::{DependencyRule, DependencyRuleChain, PackageRule, PackageRuleChain, RuleError};
use crate::status::VersionStatusClassifier;

/// Errors that can occur while composing, rendering or exporting.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result of one composition.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    /// The graph to render
    pub graph: RenderedGraph,
    /// Every package that got a vertex, root included
    pub drawn: DrawnPackages,
}

/// A package being walked: its vertex and the dependencies still to visit.
struct Frame<'g> {
    vertex: VertexId,
    depth: usize,
    dependencies: std::vec::IntoIter<Dependency<'g>>,
    /// Parent vertex, parent depth and the dependency that led here
    incoming: Option<(VertexId, usize, Dependency<'g>)>,
}

enum Visit<'g> {
    /// Excluded, too deep or unknown
    Skipped,
    /// Drawn earlier, only an edge is added
    Existing(VertexId),
    /// Drawn just now, its dependencies still have to be walked
    Opened(Frame<'g>),
}

/// Walks a package graph from its root and builds a styled, deduplicated
/// graph of it.
///
/// # Example
///
/// ```rust
/// use graph_composer::graph::GraphComposer;
/// use graph_composer::model::{DependencyEdge, PackageGraph, PackageNode};
/// use graph_composer::status::{StaticReport, VersionStatusClassifier};
///
/// let mut packages = PackageGraph::new(PackageNode::new("acme/app"));
/// packages.add_package("psr/log", Some("1.1.4"));
/// packages.add_dependency("acme/app", "psr/log", DependencyEdge::new("^1.1"));
///
/// let report = StaticReport::new("psr/log 1.1.4 ! 3.0.0");
/// let composer = GraphComposer::new(packages, VersionStatusClassifier::new(".", report))
///     .with_colorize(true);
///
/// let composition = composer.compose();
/// let log = composition.graph.find_vertex("psr/log").unwrap();
/// let fill = composition.graph.vertex(log).unwrap().layout.get_str("fillcolor");
/// assert_eq!(fill, Some("#FF7e0d"));
/// ```
pub struct GraphComposer {
    packages: PackageGraph,
    classifier: VersionStatusClassifier,
    package_rule: Box<dyn PackageRule>,
    dependency_rule: Box<dyn DependencyRule>,
    max_depth: usize,
    colorize: bool,
    export_file: Option<PathBuf>,
    exporter: ExportWriter,
    renderer: Box<dyn Renderer>,
    format: String,
    style: GraphStyle,
}

impl GraphComposer {
    /// Creates a composer with no exclusions, unbounded depth and no
    /// colorization, rendering SVG through Graphviz.
    pub fn new(packages: PackageGraph, classifier: VersionStatusClassifier) -> Self {
        Self {
            packages,
            classifier,
            package_rule: Box::new(PackageRuleChain::new()),
            dependency_rule: Box::new(DependencyRuleChain::new()),
            max_depth: usize::MAX,
            colorize: false,
            export_file: None,
            exporter: ExportWriter::default(),
            renderer: Box::new(GraphvizRenderer::default()),
            format: "svg".to_string(),
            style: GraphStyle::default(),
        }
    }

    /// Creates a composer for `config`, loading the dependency model from
    /// `source`. Invalid exclusion patterns are reported here.
    pub fn from_config(config: &ComposerConfig, source: &dyn DependencySource) -> Result<Self, ComposeError> {
        let packages = source.analyze(&config.project_dir)?;
        let package_rule = config.package_rule()?;
        let dependency_rule = config.dependency_rule()?;

        let mut composer = Self::new(packages, config.classifier())
            .with_package_rule(package_rule)
            .with_dependency_rule(dependency_rule)
            .with_max_depth(config.depth_limit())
            .with_colorize(config.colorize);
        composer.set_format(&config.format);
        if let Some(export_file) = &config.export_file {
            composer = composer.with_export_file(export_file);
        }
        Ok(composer)
    }

    /// Replaces the package exclusion rule.
    pub fn with_package_rule(mut self, rule: impl PackageRule + 'static) -> Self {
        self.package_rule = Box::new(rule);
        self
    }

    /// Replaces the dependency exclusion rule.
    pub fn with_dependency_rule(mut self, rule: impl DependencyRule + 'static) -> Self {
        self.dependency_rule = Box::new(rule);
        self
    }

    /// Limits how many levels below the root are drawn.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fills vertices by version status instead of a neutral color.
    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    /// Writes dependency statistics to `path` whenever a graph is created.
    pub fn with_export_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_file = Some(path.into());
        self
    }

    /// Replaces the statistics writer (and with it the known formats).
    pub fn with_exporter(mut self, exporter: ExportWriter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Replaces the rendering backend.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replaces the layout bags.
    pub fn with_style(mut self, style: GraphStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the image format used by [`display_graph`](Self::display_graph)
    /// and [`image_path`](Self::image_path).
    pub fn set_format(&mut self, format: &str) -> &mut Self {
        self.format = format.to_string();
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn packages(&self) -> &PackageGraph {
        &self.packages
    }

    pub fn classifier(&self) -> &VersionStatusClassifier {
        &self.classifier
    }

    /// Walks the package graph and builds a fresh composition.
    pub fn compose(&self) -> Composition {
        let mut composition = Composition::default();
        let root = self.packages.root();
        if let Visit::Opened(frame) = self.visit(&mut composition, root, Some(&self.style.root_vertex), 0) {
            self.draw_from(&mut composition, frame);
        }

        info!(
            vertices = composition.graph.vertex_count(),
            edges = composition.graph.edge_count(),
            "composed dependency graph"
        );
        composition
    }

    /// Composes the graph and, if an export file is configured, writes its
    /// statistics. A failed export doesn't undo the composition, but the
    /// error is returned.
    pub fn create_graph(&self) -> Result<RenderedGraph, ComposeError> {
        let composition = self.compose();

        if let Some(path) = &self.export_file {
            self.export(&composition, path)?;
        }

        Ok(composition.graph)
    }

    /// Creates the graph and opens it in the system viewer.
    pub fn display_graph(&self) -> Result<PathBuf, ComposeError> {
        let graph = self.create_graph()?;
        Ok(self.renderer.display(&graph, &self.format)?)
    }

    /// Creates the graph and renders it to a new image file.
    pub fn image_path(&self) -> Result<PathBuf, ComposeError> {
        let graph = self.create_graph()?;
        Ok(self.renderer.render(&graph, &self.format)?)
    }

    /// Creates the graph and renders it to `output`.
    pub fn write_image(&self, output: &Path) -> Result<(), ComposeError> {
        let graph = self.create_graph()?;
        Ok(self.renderer.render_to(&graph, &self.format, output)?)
    }

    /// Reduces a composition to its statistics.
    pub fn statistics(&self, composition: &Composition) -> ExportStatistics {
        let root_dependencies = self.packages.dependencies(self.packages.root());
        ExportStatistics::aggregate(&composition.drawn, self.classifier.statuses(), &root_dependencies)
    }

    /// Writes the statistics of a composition to `path`.
    ///
    /// The destination is validated before the version report is touched.
    pub fn export(&self, composition: &Composition, path: &Path) -> Result<ExportStatistics, ExportError> {
        self.exporter.validate(path)?;
        let stats = self.statistics(composition);
        self.exporter.write(&stats, path)?;
        Ok(stats)
    }

    /// Materializes `id` if it may be drawn at `depth`.
    fn visit<'g>(
        &'g self,
        out: &mut Composition,
        id: PackageId,
        layout_override: Option<&Attributes>,
        depth: usize,
    ) -> Visit<'g> {
        let Some(package) = self.packages.package(id) else {
            return Visit::Skipped;
        };

        // the root always anchors the graph, exclusion starts one level down
        if depth > 0 && self.package_rule.is_excluded(package) {
            debug!(package = %package.name, depth, "package excluded");
            return Visit::Skipped;
        }

        // drawn once, later parents only get an edge to it
        if let Some(vertex) = out.drawn.get(&package.name) {
            return Visit::Existing(vertex);
        }

        if depth > self.max_depth {
            return Visit::Skipped;
        }

        let mut layout = self.style.vertex.clone();
        if let Some(layout_override) = layout_override {
            layout.merge(layout_override);
        }
        layout.set("fillcolor", self.fill_color(&package.name));
        layout.set("label", package.label());

        let vertex = out.graph.add_vertex(package.name.as_str(), layout);
        out.drawn.insert(package.name.as_str(), vertex);
        debug!(package = %package.name, depth, "package drawn");

        Visit::Opened(Frame {
            vertex,
            depth,
            dependencies: self.packages.dependencies(id).into_iter(),
            incoming: None,
        })
    }

    /// Depth-first walk over an explicit stack, so chain length is bounded
    /// by memory rather than by the thread's stack.
    ///
    /// Vertices are added when first reached and the edge into a new vertex
    /// once its subtree is done, the same order a recursive walk produces.
    fn draw_from<'g>(&'g self, out: &mut Composition, root: Frame<'g>) {
        let mut stack = vec![root];

        while let Some(frame) = stack.last_mut() {
            let Some(dependency) = frame.dependencies.next() else {
                if let Some(Frame {
                    vertex,
                    incoming: Some((parent, parent_depth, dependency)),
                    ..
                }) = stack.pop()
                {
                    self.link(out, parent, vertex, parent_depth, &dependency);
                }
                continue;
            };
            let (parent, depth) = (frame.vertex, frame.depth);

            if self.dependency_rule.is_excluded(&dependency) {
                continue;
            }

            // dev dependencies of dependencies are never installed
            if depth > 0 && dependency.is_dev_dependency() {
                continue;
            }

            match self.visit(out, dependency.target_id, None, depth + 1) {
                Visit::Skipped => {}
                Visit::Existing(target) => self.link(out, parent, target, depth, &dependency),
                Visit::Opened(mut child) => {
                    child.incoming = Some((parent, depth, dependency));
                    stack.push(child);
                }
            }
        }
    }

    fn link(&self, out: &mut Composition, from: VertexId, to: VertexId, depth: usize, dependency: &Dependency<'_>) {
        // nodes on the last level keep no outgoing edges
        if depth >= self.max_depth {
            return;
        }

        let base = if dependency.is_dev_dependency() {
            &self.style.dev_edge
        } else {
            &self.style.edge
        };
        let edge = Edge {
            constraint: dependency.version_constraint().to_string(),
            is_dev: dependency.is_dev_dependency(),
            layout: base.clone().with("label", dependency.version_constraint()),
        };
        out.graph.add_edge(from, to, edge);
    }

    fn fill_color(&self, package: &str) -> String {
        if self.colorize {
            self.classifier.status(package).color().to_string()
        } else {
            self.style.neutral_fill.clone()
        }
    }
}

impl fmt::Debug for GraphComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphComposer")
            .field("root", &self.packages.root_package().name)
            .field("max_depth", &self.max_depth)
            .field("colorize", &self.colorize)
            .field("export_file", &self.export_file)
            .field("format", &self.format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DependencyEdge, PackageNode};
    use crate::rules::NamePatternRule;
    use crate::status::StaticReport;
    use std::cell::Cell;
    use std::rc::Rc;

    fn classifier() -> VersionStatusClassifier {
        VersionStatusClassifier::new(".", StaticReport::default())
    }

    fn composer(packages: PackageGraph) -> GraphComposer {
        GraphComposer::new(packages, classifier())
    }

    /// root -> a -> c, root -> b -> c
    fn diamond() -> PackageGraph {
        let mut graph = PackageGraph::new(PackageNode::with_version("root", "1.0.0"));
        for name in ["a", "b", "c"] {
            graph.add_package(name, Some("1.0.0"));
        }
        graph.add_dependency("root", "a", DependencyEdge::new("^1.0"));
        graph.add_dependency("root", "b", DependencyEdge::new("^1.0"));
        graph.add_dependency("a", "c", DependencyEdge::new("^1.0"));
        graph.add_dependency("b", "c", DependencyEdge::new("~1.0"));
        graph
    }

    #[test]
    fn test_diamond_draws_shared_dependency_once() {
        let composition = composer(diamond()).compose();

        assert_eq!(composition.graph.vertex_count(), 4);
        assert_eq!(composition.graph.edge_count(), 4);
        assert_eq!(composition.drawn.len(), 4);
        assert_eq!(composition.graph.targets_of("a"), vec!["c"]);
        assert_eq!(composition.graph.targets_of("b"), vec!["c"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = PackageGraph::new(PackageNode::new("a"));
        graph.add_package("b", None);
        graph.add_dependency("a", "b", DependencyEdge::new("*"));
        graph.add_dependency("b", "a", DependencyEdge::new("*"));

        let composition = composer(graph).compose();
        assert_eq!(composition.graph.vertex_count(), 2);
        assert!(composition.graph.edge_between("a", "b").is_some());
        assert!(composition.graph.edge_between("b", "a").is_some());
    }

    #[test]
    fn test_cycle_back_to_root_keeps_root_style() {
        let mut graph = PackageGraph::new(PackageNode::with_version("a", "1.0.0"));
        graph.add_package("b", Some("1.0.0"));
        graph.add_dependency("a", "b", DependencyEdge::new("^1.0"));
        graph.add_dependency("b", "a", DependencyEdge::new("^1.0"));

        let composition = composer(graph).compose();
        let root = composition.graph.vertex(composition.drawn.get("a").unwrap()).unwrap();
        let b = composition.graph.vertex(composition.drawn.get("b").unwrap()).unwrap();

        assert_eq!(composition.graph.vertex_count(), 2);
        assert_eq!(root.layout.get_str("style"), Some("filled, rounded, bold"));
        assert_eq!(b.layout.get_str("style"), Some("filled, rounded"));
    }

    #[test]
    fn test_long_chain_does_not_exhaust_stack() {
        const LEN: usize = 50_000;
        let mut graph = PackageGraph::new(PackageNode::new("p0"));
        for i in 1..LEN {
            graph.add_package(&format!("p{}", i), Some("1.0.0"));
            graph.add_dependency(&format!("p{}", i - 1), &format!("p{}", i), DependencyEdge::new("*"));
        }

        let composition = composer(graph).compose();
        assert_eq!(composition.graph.vertex_count(), LEN);
        assert_eq!(composition.graph.edge_count(), LEN - 1);
        assert!(composition.graph.edge_between("p49998", "p49999").is_some());
    }

    #[test]
    fn test_edges_added_after_subtree() {
        // root -> a -> c, root -> b: a's subtree edge comes before root -> b
        let mut graph = PackageGraph::new(PackageNode::new("root"));
        for name in ["a", "b", "c"] {
            graph.add_package(name, None);
        }
        graph.add_dependency("root", "a", DependencyEdge::new("*"));
        graph.add_dependency("root", "b", DependencyEdge::new("*"));
        graph.add_dependency("a", "c", DependencyEdge::new("*"));

        let composition = composer(graph).compose();
        let name = |id: VertexId| composition.graph.vertex(id).map(|v| v.name.as_str());
        let order: Vec<_> = composition
            .graph
            .edges()
            .map(|(from, to, _)| (name(from), name(to)))
            .collect();
        assert_eq!(
            order,
            vec![
                (Some("a"), Some("c")),
                (Some("root"), Some("a")),
                (Some("root"), Some("b")),
            ]
        );
    }

    #[test]
    fn test_root_is_never_excluded() {
        let composition = composer(diamond())
            .with_package_rule(NamePatternRule::new("^root$").unwrap())
            .compose();

        assert!(composition.drawn.contains("root"));
        assert_eq!(composition.graph.vertex_count(), 4);
    }

    #[test]
    fn test_excluded_package_and_its_edges_are_dropped() {
        let composition = composer(diamond())
            .with_package_rule(NamePatternRule::new("^a$").unwrap())
            .compose();

        assert!(!composition.drawn.contains("a"));
        assert!(composition.drawn.contains("c"));
        assert_eq!(composition.graph.targets_of("root"), vec!["b"]);
    }

    #[test]
    fn test_exclusion_is_evaluated_per_occurrence() {
        // only excluded when reached through "a"
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let rule = move |p: &PackageNode| {
            if p.name != "c" {
                return false;
            }
            counter.set(counter.get() + 1);
            counter.get() == 1
        };

        let composition = composer(diamond()).with_package_rule(rule).compose();
        assert!(composition.drawn.contains("c"));
        assert_eq!(composition.graph.targets_of("a"), Vec::<&str>::new());
        assert_eq!(composition.graph.targets_of("b"), vec!["c"]);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_dependency_rule_skips_edges() {
        let composition = composer(diamond())
            .with_dependency_rule(|d: &crate::model::Dependency<'_>| d.version_constraint() == "~1.0")
            .compose();

        assert_eq!(composition.graph.edge_count(), 3);
        assert!(composition.graph.edge_between("b", "c").is_none());
    }

    #[test]
    fn test_dev_dependencies_only_at_root() {
        let mut graph = PackageGraph::new(PackageNode::new("root"));
        graph.add_package("a", None);
        graph.add_package("b", None);
        graph.add_dependency("root", "a", DependencyEdge::dev("^1.0"));
        graph.add_dependency("a", "b", DependencyEdge::dev("^2.0"));

        let composition = composer(graph).compose();
        let edge = composition.graph.edge_between("root", "a").unwrap();

        assert!(edge.is_dev);
        assert_eq!(edge.layout.get_str("style"), Some("dashed"));
        assert!(!composition.drawn.contains("b"));
        assert_eq!(composition.graph.edge_count(), 1);
    }

    #[test]
    fn test_max_depth_one() {
        let mut graph = PackageGraph::new(PackageNode::new("root"));
        graph.add_package("a", None);
        graph.add_package("b", None);
        graph.add_dependency("root", "a", DependencyEdge::new("*"));
        graph.add_dependency("a", "b", DependencyEdge::new("*"));

        let composition = composer(graph).with_max_depth(1).compose();
        assert_eq!(composition.graph.vertex_count(), 2);
        assert_eq!(composition.graph.edge_count(), 1);
        assert!(!composition.drawn.contains("b"));
    }

    #[test]
    fn test_max_depth_zero_draws_root_only() {
        let composition = composer(diamond()).with_max_depth(0).compose();
        assert_eq!(composition.graph.vertex_count(), 1);
        assert_eq!(composition.graph.edge_count(), 0);
    }

    #[test]
    fn test_no_edge_from_last_level_to_drawn_package() {
        // root -> a -> b, root -> b: b is drawn at depth 1, a's edge to it
        // would start on the last level
        let mut graph = PackageGraph::new(PackageNode::new("root"));
        graph.add_package("a", None);
        graph.add_package("b", None);
        graph.add_dependency("root", "b", DependencyEdge::new("*"));
        graph.add_dependency("root", "a", DependencyEdge::new("*"));
        graph.add_dependency("a", "b", DependencyEdge::new("*"));

        let composition = composer(graph).with_max_depth(1).compose();
        assert_eq!(composition.graph.vertex_count(), 3);
        assert!(composition.graph.edge_between("a", "b").is_none());
    }

    #[test]
    fn test_labels_and_root_style() {
        let mut graph = PackageGraph::new(PackageNode::with_version("root", "2.0.0"));
        graph.add_package("php", None);
        graph.add_dependency("root", "php", DependencyEdge::new(">=8.1"));

        let composition = composer(graph).compose();
        let root = composition.graph.vertex(composition.drawn.get("root").unwrap()).unwrap();
        let php = composition.graph.vertex(composition.drawn.get("php").unwrap()).unwrap();

        assert_eq!(root.layout.get_str("label"), Some("root: 2.0.0"));
        assert_eq!(root.layout.get_str("style"), Some("filled, rounded, bold"));
        assert_eq!(root.layout.get_str("shape"), Some("box"));
        assert_eq!(php.layout.get_str("label"), Some("php"));
        assert_eq!(php.layout.get_str("style"), Some("filled, rounded"));
        assert_eq!(php.layout.get_str("fillcolor"), Some("#eeeeee"));
        assert_eq!(
            composition.graph.edge_between("root", "php").unwrap().layout.get_str("label"),
            Some(">=8.1")
        );
    }

    #[test]
    fn test_colorize_uses_status_colors() {
        let report = StaticReport::new("a 1.0.0 ! 2.0.0\nPackage b is abandoned");
        let composer = GraphComposer::new(diamond(), VersionStatusClassifier::new(".", report))
            .with_colorize(true);
        let composition = composer.compose();

        let fill = |name: &str| {
            let id = composition.drawn.get(name).unwrap();
            composition.graph.vertex(id).unwrap().layout.get_str("fillcolor").map(str::to_string)
        };
        assert_eq!(fill("a").as_deref(), Some("#FF7e0d"));
        assert_eq!(fill("b").as_deref(), Some("#FF5A52"));
        assert_eq!(fill("c").as_deref(), Some("#3ABA4D"));
    }

    #[test]
    fn test_edges_follow_model_order() {
        let composition = composer(diamond()).compose();
        assert_eq!(composition.graph.targets_of("root"), vec!["a", "b"]);
    }

    #[test]
    fn test_compose_is_repeatable() {
        let composer = composer(diamond());
        let first = composer.compose();
        let second = composer.compose();
        assert_eq!(first.drawn, second.drawn);
        assert_eq!(first.graph.edge_count(), second.graph.edge_count());
    }

    #[test]
    fn test_export_writes_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let composer = composer(diamond()).with_export_file(&path);

        let graph = composer.create_graph().unwrap();
        assert_eq!(graph.vertex_count(), 4);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["dependencies"]["direct"], 2);
        assert_eq!(json["dependencies"]["indirect"], 1);
        assert_eq!(json["dependencyStatus"]["latest"], 3);
    }

    #[test]
    fn test_invalid_export_file_name_fails() {
        let composer = composer(diamond()).with_export_file("stats");
        assert!(matches!(
            composer.create_graph(),
            Err(ComposeError::Export(ExportError::InvalidFileName(_)))
        ));
    }
}
