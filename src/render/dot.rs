//! DOT (Graphviz) encoding.

use std::fmt::Write;

use crate::graph::{AttrValue, Attributes, RenderedGraph};

/// Encodes a rendered graph in the DOT language.
///
/// Vertices are identified by their package name; every layout attribute
/// becomes a DOT attribute.
///
/// # Example
///
/// ```rust
/// use graph_composer::graph::{Attributes, RenderedGraph};
/// use graph_composer::render::to_dot;
///
/// let mut graph = RenderedGraph::new();
/// graph.add_vertex("psr/log", Attributes::new().with("shape", "box"));
///
/// assert!(to_dot(&graph).contains("\"psr/log\" [shape=\"box\"];"));
/// ```
pub fn to_dot(graph: &RenderedGraph) -> String {
    let mut out = String::from("digraph G {\n");

    for (_, vertex) in graph.vertices() {
        let _ = writeln!(
            out,
            "  {}{};",
            quote(&vertex.name),
            attribute_list(&vertex.layout)
        );
    }

    for (source, target, edge) in graph.edges() {
        let (Some(source), Some(target)) = (graph.vertex(source), graph.vertex(target)) else {
            continue;
        };
        let _ = writeln!(
            out,
            "  {} -> {}{};",
            quote(&source.name),
            quote(&target.name),
            attribute_list(&edge.layout)
        );
    }

    out.push_str("}\n");
    out
}

fn attribute_list(layout: &Attributes) -> String {
    if layout.is_empty() {
        return String::new();
    }

    let pairs: Vec<String> = layout
        .iter()
        .map(|(key, value)| match value {
            AttrValue::Text(text) => format!("{}={}", key, quote(text)),
            AttrValue::Number(n) => format!("{}={}", key, n),
        })
        .collect();
    format!(" [{}]", pairs.join(" "))
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dot_output() {
        let mut graph = RenderedGraph::new();
        let app = graph.add_vertex(
            "acme/app",
            Attributes::new().with("label", "acme/app: 1.0.0").with("shape", "box"),
        );
        let log = graph.add_vertex("psr/log", Attributes::new());
        graph.add_edge(
            app,
            log,
            Edge {
                constraint: "^3.0".to_string(),
                is_dev: false,
                layout: Attributes::new().with("label", "^3.0").with("fontsize", 10),
            },
        );

        assert_eq!(
            to_dot(&graph),
            "digraph G {\n  \"acme/app\" [label=\"acme/app: 1.0.0\" shape=\"box\"];\n  \"psr/log\";\n  \"acme/app\" -> \"psr/log\" [fontsize=10 label=\"^3.0\"];\n}\n"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(quote("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(to_dot(&RenderedGraph::new()), "digraph G {\n}\n");
    }
}
