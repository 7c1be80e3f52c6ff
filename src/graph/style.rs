//! Default layouts for drawn packages and dependencies.

use super::rendered::Attributes;

/// Fill color of vertices when colorization is off.
pub const NEUTRAL_FILL: &str = "#eeeeee";

/// Layout bags applied while composing.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStyle {
    /// Base layout of every vertex
    pub vertex: Attributes,
    /// Overrides layered on top of `vertex` for the root package
    pub root_vertex: Attributes,
    /// Layout of regular dependency edges
    pub edge: Attributes,
    /// Layout of dev dependency edges
    pub dev_edge: Attributes,
    /// Fill color used when colorization is off
    pub neutral_fill: String,
}

impl Default for GraphStyle {
    fn default() -> Self {
        let edge = Attributes::new()
            .with("fontcolor", "#767676")
            .with("fontsize", 10)
            .with("color", "#1A2833");

        Self {
            vertex: Attributes::new()
                .with("style", "filled, rounded")
                .with("shape", "box")
                .with("fontcolor", "#314B5F"),
            root_vertex: Attributes::new().with("style", "filled, rounded, bold"),
            dev_edge: edge.clone().with("style", "dashed"),
            edge,
            neutral_fill: NEUTRAL_FILL.to_string(),
        }
    }
}
