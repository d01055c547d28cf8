//! Edge type and related structures.
//!
//! Edges are directed parent→child links between agents. Each edge has:
//! - An identifier (backend convention: `"<source>-<target>"`)
//! - Source and target node ids
//! - Optional rendering hints (curve type, animation, renderer style)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::null_as_empty;

/// A directed edge of an agent network.
///
/// `style` and any key the layout does not read (`sourceHandle`, `label`,
/// `markerEnd`, ...) pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Map::is_empty", deserialize_with = "null_as_empty")]
    pub style: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphEdge {
    /// Create an edge with the backend's `"<source>-<target>"` id.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{source}-{target}"),
            source,
            target,
            curve: None,
            animated: None,
            style: Map::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style setter for the animation flag.
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = Some(animated);
        self
    }

    /// True for edges whose source and target coincide.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Rendering defaults stamped onto edges by the layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeRenderHints {
    pub curve: String,
    pub animated: bool,
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for EdgeRenderHints {
    fn default() -> Self {
        Self {
            curve: "smoothstep".to_string(),
            animated: true,
            stroke: "#999999".to_string(),
            stroke_width: 2.0,
        }
    }
}

impl EdgeRenderHints {
    /// Copy of `edge` with every missing hint filled in. Hints the edge
    /// already carries are left alone, including partial styles.
    pub fn annotate(&self, edge: &GraphEdge) -> GraphEdge {
        let mut out = edge.clone();
        if out.id.is_empty() {
            out.id = format!("{}-{}", out.source, out.target);
        }
        out.curve.get_or_insert_with(|| self.curve.clone());
        out.animated.get_or_insert(self.animated);
        out.style
            .entry("stroke")
            .or_insert_with(|| self.stroke.clone().into());
        out.style
            .entry("strokeWidth")
            .or_insert_with(|| self.stroke_width.into());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_id_convention() {
        let edge = GraphEdge::new("A", "B");
        assert_eq!(edge.id, "A-B");
        assert!(!edge.is_self_loop());
        assert!(GraphEdge::new("A", "A").is_self_loop());
    }

    #[test]
    fn test_annotate_fills_missing() {
        let hints = EdgeRenderHints::default();
        let edge: GraphEdge =
            serde_json::from_value(json!({ "source": "A", "target": "B" })).unwrap();
        let out = hints.annotate(&edge);

        assert_eq!(out.id, "A-B");
        assert_eq!(out.curve.as_deref(), Some("smoothstep"));
        assert_eq!(out.animated, Some(true));
        assert_eq!(out.style["stroke"], "#999999");
        assert_eq!(out.style["strokeWidth"], 2.0);
    }

    #[test]
    fn test_annotate_keeps_existing() {
        let hints = EdgeRenderHints::default();
        let edge = GraphEdge::new("A", "B").animated(false);
        let out = hints.annotate(&edge);
        assert_eq!(out.animated, Some(false));
    }

    #[test]
    fn test_annotate_keeps_partial_style() {
        let edge: GraphEdge = serde_json::from_value(json!({
            "source": "A",
            "target": "B",
            "style": { "stroke": "red", "strokeDasharray": "5 5" },
        }))
        .unwrap();
        let out = EdgeRenderHints::default().annotate(&edge);

        assert_eq!(out.style["stroke"], "red");
        assert_eq!(out.style["strokeDasharray"], "5 5");
        assert_eq!(out.style["strokeWidth"], 2.0);
    }

    #[test]
    fn test_unknown_keys_survive_annotate() {
        let edge: GraphEdge = serde_json::from_value(json!({
            "id": "e1",
            "source": "A",
            "target": "B",
            "sourceHandle": "out",
            "label": "calls",
            "style": null,
        }))
        .unwrap();
        let value = serde_json::to_value(EdgeRenderHints::default().annotate(&edge)).unwrap();

        assert_eq!(value["sourceHandle"], "out");
        assert_eq!(value["label"], "calls");
        assert_eq!(value["style"]["stroke"], "#999999");
    }

    #[test]
    fn test_serialize_shape() {
        let edge = EdgeRenderHints::default().annotate(&GraphEdge::new("A", "B"));
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["type"], "smoothstep");
        assert_eq!(value["style"]["strokeWidth"], 2.0);
    }
}
