//! Node type and related structures.
//!
//! Nodes are the agents of a network as delivered by the backend. Each node has:
//! - A string identifier, unique within one network snapshot
//! - A free-form `type` tag and `data` payload used by the renderer
//! - An optional renderer `style`, from which a rendered size may be read
//! - A position, assigned by a layout pass

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A point in graph space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point `radius` away from `self` in direction `angle` (radians).
    #[inline]
    pub fn polar_offset(self, radius: f64, angle: f64) -> Self {
        Self {
            x: self.x + radius * angle.cos(),
            y: self.y + radius * angle.sin(),
        }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// True when both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn default_node_type() -> String {
    "agent".to_string()
}

/// Reads an object field, treating an explicit `null` as empty.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A node of an agent network.
///
/// Keys the layout does not read (`selected`, `className`, handles, ...)
/// are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
    /// Renderer style, passed through as given.
    #[serde(default, skip_serializing_if = "Map::is_empty", deserialize_with = "null_as_empty")]
    pub style: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphNode {
    /// Create an agent node with an empty data payload.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: default_node_type(),
            data: Map::new(),
            style: Map::new(),
            position: None,
            extra: Map::new(),
        }
    }

    /// Builder-style setter for the node type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Builder-style setter for the rendered size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.style.insert("width".into(), width.into());
        self.style.insert("height".into(), height.into());
        self
    }

    /// Builder-style setter for the position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Largest numeric `style.width` / `style.height`, 0 if neither is a
    /// positive finite number. CSS strings such as `"200px"` count as unknown.
    pub fn extent(&self) -> f64 {
        ["width", "height"]
            .into_iter()
            .filter_map(|key| self.style.get(key).and_then(Value::as_f64))
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_polar_offset() {
        let p = Position::new(10.0, 10.0).polar_offset(5.0, 0.0);
        assert!((p.x - 15.0).abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);

        let q = Position::default().polar_offset(2.0, std::f64::consts::FRAC_PI_2);
        assert!(q.x.abs() < 1e-9);
        assert!((q.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance() {
        let d = Position::new(0.0, 0.0).distance_to(Position::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_extent_reads_numeric_size() {
        assert_eq!(GraphNode::new("A").with_size(120.0, 40.0).extent(), 120.0);
        assert_eq!(GraphNode::new("A").extent(), 0.0);

        let node: GraphNode = serde_json::from_value(json!({
            "id": "A",
            "style": { "width": "200px", "height": 30, "border": "1px solid" },
        }))
        .unwrap();
        assert_eq!(node.extent(), 30.0);
    }

    #[test]
    fn test_css_style_passes_through() {
        let style = json!({ "width": "200px", "background": "#fff" });
        let node: GraphNode =
            serde_json::from_value(json!({ "id": "A", "style": style.clone() })).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap()["style"], style);
    }

    #[test]
    fn test_null_data_is_empty() {
        let node: GraphNode =
            serde_json::from_value(json!({ "id": "A", "data": null, "style": null })).unwrap();
        assert!(node.data.is_empty());
        assert!(node.style.is_empty());
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let input = json!({
            "id": "A",
            "type": "agent",
            "data": { "label": "A" },
            "selected": true,
            "className": "agent",
            "draggable": false,
        });
        let node: GraphNode = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(node.extra["className"], "agent");
        assert_eq!(serde_json::to_value(&node).unwrap(), input);
    }

    #[test]
    fn test_deserialize_minimal_node() {
        let node: GraphNode = serde_json::from_value(json!({ "id": "A" })).unwrap();
        assert_eq!(node.id, "A");
        assert_eq!(node.kind, "agent");
        assert!(node.data.is_empty());
        assert!(node.position.is_none());
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let node = GraphNode::new("A").with_kind("undefined_agent").at(1.0, 2.0);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "undefined_agent");
        assert_eq!(value["position"], json!({ "x": 1.0, "y": 2.0 }));
        assert!(value.get("style").is_none());
    }
}
