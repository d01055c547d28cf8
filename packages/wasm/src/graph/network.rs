//! The `{ nodes, edges }` document served by the backend per network.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::edge::GraphEdge;
use super::node::GraphNode;
use crate::error::LayoutError;

/// One snapshot of an agent network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentNetwork {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl AgentNetwork {
    /// Create a network from node and edge lists.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Read a network from an untyped JSON document.
    ///
    /// Both `nodes` and `edges` must be present and be arrays; each element
    /// must deserialize as a node or edge respectively.
    pub fn from_value(doc: &Value) -> Result<Self, LayoutError> {
        let nodes = Self::array_field(doc, "nodes", "node objects")?;
        let edges = Self::array_field(doc, "edges", "edge objects")?;
        Ok(Self { nodes, edges })
    }

    fn array_field<T: DeserializeOwned>(
        doc: &Value,
        field: &'static str,
        expected: &'static str,
    ) -> Result<Vec<T>, LayoutError> {
        let malformed = LayoutError::MalformedInput { field, expected };
        match doc.get(field) {
            Some(items @ Value::Array(_)) => {
                Vec::<T>::deserialize(items).map_err(|_| malformed)
            }
            _ => Err(malformed),
        }
    }

    /// Index of the node with the given id.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// True when the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
