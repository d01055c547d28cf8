//! NetworkEngine - the agent network currently on screen.
//!
//! The engine stores the network topology using petgraph's StableGraph and
//! keeps one position per node slot next to it. Pointer hit testing is left
//! to the renderer.

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

use super::edge::GraphEdge;
use super::network::AgentNetwork;
use super::node::{GraphNode, Position};
use crate::error::LayoutError;
use crate::layout::{LayeredLayout, LayeredLayoutResult, RadialLayout, RadialLayoutResult};

/// The displayed agent network.
///
/// This struct manages:
/// - Network topology via petgraph (node weight = slot into `nodes`)
/// - The node and edge records as received, with current positions
pub struct NetworkEngine {
    /// Node weights are slots into `nodes`.
    graph: StableDiGraph<usize, ()>,

    /// Map from agent id to petgraph NodeIndex
    index_of: HashMap<String, NodeIndex>,

    /// Node records in load order
    nodes: Vec<GraphNode>,

    /// Edge records in load order, including ones that could not be linked
    edges: Vec<GraphEdge>,
}

impl NetworkEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            index_of: HashMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the current network.
    ///
    /// Returns the number of edges that name an unknown node and so were not
    /// linked into the graph. They are still kept for rendering.
    pub fn load(&mut self, network: AgentNetwork) -> usize {
        self.clear();
        let AgentNetwork { nodes, edges } = network;

        for (slot, node) in nodes.iter().enumerate() {
            if self.index_of.contains_key(&node.id) {
                log::warn!("duplicate node id `{}`; keeping the first", node.id);
                continue;
            }
            let index = self.graph.add_node(slot);
            self.index_of.insert(node.id.clone(), index);
        }

        let mut skipped = 0;
        for edge in &edges {
            match (self.index_of.get(&edge.source), self.index_of.get(&edge.target)) {
                (Some(&s), Some(&t)) => {
                    self.graph.add_edge(s, t, ());
                }
                _ => skipped += 1,
            }
        }

        self.nodes = nodes;
        self.edges = edges;

        log::debug!(
            "loaded network: {} nodes, {} edges ({} unlinked)",
            self.nodes.len(),
            self.edges.len(),
            skipped
        );
        skipped
    }

    /// Clear all nodes and edges.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.index_of.clear();
        self.nodes.clear();
        self.edges.clear();
    }

    /// Snapshot of the current network with current positions.
    pub fn network(&self) -> AgentNetwork {
        AgentNetwork::new(self.nodes.clone(), self.edges.clone())
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of linked edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Run the radial layout over the current network and adopt its result.
    pub fn layout_radial(
        &mut self,
        layout: &RadialLayout,
    ) -> Result<RadialLayoutResult, LayoutError> {
        let result = layout.compute(&self.network())?;
        self.adopt(&result.nodes, Some(&result.edges));
        Ok(result)
    }

    /// Run the layered layout over the current network and adopt its result.
    pub fn layout_layered(
        &mut self,
        layout: &LayeredLayout,
    ) -> Result<LayeredLayoutResult, LayoutError> {
        let result = layout.compute(&self.network())?;
        self.adopt(&result.nodes, None);
        Ok(result)
    }

    fn adopt(&mut self, nodes: &[GraphNode], edges: Option<&[GraphEdge]>) {
        for (slot, laid_out) in nodes.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(slot) {
                node.position = laid_out.position;
            }
        }
        if let Some(edges) = edges {
            self.edges = edges.to_vec();
        }
    }

    // =========================================================================
    // Node Queries
    // =========================================================================

    /// Get a node's position.
    pub fn position(&self, id: &str) -> Option<Position> {
        self.slot(id).and_then(|slot| self.nodes[slot].position)
    }

    /// Move a node, e.g. after a drag. Returns false for unknown ids and
    /// non-finite positions.
    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        if !position.is_finite() {
            log::warn!("ignoring non-finite position {position} for `{id}`");
            return false;
        }
        self.nodes[slot].position = Some(position);
        true
    }

    /// Ids of the nodes this node points to.
    pub fn children(&self, id: &str) -> Vec<String> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    /// Ids of the nodes pointing at this node.
    pub fn parents(&self, id: &str) -> Vec<String> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    fn neighbor_ids(&self, id: &str, direction: Direction) -> Vec<String> {
        let Some(&index) = self.index_of.get(id) else {
            return Vec::new();
        };
        let mut slots: Vec<usize> = self
            .graph
            .neighbors_directed(index, direction)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        // petgraph walks adjacency newest-first; report load order.
        slots.sort_unstable();
        slots.dedup();
        slots.into_iter().map(|s| self.nodes[s].id.clone()).collect()
    }

    fn slot(&self, id: &str) -> Option<usize> {
        self.index_of
            .get(id)
            .and_then(|&index| self.graph.node_weight(index).copied())
    }
}

impl Default for NetworkEngine {
    fn default() -> Self {
        Self::new()
    }
}
