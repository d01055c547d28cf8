//! Layered grid layout for partial or disconnected networks.
//!
//! Used where the radial layout has nothing sensible to anchor on: agents
//! being drafted in the editor, networks with several roots, or down-chain
//! references to agents that are not defined yet. Each weakly connected
//! component gets its own block of columns; inside a block, depth picks the
//! row and the id (sorted) picks the column.

use serde::{Deserialize, Serialize};

use super::hierarchy::Hierarchy;
use crate::error::LayoutError;
use crate::graph::{AgentNetwork, GraphNode, Position};

/// Configuration for the layered layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayeredConfig {
    /// Column width.
    pub horizontal_spacing: f64,
    /// Row height.
    pub vertical_spacing: f64,
    /// Extra gap between component blocks.
    pub component_spacing: f64,
    /// Top-left corner of the first block.
    pub origin: Position,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 200.0,
            vertical_spacing: 150.0,
            component_spacing: 300.0,
            origin: Position::default(),
        }
    }
}

/// Result of a layered layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayeredLayoutResult {
    /// Input nodes, in input order, each carrying a position.
    pub nodes: Vec<GraphNode>,
    /// Breadth-first depth per node; orphans sit at depth 0.
    pub depths: Vec<u32>,
    /// Number of weakly connected components.
    pub components: usize,
}

/// The layered layout engine.
pub struct LayeredLayout {
    config: LayeredConfig,
}

impl LayeredLayout {
    pub fn new(config: LayeredConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(LayeredConfig::default())
    }

    /// Lay out every node of the network. Cycles and disconnected parts are
    /// fine; only unusable spacing options fail.
    pub fn compute(&self, network: &AgentNetwork) -> Result<LayeredLayoutResult, LayoutError> {
        self.validate()?;

        let hierarchy = Hierarchy::build(&network.nodes, &network.edges);
        let mut roots = hierarchy.roots();
        if roots.is_empty() {
            // Pure cycles: every node starts a wave.
            roots = (0..hierarchy.len()).collect();
        }
        let depths: Vec<u32> = hierarchy
            .bfs_depths(&roots)
            .into_iter()
            .map(|d| d.unwrap_or(0))
            .collect();
        let components = hierarchy.components();

        let positions = self.place(&network.nodes, &depths, &components);
        let nodes = network
            .nodes
            .iter()
            .zip(positions)
            .map(|(node, position)| {
                let mut out = node.clone();
                out.position = Some(position);
                out
            })
            .collect();

        Ok(LayeredLayoutResult {
            nodes,
            depths,
            components: components.len(),
        })
    }

    /// Grid positions for nodes with known depths and components.
    pub fn place(
        &self,
        nodes: &[GraphNode],
        depths: &[u32],
        components: &[Vec<usize>],
    ) -> Vec<Position> {
        let origin = self.config.origin;
        let mut positions = vec![origin; nodes.len()];
        let mut x_offset = 0.0;

        for component in components {
            let max_depth = component.iter().map(|&n| depths[n]).max().unwrap_or(0);
            let mut widest = 0usize;

            for depth in 0..=max_depth {
                let mut row: Vec<usize> = component
                    .iter()
                    .copied()
                    .filter(|&n| depths[n] == depth)
                    .collect();
                row.sort_by(|&a, &b| nodes[a].id.cmp(&nodes[b].id));
                widest = widest.max(row.len());

                for (i, node) in row.into_iter().enumerate() {
                    positions[node] = Position::new(
                        origin.x + x_offset + i as f64 * self.config.horizontal_spacing,
                        origin.y + depth as f64 * self.config.vertical_spacing,
                    );
                }
            }

            x_offset +=
                widest as f64 * self.config.horizontal_spacing + self.config.component_spacing;
        }

        positions
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let checks = [
            ("horizontalSpacing", self.config.horizontal_spacing),
            ("verticalSpacing", self.config.vertical_spacing),
            ("componentSpacing", self.config.component_spacing),
            ("origin.x", self.config.origin.x),
            ("origin.y", self.config.origin.y),
        ];
        match checks.into_iter().find(|(_, v)| !v.is_finite()) {
            Some((name, value)) => Err(LayoutError::InvalidConfig { name, value }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphEdge;

    fn network(ids: &[&str], links: &[(&str, &str)]) -> AgentNetwork {
        AgentNetwork::new(
            ids.iter().map(|id| GraphNode::new(*id)).collect(),
            links.iter().map(|(s, t)| GraphEdge::new(*s, *t)).collect(),
        )
    }

    fn pos(result: &LayeredLayoutResult, id: &str) -> Position {
        result
            .nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.position)
            .unwrap()
    }

    #[test]
    fn test_single_component_rows() {
        let net = network(&["root", "b", "a"], &[("root", "b"), ("root", "a")]);
        let result = LayeredLayout::with_defaults().compute(&net).unwrap();

        assert_eq!(result.components, 1);
        assert_eq!(result.depths, vec![0, 1, 1]);
        assert_eq!(pos(&result, "root"), Position::new(0.0, 0.0));
        // Same row is ordered by id.
        assert_eq!(pos(&result, "a"), Position::new(0.0, 150.0));
        assert_eq!(pos(&result, "b"), Position::new(200.0, 150.0));
    }

    #[test]
    fn test_components_side_by_side() {
        let net = network(
            &["a", "a1", "a2", "z"],
            &[("a", "a1"), ("a", "a2")],
        );
        let result = LayeredLayout::with_defaults().compute(&net).unwrap();

        assert_eq!(result.components, 2);
        // First block is two columns wide: 2 * 200 + 300.
        assert_eq!(pos(&result, "z"), Position::new(700.0, 0.0));
    }

    #[test]
    fn test_pure_cycle_does_not_hang() {
        let net = network(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let result = LayeredLayout::with_defaults().compute(&net).unwrap();

        assert_eq!(result.components, 1);
        assert!(result.nodes.iter().all(|n| n.position.unwrap().is_finite()));
    }

    #[test]
    fn test_origin_offsets_everything() {
        let net = network(&["a"], &[]);
        let result = LayeredLayout::new(LayeredConfig {
            origin: Position::new(10.0, 20.0),
            ..Default::default()
        })
        .compute(&net)
        .unwrap();

        assert_eq!(pos(&result, "a"), Position::new(10.0, 20.0));
    }

    #[test]
    fn test_invalid_spacing() {
        let net = network(&["a"], &[]);
        let err = LayeredLayout::new(LayeredConfig {
            vertical_spacing: f64::NAN,
            ..Default::default()
        })
        .compute(&net)
        .unwrap_err();

        assert!(matches!(err, LayoutError::InvalidConfig { name: "verticalSpacing", .. }));
    }
}
