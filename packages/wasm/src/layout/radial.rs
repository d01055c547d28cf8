//! Hierarchical radial layout for agent networks.
//!
//! Places the root at a caller-supplied center and every deeper level on a
//! ring around its parent:
//!
//! 1. **Hierarchy:** link parent→child from the edge list and pick the root,
//!    the first node (input order) that no edge targets.
//! 2. **Depths:** depth-first walk from the root. Nodes the walk never
//!    reaches are left out of placement and reported as `unplaced`.
//! 3. **Levels:** bucket reachable nodes by depth, keeping input order.
//! 4. **Placement:** for level `d > 0` with `n` nodes, node `i` sits at
//!    `anchor + r·(cos iθ, sin iθ)` where `θ = 2π / max(n, min_angle_slots)`
//!    and `r = base_radius + (d - 1)·level_spacing`, plus half the largest
//!    node extent seen so far when size padding is on. The anchor is the
//!    node's parent.
//!
//! Every placed coordinate is finite: options are validated up front and
//! the angular step never divides by zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::f64::consts::TAU;

use super::hierarchy::Hierarchy;
use crate::error::LayoutError;
use crate::graph::{AgentNetwork, EdgeRenderHints, GraphEdge, GraphNode, Position};

/// Configuration for the radial layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialConfig {
    /// Distance from a parent to its depth-1 ring.
    pub base_radius: f64,
    /// Extra ring distance per level below the first.
    pub level_spacing: f64,
    /// Where the root is placed.
    pub center: Position,
    /// Lower bound on angular slots per level; keeps one or two siblings
    /// from collapsing onto each other.
    pub min_angle_slots: usize,
    /// Grow ring radii by half the largest node extent seen so far.
    pub size_padding: bool,
    /// Rendering hints stamped onto the returned edges.
    pub edge_hints: EdgeRenderHints,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            base_radius: 250.0,
            level_spacing: 200.0,
            center: Position::default(),
            min_angle_slots: 3,
            size_padding: false,
            edge_hints: EdgeRenderHints::default(),
        }
    }
}

impl RadialConfig {
    fn validate(&self) -> Result<(), LayoutError> {
        let checks = [
            ("baseRadius", self.base_radius),
            ("levelSpacing", self.level_spacing),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig { name, value });
            }
        }
        if !self.center.x.is_finite() {
            return Err(LayoutError::InvalidConfig {
                name: "center.x",
                value: self.center.x,
            });
        }
        if !self.center.y.is_finite() {
            return Err(LayoutError::InvalidConfig {
                name: "center.y",
                value: self.center.y,
            });
        }
        Ok(())
    }
}

/// Result of a radial layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadialLayoutResult {
    /// Input nodes, in input order, each carrying a position.
    pub nodes: Vec<GraphNode>,
    /// Input edges with rendering hints filled in.
    pub edges: Vec<GraphEdge>,
    /// Id of the node placed at the center.
    pub root: String,
    /// Depth per node, aligned with `nodes`; `None` when unreachable.
    pub depths: Vec<Option<u32>>,
    /// Ids of nodes left out of level placement.
    pub unplaced: Vec<String>,
    /// Whether the edges contained a directed cycle.
    pub cyclic: bool,
}

impl RadialLayoutResult {
    /// Position assigned to the node with the given id.
    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.position)
    }
}

/// The radial layout engine.
pub struct RadialLayout {
    config: RadialConfig,
}

impl RadialLayout {
    /// Create a radial layout with the given configuration.
    pub fn new(config: RadialConfig) -> Self {
        Self { config }
    }

    /// Create a radial layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RadialConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &RadialConfig {
        &self.config
    }

    /// Ring radius for nodes at `depth` (>= 1) around their parent.
    pub fn level_radius(&self, depth: u32, padding: f64) -> f64 {
        let steps = depth.saturating_sub(1) as f64;
        self.config.base_radius + steps * self.config.level_spacing + padding
    }

    /// Lay out an untyped `{ nodes, edges }` document.
    pub fn compute_value(&self, doc: &Value) -> Result<RadialLayoutResult, LayoutError> {
        let network = AgentNetwork::from_value(doc)?;
        self.compute(&network)
    }

    /// Compute positions for every node reachable from the root.
    ///
    /// # Errors
    ///
    /// `NoRoot` when every node is the target of some edge (including the
    /// empty network), `InvalidConfig` for unusable numeric options.
    pub fn compute(&self, network: &AgentNetwork) -> Result<RadialLayoutResult, LayoutError> {
        self.config.validate()?;

        let nodes = &network.nodes;
        let hierarchy = Hierarchy::build(nodes, &network.edges);

        let roots = hierarchy.roots();
        let Some(&root) = roots.first() else {
            return Err(LayoutError::NoRoot);
        };
        if roots.len() > 1 {
            log::warn!(
                "{} nodes have no incoming edge; using `{}` as root",
                roots.len(),
                nodes[root].id
            );
        }

        let (depths, parents) = hierarchy.dfs_depths(root);
        let cyclic = hierarchy.is_cyclic();
        if cyclic {
            log::warn!("network edges contain a cycle; back edges ignored");
        }

        let levels = Self::group_levels(&depths);
        let positions = self.place_levels(nodes, &levels, &parents);

        let mut unplaced = Vec::new();
        let laid_out: Vec<GraphNode> = nodes
            .iter()
            .zip(&positions)
            .map(|(node, position)| {
                let mut out = node.clone();
                match position {
                    Some(p) => out.position = Some(*p),
                    None => {
                        unplaced.push(node.id.clone());
                        out.position = node
                            .position
                            .filter(|p| p.is_finite())
                            .or(Some(self.config.center));
                    }
                }
                out
            })
            .collect();

        if !unplaced.is_empty() {
            log::warn!(
                "{} nodes unreachable from `{}`: {:?}",
                unplaced.len(),
                nodes[root].id,
                unplaced
            );
        }

        let edges = network
            .edges
            .iter()
            .map(|e| self.config.edge_hints.annotate(e))
            .collect();

        log::debug!(
            "radial layout: {} nodes over {} levels, {} edges skipped",
            nodes.len() - unplaced.len(),
            levels.len(),
            hierarchy.skipped_edges()
        );

        Ok(RadialLayoutResult {
            nodes: laid_out,
            edges,
            root: nodes[root].id.clone(),
            depths,
            unplaced,
            cyclic,
        })
    }

    /// Bucket nodes by depth; each bucket keeps input order.
    fn group_levels(depths: &[Option<u32>]) -> Vec<Vec<usize>> {
        let mut levels: Vec<Vec<usize>> = Vec::new();
        for (node, depth) in depths.iter().enumerate() {
            if let Some(d) = *depth {
                let d = d as usize;
                if levels.len() <= d {
                    levels.resize_with(d + 1, Vec::new);
                }
                levels[d].push(node);
            }
        }
        levels
    }

    fn place_levels(
        &self,
        nodes: &[GraphNode],
        levels: &[Vec<usize>],
        parents: &[Option<usize>],
    ) -> Vec<Option<Position>> {
        let center = self.config.center;
        let mut positions: Vec<Option<Position>> = vec![None; nodes.len()];
        let mut max_extent = 0.0f64;

        for (depth, level) in levels.iter().enumerate() {
            if self.config.size_padding {
                max_extent = level
                    .iter()
                    .map(|&n| nodes[n].extent())
                    .fold(max_extent, f64::max);
            }

            if depth == 0 {
                for &node in level {
                    positions[node] = Some(center);
                }
                continue;
            }

            let padding = if self.config.size_padding {
                max_extent / 2.0
            } else {
                0.0
            };
            let radius = self.level_radius(depth as u32, padding);
            let slots = level.len().max(self.config.min_angle_slots).max(1);
            let angle_step = TAU / slots as f64;

            for (i, &node) in level.iter().enumerate() {
                // Every reachable node has a tree parent; pairing with the
                // previous level only covers a missing link.
                let anchor = parents[node]
                    .or_else(|| levels[depth - 1].get(i / 2).copied())
                    .and_then(|p| positions[p])
                    .unwrap_or(center);

                let mut position = anchor.polar_offset(radius, i as f64 * angle_step);
                if !position.is_finite() {
                    log::warn!("non-finite position for `{}`; using center", nodes[node].id);
                    position = center;
                }
                positions[node] = Some(position);
            }
        }

        positions
    }
}
