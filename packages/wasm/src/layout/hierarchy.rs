//! Parent→child hierarchy shared by the layout algorithms.
//!
//! Built once per layout call from the flat node and edge lists. Nodes are
//! addressed by their index in the input slice, so every per-node vector
//! here lines up with the caller's `nodes`.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use petgraph::unionfind::UnionFind;
use std::collections::{HashMap, VecDeque};

use crate::graph::{GraphEdge, GraphNode};

/// Adjacency built from a node list and an edge list.
#[derive(Debug)]
pub struct Hierarchy<'a> {
    /// Node id → input index.
    index: HashMap<&'a str, usize>,
    /// Children per node, in edge order.
    children: Vec<Vec<usize>>,
    /// Whether any edge targets the node.
    has_incoming: Vec<bool>,
    /// False for later copies of a duplicated id; edges never reach them.
    canonical: Vec<bool>,
    /// Number of edges dropped while linking.
    skipped_edges: usize,
}

impl<'a> Hierarchy<'a> {
    /// Link parents to children.
    ///
    /// Edges naming an unknown node and self-loops are skipped. Any edge
    /// whose target is a known node still marks that node as having a parent,
    /// even when the edge itself is skipped.
    pub fn build(nodes: &'a [GraphNode], edges: &[GraphEdge]) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            // First occurrence of a duplicated id wins.
            index.entry(node.id.as_str()).or_insert(i);
        }
        let canonical = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| index[node.id.as_str()] == i)
            .collect();

        let mut children = vec![Vec::new(); nodes.len()];
        let mut has_incoming = vec![false; nodes.len()];
        let mut skipped_edges = 0;

        for edge in edges {
            let target = index.get(edge.target.as_str()).copied();
            if let Some(t) = target {
                has_incoming[t] = true;
            }

            match (index.get(edge.source.as_str()).copied(), target) {
                (Some(s), Some(t)) if s != t => children[s].push(t),
                _ => {
                    log::debug!(
                        "skipping edge {} ({} -> {})",
                        edge.id,
                        edge.source,
                        edge.target
                    );
                    skipped_edges += 1;
                }
            }
        }

        Self {
            index,
            children,
            has_incoming,
            canonical,
            skipped_edges,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Input index of the node with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Children of a node, in edge order.
    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    /// Number of edges that were not linked.
    pub fn skipped_edges(&self) -> usize {
        self.skipped_edges
    }

    /// Nodes with no incoming edge, in input order. Duplicate copies of an
    /// id are never roots.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.canonical[i] && !self.has_incoming[i])
            .collect()
    }

    /// Depth-first depth assignment from `root`.
    ///
    /// Returns `(depth, parent)` per node. The first visit of a node fixes
    /// both; later paths to an already-visited node are ignored, which also
    /// breaks cycles. Unreachable nodes get `None` for both.
    pub fn dfs_depths(&self, root: usize) -> (Vec<Option<u32>>, Vec<Option<usize>>) {
        let mut depth = vec![None; self.len()];
        let mut parent = vec![None; self.len()];
        let mut stack = vec![(root, 0u32, None)];

        while let Some((node, d, from)) = stack.pop() {
            if depth[node].is_some() {
                continue;
            }
            depth[node] = Some(d);
            parent[node] = from;

            // Reverse so the first child is visited first.
            for &child in self.children[node].iter().rev() {
                if depth[child].is_none() {
                    stack.push((child, d + 1, Some(node)));
                }
            }
        }

        (depth, parent)
    }

    /// Breadth-first depth assignment from several roots at depth 0.
    ///
    /// Each node takes the depth of the first root wave that reaches it.
    pub fn bfs_depths(&self, roots: &[usize]) -> Vec<Option<u32>> {
        let mut depth = vec![None; self.len()];
        let mut queue: VecDeque<(usize, u32)> = roots.iter().map(|&r| (r, 0)).collect();

        while let Some((node, d)) = queue.pop_front() {
            if depth[node].is_some() {
                continue;
            }
            depth[node] = Some(d);
            for &child in &self.children[node] {
                if depth[child].is_none() {
                    queue.push_back((child, d + 1));
                }
            }
        }

        depth
    }

    /// True when the linked edges contain a directed cycle.
    pub fn is_cyclic(&self) -> bool {
        let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(self.len(), self.len());
        let indices: Vec<_> = (0..self.len()).map(|_| graph.add_node(())).collect();
        for (parent, children) in self.children.iter().enumerate() {
            for &child in children {
                graph.add_edge(indices[parent], indices[child], ());
            }
        }
        is_cyclic_directed(&graph)
    }

    /// Weakly connected components, ordered by their first member in input
    /// order. Members of each component are in input order too.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut sets = UnionFind::<usize>::new(self.len());
        for (parent, children) in self.children.iter().enumerate() {
            for &child in children {
                sets.union(parent, child);
            }
        }

        let mut slot_of_rep: HashMap<usize, usize> = HashMap::new();
        let mut components: Vec<Vec<usize>> = Vec::new();
        for node in 0..self.len() {
            let rep = sets.find_mut(node);
            let slot = *slot_of_rep.entry(rep).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(node);
        }
        components
    }
}
