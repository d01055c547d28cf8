//! Build displayable networks from agent connectivity data.
//!
//! Two sources are supported:
//! - the server's connectivity listing (`origin` + `tools` per agent), which
//!   describes a complete, deployed network;
//! - an editor state (`agent_network_definition`), which may be partial:
//!   agents can reference down-chains that are not defined yet, and parts of
//!   the network may be disconnected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

use super::edge::GraphEdge;
use super::network::AgentNetwork;
use super::node::{GraphNode, Position};
use crate::layout::{Hierarchy, LayeredLayout};

/// Placeholder position for nodes the caller is expected to lay out.
const UNPLACED: Position = Position { x: 100.0, y: 100.0 };

/// One agent and the tools it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityEntry {
    pub origin: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// The server's connectivity listing for one network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityResponse {
    #[serde(default)]
    pub connectivity_info: Vec<ConnectivityEntry>,
}

/// Build the full network described by a connectivity listing.
///
/// Nodes appear in first-mention order. A node's depth is its longest
/// distance from a node no tool list mentions; nodes only reachable through
/// a cycle stay at depth 0.
pub fn build_from_connectivity(entries: &[ConnectivityEntry]) -> AgentNetwork {
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut tools_of: HashMap<String, Vec<String>> = HashMap::new();
    let mut origins: Vec<String> = Vec::new();
    let mut parent_of: HashMap<String, String> = HashMap::new();

    let mut mention = |name: &str, order: &mut Vec<String>| {
        if !seen.contains_key(name) {
            seen.insert(name.to_string(), order.len());
            order.push(name.to_string());
        }
    };

    for entry in entries {
        mention(&entry.origin, &mut order);
        for tool in &entry.tools {
            mention(tool, &mut order);
            parent_of.insert(tool.clone(), entry.origin.clone());
        }
        if tools_of
            .insert(entry.origin.clone(), entry.tools.clone())
            .is_none()
        {
            origins.push(entry.origin.clone());
        }
    }

    let depth_of = longest_depths(&order, &tools_of, &parent_of);

    let nodes = order
        .iter()
        .map(|name| {
            let children = tools_of.get(name).cloned().unwrap_or_default();
            let mut node = GraphNode::new(name.as_str());
            node.data = agent_data(
                name,
                depth_of.get(name).copied().unwrap_or(0),
                parent_of.get(name),
                &children,
            );
            node.position = Some(UNPLACED);
            node
        })
        .collect();

    let edges = origins
        .iter()
        .flat_map(|origin| {
            tools_of[origin]
                .iter()
                .map(move |tool| GraphEdge::new(origin.as_str(), tool.as_str()).animated(true))
        })
        .collect();

    AgentNetwork::new(nodes, edges)
}

/// Longest-path depth from the parentless nodes. Walks are capped at the
/// node count so cycles terminate.
fn longest_depths(
    order: &[String],
    tools_of: &HashMap<String, Vec<String>>,
    parent_of: &HashMap<String, String>,
) -> HashMap<String, u32> {
    let cap = order.len() as u32;
    let mut depth_of: HashMap<String, u32> = HashMap::new();
    let mut stack: Vec<(&str, u32)> = order
        .iter()
        .filter(|name| !parent_of.contains_key(*name))
        .map(|name| (name.as_str(), 0))
        .collect();

    while let Some((name, depth)) = stack.pop() {
        if depth > cap {
            continue;
        }
        let deeper = depth_of.get(name).is_none_or(|&known| known < depth);
        if deeper {
            depth_of.insert(name.to_string(), depth);
            for child in tools_of.get(name).into_iter().flatten() {
                stack.push((child.as_str(), depth + 1));
            }
        }
    }
    depth_of
}

fn agent_data(
    name: &str,
    depth: u32,
    parent: Option<&String>,
    children: &[String],
) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("label".into(), json!(name));
    data.insert("depth".into(), json!(depth));
    data.insert("parent".into(), json!(parent));
    data.insert("children".into(), json!(children));
    data.insert("dropdown_tools".into(), json!([]));
    data.insert("sub_networks".into(), json!([]));
    data
}

/// Definition of a single agent inside an editor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    #[serde(default)]
    pub down_chains: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: String,
}

impl AgentDefinition {
    /// Agents this one calls: `tools` when non-empty, else `down_chains`.
    pub fn children(&self) -> &[String] {
        match (&self.tools, &self.down_chains) {
            (Some(tools), _) if !tools.is_empty() => tools,
            (_, Some(chains)) => chains,
            _ => &[],
        }
    }
}

fn unknown_network() -> String {
    "unknown_network".to_string()
}

/// Editor state for one agent network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkState {
    #[serde(default = "unknown_network")]
    pub agent_network_name: String,
    /// Agent name → definition object, in definition order.
    #[serde(default)]
    pub agent_network_definition: Map<String, Value>,
}

/// A possibly partial network plus summary counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialNetwork {
    #[serde(flatten)]
    pub network: AgentNetwork,
    pub network_name: String,
    pub connected_components: usize,
    pub total_agents: usize,
    pub defined_agents: usize,
    pub undefined_agents: usize,
}

/// Build a network from an editor state, tolerating undefined down-chain
/// references and disconnected agents. Positions come from the layered
/// layout.
pub fn build_from_definition(state: &NetworkState, layout: &LayeredLayout) -> PartialNetwork {
    let network_name = state.agent_network_name.clone();
    let definitions: Vec<(&String, AgentDefinition)> = state
        .agent_network_definition
        .iter()
        .map(|(name, value)| {
            let definition = AgentDefinition::deserialize(value).unwrap_or_else(|err| {
                log::warn!("agent `{name}` has an unreadable definition: {err}");
                AgentDefinition::default()
            });
            (name, definition)
        })
        .collect();

    if definitions.is_empty() {
        return PartialNetwork {
            network: AgentNetwork::default(),
            network_name,
            connected_components: 0,
            total_agents: 0,
            defined_agents: 0,
            undefined_agents: 0,
        };
    }

    let defined: HashMap<&str, &AgentDefinition> = definitions
        .iter()
        .map(|(name, def)| (name.as_str(), def))
        .collect();

    let mut names: Vec<&str> = definitions.iter().map(|(name, _)| name.as_str()).collect();
    let mut parent_of: HashMap<&str, &str> = HashMap::new();
    for (name, def) in &definitions {
        for child in def.children() {
            if !defined.contains_key(child.as_str()) && !names.contains(&child.as_str()) {
                names.push(child.as_str());
            }
            parent_of.insert(child.as_str(), name.as_str());
        }
    }

    let mut nodes: Vec<GraphNode> = names
        .iter()
        .map(|&name| match defined.get(name) {
            Some(_) => GraphNode::new(name),
            None => GraphNode::new(name).with_kind("undefined_agent"),
        })
        .collect();

    let edges: Vec<GraphEdge> = definitions
        .iter()
        .flat_map(|(name, def)| {
            def.children().iter().map(move |target| {
                let mut edge = GraphEdge::new(name.as_str(), target.as_str()).animated(false);
                edge.curve = Some("default".to_string());
                edge
            })
        })
        .collect();

    let hierarchy = Hierarchy::build(&nodes, &edges);
    let mut roots = hierarchy.roots();
    if roots.is_empty() {
        roots = (0..definitions.len()).collect();
    }
    let depths: Vec<u32> = hierarchy
        .bfs_depths(&roots)
        .into_iter()
        .map(|d| d.unwrap_or(0))
        .collect();
    let components = hierarchy.components();
    let positions = layout.place(&nodes, &depths, &components);

    for (i, node) in nodes.iter_mut().enumerate() {
        let name = names[i];
        let definition = defined.get(name);
        let children = definition.map(|d| d.children().to_vec()).unwrap_or_default();
        let mut data = agent_data(
            name,
            depths[i],
            parent_of.get(name).map(|p| p.to_string()).as_ref(),
            &children,
        );
        data.insert(
            "instructions".into(),
            json!(definition.map(|d| d.instructions.as_str()).unwrap_or("")),
        );
        data.insert("network_name".into(), json!(network_name));
        data.insert("is_defined".into(), json!(definition.is_some()));
        node.data = data;
        node.position = Some(positions[i]);
    }

    let total_agents = nodes.len();
    let defined_agents = definitions.len();
    log::debug!(
        "network `{network_name}`: {total_agents} agents, {} undefined, {} components",
        total_agents - defined_agents,
        components.len()
    );

    PartialNetwork {
        network: AgentNetwork::new(nodes, edges),
        network_name,
        connected_components: components.len(),
        total_agents,
        defined_agents,
        undefined_agents: total_agents - defined_agents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(origin: &str, tools: &[&str]) -> ConnectivityEntry {
        ConnectivityEntry {
            origin: origin.to_string(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn node<'a>(network: &'a AgentNetwork, id: &str) -> &'a GraphNode {
        network.nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn test_connectivity_nodes_and_edges() {
        let network = build_from_connectivity(&[
            entry("front", &["planner", "search"]),
            entry("planner", &["calc"]),
            entry("search", &[]),
        ]);

        let ids: Vec<_> = network.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["front", "planner", "search", "calc"]);

        let edge_ids: Vec<_> = network.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["front-planner", "front-search", "planner-calc"]);
        assert!(network.edges.iter().all(|e| e.animated == Some(true)));

        let calc = node(&network, "calc");
        assert_eq!(calc.data["depth"], 2);
        assert_eq!(calc.data["parent"], "planner");
        assert_eq!(node(&network, "front").data["parent"], Value::Null);
        assert_eq!(node(&network, "front").data["children"], json!(["planner", "search"]));
    }

    #[test]
    fn test_connectivity_longest_depth_wins() {
        let network = build_from_connectivity(&[
            entry("a", &["b", "d"]),
            entry("b", &["c"]),
            entry("c", &["d"]),
        ]);
        assert_eq!(node(&network, "d").data["depth"], 3);
    }

    #[test]
    fn test_connectivity_cycle_terminates() {
        let network = build_from_connectivity(&[
            entry("root", &["a"]),
            entry("a", &["b"]),
            entry("b", &["a"]),
        ]);
        assert_eq!(network.nodes.len(), 3);
        assert_eq!(network.edges.len(), 3);
    }

    #[test]
    fn test_connectivity_response_shape() {
        let response: ConnectivityResponse = serde_json::from_value(json!({
            "connectivity_info": [{ "origin": "front", "tools": ["x"] }, { "origin": "x" }]
        }))
        .unwrap();
        let network = build_from_connectivity(&response.connectivity_info);
        assert_eq!(network.nodes.len(), 2);
    }

    fn state(definition: Value) -> NetworkState {
        serde_json::from_value(json!({
            "agent_network_name": "hello",
            "agent_network_definition": definition,
        }))
        .unwrap()
    }

    #[test]
    fn test_definition_with_undefined_agent() {
        let state = state(json!({
            "front": { "tools": ["helper", "ghost"], "instructions": "lead" },
            "helper": { "down_chains": [] },
        }));
        let result = build_from_definition(&state, &LayeredLayout::with_defaults());

        assert_eq!(result.network_name, "hello");
        assert_eq!(result.total_agents, 3);
        assert_eq!(result.defined_agents, 2);
        assert_eq!(result.undefined_agents, 1);
        assert_eq!(result.connected_components, 1);

        let ghost = node(&result.network, "ghost");
        assert_eq!(ghost.kind, "undefined_agent");
        assert_eq!(ghost.data["is_defined"], false);
        assert_eq!(ghost.data["depth"], 1);
        assert_eq!(ghost.data["parent"], "front");

        let front = node(&result.network, "front");
        assert_eq!(front.data["instructions"], "lead");
        assert_eq!(front.position, Some(Position::new(0.0, 0.0)));

        assert!(result.network.edges.iter().all(|e| e.animated == Some(false)));
        assert_eq!(result.network.edges[0].curve.as_deref(), Some("default"));
    }

    #[test]
    fn test_definition_disconnected() {
        let state = state(json!({
            "a": { "tools": ["b"] },
            "b": {},
            "lonely": { "instructions": "" },
        }));
        let result = build_from_definition(&state, &LayeredLayout::with_defaults());
        assert_eq!(result.connected_components, 2);
        assert_eq!(result.undefined_agents, 0);
    }

    #[test]
    fn test_definition_empty() {
        let state = state(json!({}));
        let result = build_from_definition(&state, &LayeredLayout::with_defaults());
        assert!(result.network.is_empty());
        assert_eq!(result.connected_components, 0);
        assert_eq!(result.total_agents, 0);
    }

    #[test]
    fn test_definition_children_prefers_tools() {
        let def = AgentDefinition {
            tools: Some(vec![]),
            down_chains: Some(vec!["x".into()]),
            instructions: String::new(),
        };
        assert_eq!(def.children(), &["x".to_string()]);
    }

    #[test]
    fn test_partial_network_serializes_flat() {
        let state = state(json!({ "a": {} }));
        let result = build_from_definition(&state, &LayeredLayout::with_defaults());
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["nodes"].is_array());
        assert!(value["edges"].is_array());
        assert_eq!(value["total_agents"], 1);
    }
}
