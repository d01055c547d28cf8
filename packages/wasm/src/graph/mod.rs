//! Agent network data structures and operations.
//!
//! This module holds the node/edge model the backend serves, builders that
//! derive networks from connectivity data, and the `NetworkEngine` that keeps
//! the displayed network in petgraph's StableGraph alongside its positions.

pub mod builder;
mod edge;
mod engine;
mod network;
mod node;

pub use builder::{
    AgentDefinition, ConnectivityEntry, ConnectivityResponse, NetworkState, PartialNetwork,
};
pub use edge::{EdgeRenderHints, GraphEdge};
pub use engine::NetworkEngine;
pub use network::AgentNetwork;
pub use node::{GraphNode, Position};
