//! Layout algorithms for agent network visualization.
//!
//! These compute positions for the node-graph view from the flat node and
//! edge lists the backend serves. The radial layout is the default view;
//! the layered layout handles drafts and disconnected networks.

pub mod hierarchy;
pub mod layered;
pub mod radial;

pub use hierarchy::Hierarchy;
pub use layered::{LayeredConfig, LayeredLayout, LayeredLayoutResult};
pub use radial::{RadialConfig, RadialLayout, RadialLayoutResult};
