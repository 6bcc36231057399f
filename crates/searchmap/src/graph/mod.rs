//! The node graph: nodes, connections, hierarchy, placement and persistence

mod connection;
pub mod connection_geometry;
mod document;
mod hierarchy;
mod node;
mod placement;
mod rendering;

pub use connection::Connection;
pub use connection_geometry::{action_at_location, find_intersect, CurveGeometry};
pub use document::{MapDocument, DOCUMENT_VERSION};
pub use hierarchy::Graph;
pub use node::{ClickAction, Node, NodeKind};
