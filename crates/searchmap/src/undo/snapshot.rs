//! Revertable snapshots of graph state
//!
//! Three scopes are supported: the whole graph, the attributes of one node,
//! and the attributes of one connection. A snapshot is taken before a
//! mutation and restores the captured state when reverted. Snapshots that
//! could not be taken are kept but revert to nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Color, Location, NodeId, Renderer, Result, SearchMapError};
use crate::graph::{Connection, Graph, Node, NodeKind};

/// Visual attributes of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub kind: NodeKind,
    pub width: i32,
    pub height: i32,
    pub location: Location,
    pub fill_color: Color,
    pub border_color: Color,
}

impl NodeAttributes {
    fn of(node: &Node) -> Self {
        Self {
            kind: node.kind().clone(),
            width: node.width(),
            height: node.height(),
            location: node.location(),
            fill_color: node.fill_color(),
            border_color: node.border_color(),
        }
    }
}

/// Shape and style of a connection, oriented `from -> to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAttributes {
    pub points: [Location; 4],
    pub user_imposed: [Option<Location>; 4],
    pub customized_by_user: bool,
    pub inner_color: Option<Color>,
    pub shadow_color: Option<Color>,
    pub bold: bool,
    pub from_location: Location,
    pub to_location: Location,
}

impl ConnectionAttributes {
    fn of(connection: &Connection) -> Self {
        Self {
            points: *connection.points(),
            user_imposed: *connection.user_imposed(),
            customized_by_user: connection.is_customized_by_user(),
            inner_color: connection.inner_color(),
            shadow_color: connection.shadow_color(),
            bold: connection.is_bold(),
            from_location: connection.cached_from_location(),
            to_location: connection.cached_to_location(),
        }
    }

    fn reversed(mut self) -> Self {
        self.points.reverse();
        self.user_imposed.reverse();
        std::mem::swap(&mut self.from_location, &mut self.to_location);
        self
    }

    fn apply(&self, connection: &mut Connection) {
        connection.set_customized_by_user(self.customized_by_user);
        connection.set_points(self.points);
        for (index, pin) in self.user_imposed.iter().enumerate() {
            connection.set_user_imposed(index, *pin);
        }
        connection.set_colors(self.inner_color, self.shadow_color);
        connection.set_bold(self.bold);
        connection.set_cached_locations(self.from_location, self.to_location);
    }
}

/// Whole-graph snapshot holding a serialized document
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    taken_at: DateTime<Utc>,
    document: Option<String>,
}

impl GraphSnapshot {
    /// Snapshot taken before a mutation; a graph without root is not kept
    pub fn take(graph: &Graph) -> Self {
        if graph.root().is_none() {
            debug!("Graph has no root, snapshot left empty");
            return Self {
                taken_at: Utc::now(),
                document: None,
            };
        }
        Self::capture(graph)
    }

    /// Snapshot of whatever the graph holds, empty or rootless included
    pub fn capture(graph: &Graph) -> Self {
        let document = match serde_json::to_string(&graph.to_document()) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "Could not serialize graph snapshot");
                None
            }
        };
        Self {
            taken_at: Utc::now(),
            document,
        }
    }

    /// Restore the captured graph; the current graph stays untouched on failure
    pub fn revert(&self, graph: &mut Graph, renderer: &mut dyn Renderer) -> Result<()> {
        let Some(document) = &self.document else {
            debug!("Reverting an empty graph snapshot does nothing");
            return Ok(());
        };
        let restored = Graph::from_json(document, graph.config().clone())?;
        graph.replace_with(restored, renderer)
    }
}

/// Snapshot of one node's attributes
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    taken_at: DateTime<Utc>,
    node: NodeId,
    attributes: Option<NodeAttributes>,
}

impl NodeSnapshot {
    pub fn take(graph: &Graph, node: NodeId) -> Self {
        let attributes = graph.node(node).map(NodeAttributes::of);
        if attributes.is_none() {
            warn!(%node, "Snapshot of an unknown node left empty");
        }
        Self {
            taken_at: Utc::now(),
            node,
            attributes,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn attributes(&self) -> Option<&NodeAttributes> {
        self.attributes.as_ref()
    }

    /// Restore the node, re-rendering it and every connection touching it
    pub fn revert(&self, graph: &mut Graph, renderer: &mut dyn Renderer) -> Result<()> {
        let Some(attributes) = &self.attributes else {
            return Ok(());
        };
        graph.clear_node_artifacts(self.node, renderer);
        let node = graph.require_mut(self.node)?;
        node.set_kind(attributes.kind.clone());
        node.set_size(attributes.width, attributes.height);
        node.set_location(attributes.location);
        node.set_colors(attributes.fill_color, attributes.border_color);
        graph.increase_size_if_location_not_available(self.node, renderer);
        graph.refresh(self.node, false, renderer)
    }
}

/// Snapshot of one connection, found again by its endpoints
#[derive(Debug, Clone)]
pub struct ConnectionSnapshot {
    taken_at: DateTime<Utc>,
    from: NodeId,
    to: NodeId,
    attributes: Option<ConnectionAttributes>,
}

impl ConnectionSnapshot {
    pub fn take(graph: &Graph, from: NodeId, to: NodeId) -> Self {
        let attributes = graph
            .connection_between(from, to)
            .and_then(|id| graph.connection(id))
            .map(|c| {
                let attributes = ConnectionAttributes::of(c);
                if c.from() == from {
                    attributes
                } else {
                    attributes.reversed()
                }
            });
        if attributes.is_none() {
            warn!(%from, %to, "Snapshot of an unknown connection left empty");
        }
        Self {
            taken_at: Utc::now(),
            from,
            to,
            attributes,
        }
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.from, self.to)
    }

    pub fn revert(&self, graph: &mut Graph, renderer: &mut dyn Renderer) -> Result<()> {
        let Some(attributes) = &self.attributes else {
            return Ok(());
        };
        let (from, to) = (self.from, self.to);
        let id = graph
            .connection_between(from, to)
            .ok_or(SearchMapError::UnknownConnection { from, to })?;
        let connection = graph
            .connections
            .get_mut(&id)
            .ok_or(SearchMapError::UnknownConnection { from, to })?;
        if let Some(render_id) = connection.take_render_id() {
            renderer.delete_object(render_id);
        }
        if connection.from() == from {
            attributes.apply(connection);
        } else {
            attributes.clone().reversed().apply(connection);
        }
        graph.sync_connection(id, renderer);
        Ok(())
    }
}

/// A state that can be restored
#[derive(Debug, Clone)]
pub enum Revertable {
    Graph(GraphSnapshot),
    Node(NodeSnapshot),
    Connection(ConnectionSnapshot),
}

impl Revertable {
    pub fn graph(graph: &Graph) -> Self {
        Revertable::Graph(GraphSnapshot::take(graph))
    }

    pub fn node(graph: &Graph, node: NodeId) -> Self {
        Revertable::Node(NodeSnapshot::take(graph, node))
    }

    pub fn connection(graph: &Graph, from: NodeId, to: NodeId) -> Self {
        Revertable::Connection(ConnectionSnapshot::take(graph, from, to))
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        match self {
            Revertable::Graph(s) => s.taken_at,
            Revertable::Node(s) => s.taken_at,
            Revertable::Connection(s) => s.taken_at,
        }
    }

    /// False when nothing was captured; reverting is then a no-op
    pub fn is_valid(&self) -> bool {
        match self {
            Revertable::Graph(s) => s.document.is_some(),
            Revertable::Node(s) => s.attributes.is_some(),
            Revertable::Connection(s) => s.attributes.is_some(),
        }
    }

    /// Same-scope snapshot of the current state
    pub fn capture_current(&self, graph: &Graph) -> Revertable {
        match self {
            Revertable::Graph(_) => Revertable::Graph(GraphSnapshot::capture(graph)),
            Revertable::Node(s) => Revertable::node(graph, s.node),
            Revertable::Connection(s) => Revertable::connection(graph, s.from, s.to),
        }
    }

    pub fn revert(&self, graph: &mut Graph, renderer: &mut dyn Renderer) -> Result<()> {
        match self {
            Revertable::Graph(s) => s.revert(graph, renderer),
            Revertable::Node(s) => s.revert(graph, renderer),
            Revertable::Connection(s) => s.revert(graph, renderer),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Revertable::Graph(_) => "graph",
            Revertable::Node(_) => "node",
            Revertable::Connection(_) => "connection",
        }
    }
}
