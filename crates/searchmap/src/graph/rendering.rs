//! Keeping the renderer in sync with the graph
//!
//! Geometry is always recomputed; renderer calls are only issued once the map
//! has been displayed.

use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

use super::connection_geometry::adapt_connection;
use super::Graph;
use crate::core::{ConnectionId, NodeId, Renderer, Result, SearchMapError};

impl Graph {
    /// Report the plane size and materialize every node and connection
    pub fn display(&mut self, renderer: &mut dyn Renderer) {
        self.displayed = true;
        renderer.set_drawing_zone_size(self.width, self.height);
        if let Err(e) = self.refresh_all(renderer) {
            warn!(error = %e, "Display left the map partially rendered");
        }
    }

    /// Refresh from the root, then every other parentless node
    pub fn refresh_all(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let mut visited = BTreeSet::new();
        let tops: Vec<NodeId> = self
            .root
            .into_iter()
            .chain(
                self.nodes
                    .values()
                    .filter(|n| n.parent().is_none())
                    .map(|n| n.id()),
            )
            .collect();
        for id in tops {
            self.refresh_from(id, false, &mut visited, renderer)?;
        }
        Ok(())
    }

    /// Re-render a node, its connections and its whole subtree
    ///
    /// With `move_visually` the renderer is asked to animate the node to its
    /// location before being refreshed.
    pub fn refresh(&mut self, id: NodeId, move_visually: bool, renderer: &mut dyn Renderer) -> Result<()> {
        self.require(id)?;
        let mut visited = BTreeSet::new();
        self.refresh_from(id, move_visually, &mut visited, renderer)
    }

    fn refresh_from(
        &mut self,
        id: NodeId,
        move_visually: bool,
        visited: &mut BTreeSet<NodeId>,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        if !visited.insert(id) {
            return Ok(());
        }
        trace!(node = %id, move_visually, "Refreshing node");

        if self.displayed {
            self.sync_node(id, move_visually, renderer)?;
        }

        let node = self.require(id)?;
        let parent_connection = node.connection_to_parent();
        let sibling_connections: Vec<ConnectionId> =
            node.sibling_connections().map(|(_, c)| c).collect();
        let children: Vec<NodeId> = node.children().collect();

        for connection in parent_connection.into_iter().chain(sibling_connections) {
            self.refresh_connection(connection)?;
            self.sync_connection(connection, renderer);
        }
        for child in children {
            self.refresh_from(child, false, visited, renderer)?;
        }
        Ok(())
    }

    fn sync_node(&mut self, id: NodeId, move_visually: bool, renderer: &mut dyn Renderer) -> Result<()> {
        let node = self.require(id)?;
        match node.render_id().filter(|_| node.is_rendered()) {
            Some(render_id) => {
                if move_visually {
                    renderer.move_object_smoothly(render_id, node.location());
                }
                if let Err(e) = renderer.refresh_node(render_id, node) {
                    warn!(node = %id, error = %e, "Renderer lost the node, rendering it again");
                    let render_id = renderer.render_node(node);
                    self.require_mut(id)?.set_render_id(render_id);
                }
            }
            None => {
                let render_id = renderer.render_node(node);
                self.require_mut(id)?.set_render_id(render_id);
            }
        }
        Ok(())
    }

    /// Recompute the points of a connection from its current nodes
    pub fn refresh_connection(&mut self, id: ConnectionId) -> Result<()> {
        let connection = self
            .connections
            .get_mut(&id)
            .ok_or_else(|| SearchMapError::not_found(format!("connection {}", id)))?;
        let (from, to) = (connection.from(), connection.to());
        match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(a), Some(b)) => {
                adapt_connection(connection, a, b, &self.config.connection);
                Ok(())
            }
            _ => Err(SearchMapError::UnknownConnection { from, to }),
        }
    }

    /// Render or refresh a connection once both of its nodes are on screen
    ///
    /// Sibling connections are owned by their `from` side, which is the side
    /// whose artifact this stores.
    pub(crate) fn sync_connection(&mut self, id: ConnectionId, renderer: &mut dyn Renderer) {
        if !self.displayed {
            return;
        }
        let Some(connection) = self.connections.get_mut(&id) else {
            return;
        };
        let ready = [connection.from(), connection.to()]
            .iter()
            .all(|n| self.nodes.get(n).is_some_and(|node| node.is_rendered()));
        if !ready {
            return;
        }

        match connection.render_id() {
            Some(render_id) => {
                if let Err(e) = renderer.refresh_curved_line(render_id, connection) {
                    debug!(connection = %id, error = %e, "Rendering connection again");
                    let render_id = renderer.render_curved_line(connection);
                    connection.set_render_id(render_id);
                }
            }
            None => {
                let render_id = renderer.render_curved_line(connection);
                connection.set_render_id(render_id);
            }
        }
    }

    /// Delete every render artifact and forget the handles
    pub(crate) fn clear_render_artifacts(&mut self, renderer: &mut dyn Renderer) {
        for connection in self.connections.values_mut() {
            if let Some(render_id) = connection.take_render_id() {
                renderer.delete_object(render_id);
            }
        }
        for node in self.nodes.values_mut() {
            if let Some(render_id) = node.clear_render_state() {
                renderer.delete_object(render_id);
            }
        }
    }

    /// Forget the artifacts of one node and of every connection touching it
    pub(crate) fn clear_node_artifacts(&mut self, id: NodeId, renderer: &mut dyn Renderer) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if let Some(render_id) = node.clear_render_state() {
            renderer.delete_object(render_id);
        }
        for connection in self.connections.values_mut() {
            if connection.from() == id || connection.to() == id {
                if let Some(render_id) = connection.take_render_id() {
                    renderer.delete_object(render_id);
                }
            }
        }
    }
}
