//! Renderer contract between the graph engine and the view layer
//!
//! The engine never draws anything itself. Whenever state changes it calls
//! into a [`Renderer`], synchronously, with the entity being materialized.
//! The renderer hands back opaque [`RenderId`]s used in all later calls.
//!
//! # Example
//! ```
//! use searchmap::{Graph, HeadlessRenderer, Location, NodeKind, Renderer};
//!
//! let mut graph = Graph::new();
//! let mut renderer = HeadlessRenderer::new();
//! let root = graph.create_node(NodeKind::title("Root"), Location::new(0, 0));
//! graph.set_root(Some(root)).unwrap();
//! graph.display(&mut renderer);
//! assert_eq!(renderer.live_count(), 1);
//! ```

use std::collections::BTreeMap;
use tracing::trace;

use super::{Location, NodeId, RenderId, Result, SearchMapError};
use crate::graph::{Connection, Node};

/// Callbacks the engine issues to reflect state on screen
///
/// Implementations must return immediately and must not call back into the
/// graph while handling a call.
pub trait Renderer {
    /// Report the current drawing plane size; called on display and on growth
    fn set_drawing_zone_size(&mut self, width: i32, height: i32);

    /// Materialize a node, returning its handle
    fn render_node(&mut self, node: &Node) -> RenderId;

    /// Re-synchronize a materialized node
    ///
    /// Fails with [`SearchMapError::UnknownRenderId`] if `id` was never
    /// returned by [`Renderer::render_node`] or has been deleted.
    fn refresh_node(&mut self, id: RenderId, node: &Node) -> Result<()>;

    /// Remove a node or a line; false if `id` is unknown
    fn delete_object(&mut self, id: RenderId) -> bool;

    /// Materialize a connection, returning its handle
    fn render_curved_line(&mut self, connection: &Connection) -> RenderId;

    /// Re-synchronize a materialized connection
    fn refresh_curved_line(&mut self, id: RenderId, connection: &Connection) -> Result<()>;

    /// Request an animated move; completion is not awaited
    fn move_object_smoothly(&mut self, id: RenderId, destination: Location);

    /// Current view zoom, 1.0 meaning unscaled
    fn zoom_level(&self) -> f64;
}

/// A materialized object as last reported to a [`HeadlessRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedObject {
    Node {
        node: NodeId,
        location: Location,
        width: i32,
        height: i32,
    },
    CurvedLine {
        from: NodeId,
        to: NodeId,
        points: [Location; 4],
        bold: bool,
    },
}

/// One call received by a [`HeadlessRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    SetDrawingZoneSize { width: i32, height: i32 },
    RenderNode { node: NodeId, id: RenderId },
    RefreshNode { id: RenderId },
    DeleteObject { id: RenderId, existed: bool },
    RenderCurvedLine { from: NodeId, to: NodeId, id: RenderId },
    RefreshCurvedLine { id: RenderId },
    MoveObjectSmoothly { id: RenderId, destination: Location },
}

/// In-memory renderer without a screen
///
/// Keeps the table of live objects and an ordered log of every call, which
/// makes it the renderer of choice for tests and for the command line tool.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    next_id: u64,
    zoom: f64,
    drawing_zone: (i32, i32),
    objects: BTreeMap<RenderId, RenderedObject>,
    calls: Vec<RenderCall>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            zoom: 1.0,
            drawing_zone: (0, 0),
            objects: BTreeMap::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.set_zoom(zoom);
        self
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn drawing_zone_size(&self) -> (i32, i32) {
        self.drawing_zone
    }

    pub fn object(&self, id: RenderId) -> Option<&RenderedObject> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (&RenderId, &RenderedObject)> {
        self.objects.iter()
    }

    /// Number of live objects
    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of live connection lines
    pub fn line_count(&self) -> usize {
        self.objects
            .values()
            .filter(|o| matches!(o, RenderedObject::CurvedLine { .. }))
            .count()
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn allocate(&mut self) -> RenderId {
        let id = RenderId(self.next_id);
        self.next_id += 1;
        id
    }

    fn node_object(node: &Node) -> RenderedObject {
        RenderedObject::Node {
            node: node.id(),
            location: node.location(),
            width: node.width(),
            height: node.height(),
        }
    }

    fn line_object(connection: &Connection) -> RenderedObject {
        RenderedObject::CurvedLine {
            from: connection.from(),
            to: connection.to(),
            points: *connection.points(),
            bold: connection.is_bold(),
        }
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HeadlessRenderer {
    fn set_drawing_zone_size(&mut self, width: i32, height: i32) {
        self.drawing_zone = (width, height);
        self.calls
            .push(RenderCall::SetDrawingZoneSize { width, height });
    }

    fn render_node(&mut self, node: &Node) -> RenderId {
        let id = self.allocate();
        trace!(node = %node.id(), render_id = %id, "Rendering node");
        self.objects.insert(id, Self::node_object(node));
        self.calls.push(RenderCall::RenderNode {
            node: node.id(),
            id,
        });
        id
    }

    fn refresh_node(&mut self, id: RenderId, node: &Node) -> Result<()> {
        match self.objects.get_mut(&id) {
            Some(object @ RenderedObject::Node { .. }) => {
                *object = Self::node_object(node);
                self.calls.push(RenderCall::RefreshNode { id });
                Ok(())
            }
            _ => Err(SearchMapError::UnknownRenderId { id }),
        }
    }

    fn delete_object(&mut self, id: RenderId) -> bool {
        let existed = self.objects.remove(&id).is_some();
        self.calls.push(RenderCall::DeleteObject { id, existed });
        existed
    }

    fn render_curved_line(&mut self, connection: &Connection) -> RenderId {
        let id = self.allocate();
        self.objects.insert(id, Self::line_object(connection));
        self.calls.push(RenderCall::RenderCurvedLine {
            from: connection.from(),
            to: connection.to(),
            id,
        });
        id
    }

    fn refresh_curved_line(&mut self, id: RenderId, connection: &Connection) -> Result<()> {
        match self.objects.get_mut(&id) {
            Some(object @ RenderedObject::CurvedLine { .. }) => {
                *object = Self::line_object(connection);
                self.calls.push(RenderCall::RefreshCurvedLine { id });
                Ok(())
            }
            _ => Err(SearchMapError::UnknownRenderId { id }),
        }
    }

    fn move_object_smoothly(&mut self, id: RenderId, destination: Location) {
        if let Some(RenderedObject::Node { location, .. }) = self.objects.get_mut(&id) {
            *location = destination;
        }
        self.calls
            .push(RenderCall::MoveObjectSmoothly { id, destination });
    }

    fn zoom_level(&self) -> f64 {
        self.zoom
    }
}
