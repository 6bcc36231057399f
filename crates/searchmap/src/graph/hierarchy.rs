//! The node graph and its hierarchy operations
//!
//! Nodes and connections live in two arenas keyed by id. Every relation is
//! stored on both sides: a child is in its parent's children set and points
//! back at the parent, and a sibling relation is recorded on both nodes with
//! exactly one of them owning the shared connection.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::connection_geometry::{curve_between, degenerate_points};
use super::{Connection, Node, NodeKind};
use crate::core::{
    Color, ConnectionId, GraphConfig, Location, NodeId, Renderer, Result, SearchMapError,
    COORDINATE_LIMIT,
};

/// A map of nodes joined by parent and sibling connections
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) connections: BTreeMap<ConnectionId, Connection>,
    pub(crate) next_id: u32,
    pub(crate) next_connection_id: u32,
    pub(crate) last_registered: Option<NodeId>,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) root: Option<NodeId>,
    pub(crate) displayed: bool,
    pub(crate) config: GraphConfig,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            nodes: BTreeMap::new(),
            connections: BTreeMap::new(),
            next_id: 1,
            next_connection_id: 1,
            last_registered: None,
            width: config.initial_width.max(1),
            height: config.initial_height.max(1),
            root: None,
            displayed: false,
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Drawing plane width, centered on the origin
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Drawing plane height, centered on the origin
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    /// Id the next created node will receive, unless it collides
    pub fn next_id(&self) -> NodeId {
        NodeId(self.next_id)
    }

    pub fn last_registered(&self) -> Option<NodeId> {
        self.last_registered
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent())
    }

    /// Children of `id` in id order; empty for unknown nodes
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|n| n.children().collect())
            .unwrap_or_default()
    }

    pub fn siblings_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|n| n.siblings().collect())
            .unwrap_or_default()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> {
        self.connections.iter().map(|(id, c)| (*id, c))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connection joining `a` and `b`, whatever its kind and direction
    pub fn connection_between(&self, a: NodeId, b: NodeId) -> Option<ConnectionId> {
        let na = self.nodes.get(&a)?;
        let nb = self.nodes.get(&b)?;
        if na.parent() == Some(b) {
            return na.connection_to_parent();
        }
        if nb.parent() == Some(a) {
            return nb.connection_to_parent();
        }
        na.sibling_connection(b)
    }

    pub(crate) fn require(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(SearchMapError::UnknownNode { id })
    }

    pub(crate) fn require_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or(SearchMapError::UnknownNode { id })
    }

    /// Make `root` the root of the map; it must have no parent
    pub fn set_root(&mut self, root: Option<NodeId>) -> Result<()> {
        if let Some(id) = root {
            if self.require(id)?.parent().is_some() {
                return Err(SearchMapError::invalid_argument(format!(
                    "root {} cannot have a parent",
                    id
                )));
            }
        }
        debug!(root = ?root, "Setting root");
        self.root = root;
        Ok(())
    }

    /// Create and register a node sized for its kind
    pub fn create_node(&mut self, kind: NodeKind, location: Location) -> NodeId {
        let (width, height) = kind.preferred_size(&self.config);
        self.create_node_with_size(kind, location, width, height)
    }

    /// Create and register a node with an explicit size
    pub fn create_node_with_size(
        &mut self,
        kind: NodeKind,
        location: Location,
        width: i32,
        height: i32,
    ) -> NodeId {
        let id = self.allocate_id();
        debug!(node = %id, kind = kind.tag(), %location, "Creating node");
        self.nodes
            .insert(id, Node::new(id, kind, location, width, height));
        self.last_registered = Some(id);
        id
    }

    fn allocate_id(&mut self) -> NodeId {
        let mut candidate = NodeId(self.next_id);
        if self.nodes.contains_key(&candidate) {
            let max = self.nodes.keys().next_back().map_or(0, |id| id.0);
            warn!(
                requested = %candidate,
                assigned = max + 1,
                "Node id already taken, using next free id"
            );
            candidate = NodeId(max + 1);
        }
        self.next_id = candidate.0 + 1;
        candidate
    }

    fn allocate_connection_id(&mut self) -> ConnectionId {
        let id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;
        id
    }

    /// Build an unregistered connection from `from` to `to`
    ///
    /// Colocated nodes get a straight placeholder curve that the next refresh
    /// replaces once the nodes are apart.
    pub fn create_connection_between(&self, from: NodeId, to: NodeId) -> Result<Connection> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        let points = match curve_between(a, b, &self.config.connection) {
            Ok(curve) => curve.points,
            Err(_) => {
                debug!(%from, %to, "Nodes are colocated, connection left straight");
                degenerate_points(a, b)
            }
        };
        Ok(Connection::new(from, to, points, a.location(), b.location()))
    }

    fn register_connection(&mut self, connection: Connection) -> ConnectionId {
        let id = self.allocate_connection_id();
        self.connections.insert(id, connection);
        id
    }

    /// True if `candidate` is `ancestor` or lies below it
    pub fn is_descendant(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(candidate);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = self.nodes.get(&id).and_then(Node::parent);
        }
        false
    }

    fn topmost_ancestor(&self, id: NodeId) -> NodeId {
        let mut current = id;
        let mut steps = 0;
        while let Some(parent) = self.nodes.get(&current).and_then(Node::parent) {
            current = parent;
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }
        current
    }

    /// Attach `node` under `parent`, or detach it when `parent` is `None`
    ///
    /// Moving a node under one of its own descendants first lifts that
    /// descendant to the node's former place, so the hierarchy never cycles.
    /// When the new parent is already a sibling, the sibling connection is
    /// turned into the parent connection.
    pub fn set_parent(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let old_parent = self.require(node)?.parent();
        if let Some(p) = parent {
            self.require(p)?;
            if p == node {
                return Err(SearchMapError::invalid_argument(format!(
                    "node {} cannot be its own parent",
                    node
                )));
            }
        }
        if old_parent == parent {
            return Ok(());
        }

        debug!(%node, old_parent = ?old_parent, new_parent = ?parent, "Setting parent");

        if let Some(p) = parent {
            if self.is_descendant(p, node) {
                debug!(%node, descendant = %p, "Lifting descendant before reparenting");
                self.set_parent(p, old_parent, renderer)?;
            }
        }

        // a sibling connection to the new parent becomes the parent connection
        let reused = match parent {
            Some(p) => self.unlink_siblings(node, p),
            None => None,
        };

        self.detach_from_parent(node, renderer);

        if let Some(p) = parent {
            let connection_id = match reused {
                Some(id) => {
                    if let Some(connection) = self.connections.get_mut(&id) {
                        if connection.from() != p {
                            connection.reverse();
                        }
                        connection.set_bold(true);
                        if let Some(render_id) = connection.take_render_id() {
                            renderer.delete_object(render_id);
                        }
                    }
                    id
                }
                None => {
                    let mut connection = self.create_connection_between(p, node)?;
                    connection.set_bold(true);
                    self.register_connection(connection)
                }
            };
            self.require_mut(node)?
                .set_parent_link(Some(p), Some(connection_id));
            self.require_mut(p)?.insert_child(node);
            self.refresh_connection(connection_id)?;
            self.sync_connection(connection_id, renderer);
        }

        if let Some(root) = self.root {
            if self.nodes.get(&root).and_then(Node::parent).is_some() {
                let top = self.topmost_ancestor(root);
                debug!(old_root = %root, new_root = %top, "Root moved under another node");
                self.root = Some(top);
            }
        }
        Ok(())
    }

    /// Drop the sibling records between `a` and `b`, returning their connection
    fn unlink_siblings(&mut self, a: NodeId, b: NodeId) -> Option<ConnectionId> {
        let connection = self.nodes.get_mut(&a)?.remove_sibling(b);
        if let Some(nb) = self.nodes.get_mut(&b) {
            nb.remove_sibling(a);
        }
        connection
    }

    fn detach_from_parent(&mut self, node: NodeId, renderer: &mut dyn Renderer) {
        let Some(n) = self.nodes.get_mut(&node) else {
            return;
        };
        let old_parent = n.parent();
        let connection = n.take_connection_to_parent();
        n.set_parent_link(None, None);

        if let Some(p) = old_parent {
            if let Some(parent) = self.nodes.get_mut(&p) {
                parent.remove_child(node);
            }
        }
        if let Some(id) = connection {
            self.remove_connection(id, renderer);
        }
    }

    pub(crate) fn remove_connection(&mut self, id: ConnectionId, renderer: &mut dyn Renderer) {
        if let Some(mut connection) = self.connections.remove(&id) {
            if let Some(render_id) = connection.take_render_id() {
                renderer.delete_object(render_id);
            }
        }
    }

    /// Join `a` and `b` as siblings; `a` owns the new connection
    pub fn add_sibling(&mut self, a: NodeId, b: NodeId, renderer: &mut dyn Renderer) -> Result<()> {
        let na = self.require(a)?;
        let nb = self.require(b)?;
        if a == b
            || na.parent() == Some(b)
            || nb.parent() == Some(a)
            || na.is_sibling_of(b)
        {
            return Err(SearchMapError::AlreadyConnected { a, b });
        }

        debug!(owner = %a, other = %b, "Adding sibling");
        let connection = self.create_connection_between(a, b)?;
        let id = self.register_connection(connection);
        self.require_mut(a)?.insert_sibling(b, true, id);
        self.require_mut(b)?.insert_sibling(a, false, id);
        self.sync_connection(id, renderer);
        Ok(())
    }

    /// Undo [`Graph::add_sibling`]; fails if `a` and `b` are not siblings
    pub fn remove_sibling(&mut self, a: NodeId, b: NodeId, renderer: &mut dyn Renderer) -> Result<()> {
        self.require(b)?;
        if !self.require(a)?.is_sibling_of(b) {
            return Err(SearchMapError::invalid_argument(format!(
                "nodes {} and {} are not siblings",
                a, b
            )));
        }
        debug!(%a, %b, "Removing sibling");
        if let Some(id) = self.unlink_siblings(a, b) {
            self.remove_connection(id, renderer);
        }
        Ok(())
    }

    /// Remove a node, keeping its children in the map
    ///
    /// Children move up to the former parent. When the root goes, its first
    /// child becomes the new root and adopts the other children.
    pub fn delete_node(&mut self, id: NodeId, renderer: &mut dyn Renderer) -> Result<()> {
        let node = self.require(id)?;
        let old_parent = node.parent();
        let children: Vec<NodeId> = node.children().collect();
        let siblings: Vec<NodeId> = node.siblings().collect();

        debug!(node = %id, children = children.len(), siblings = siblings.len(), "Deleting node");

        if self.root == Some(id) {
            match children.split_first() {
                Some((&first, rest)) => {
                    self.set_parent(first, None, renderer)?;
                    self.root = Some(first);
                    for &child in rest {
                        self.set_parent(child, Some(first), renderer)?;
                    }
                }
                None => self.root = None,
            }
        } else {
            for child in children {
                self.set_parent(child, old_parent, renderer)?;
            }
        }

        for sibling in siblings {
            if let Some(connection) = self.unlink_siblings(id, sibling) {
                self.remove_connection(connection, renderer);
            }
        }
        self.detach_from_parent(id, renderer);

        if let Some(mut node) = self.nodes.remove(&id) {
            if let Some(render_id) = node.clear_render_state() {
                renderer.delete_object(render_id);
            }
        }
        if self.last_registered == Some(id) {
            self.last_registered = None;
        }
        Ok(())
    }

    /// Move a node and refresh it and its connections
    pub fn move_node(&mut self, id: NodeId, location: Location, renderer: &mut dyn Renderer) -> Result<()> {
        self.require_mut(id)?.set_location(location);
        debug!(node = %id, %location, "Moving node");
        self.increase_size_if_location_not_available(id, renderer);
        self.refresh(id, true, renderer)
    }

    pub fn resize_node(
        &mut self,
        id: NodeId,
        width: i32,
        height: i32,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        self.require(id)?;
        if width <= 0 || height <= 0 {
            return Err(SearchMapError::invalid_argument(format!(
                "node size must be positive, got {}x{}",
                width, height
            )));
        }
        self.require_mut(id)?.set_size(width, height);
        debug!(node = %id, width, height, "Resizing node");
        self.increase_size_if_location_not_available(id, renderer);
        self.refresh(id, false, renderer)
    }

    pub fn set_node_colors(
        &mut self,
        id: NodeId,
        fill: Color,
        border: Color,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        self.require_mut(id)?.set_colors(fill, border);
        self.refresh(id, false, renderer)
    }

    pub fn set_node_kind(&mut self, id: NodeId, kind: NodeKind, renderer: &mut dyn Renderer) -> Result<()> {
        self.require_mut(id)?.set_kind(kind);
        self.refresh(id, false, renderer)
    }

    /// Grow the drawing plane until the node fits, doubling each time
    ///
    /// Returns true if the plane grew. The renderer hears about the new size
    /// once the map is displayed.
    pub fn increase_size_if_location_not_available(
        &mut self,
        id: NodeId,
        renderer: &mut dyn Renderer,
    ) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        let bounds = node.bounds();
        let reach_x = bounds.left.unsigned_abs().max(bounds.right.unsigned_abs());
        let reach_y = bounds.top.unsigned_abs().max(bounds.bottom.unsigned_abs());

        let mut grown = false;
        while reach_x > (self.width / 2) as u32 && self.width < i32::MAX / 2 {
            self.width *= 2;
            grown = true;
        }
        while reach_y > (self.height / 2) as u32 && self.height < i32::MAX / 2 {
            self.height *= 2;
            grown = true;
        }

        if grown {
            debug!(width = self.width, height = self.height, node = %id, "Drawing plane grew");
            if self.displayed {
                renderer.set_drawing_zone_size(self.width, self.height);
            }
        }
        grown
    }

    /// Consistency violations of the stored relations, empty when sound
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut referenced: BTreeSet<ConnectionId> = BTreeSet::new();

        if let Some(root) = self.root {
            match self.nodes.get(&root) {
                None => problems.push(format!("root {} is not registered", root)),
                Some(node) if node.parent().is_some() => {
                    problems.push(format!("root {} has a parent", root))
                }
                _ => {}
            }
        }

        for (key, node) in &self.nodes {
            let id = node.id();
            if *key != id {
                problems.push(format!("node {} stored under key {}", id, key));
            }
            if node.width() <= 0 || node.height() <= 0 {
                problems.push(format!(
                    "node {} has non-positive size {}x{}",
                    id,
                    node.width(),
                    node.height()
                ));
            }
            if !node.location().is_within_limit()
                || node.width() > COORDINATE_LIMIT
                || node.height() > COORDINATE_LIMIT
            {
                problems.push(format!("node {} lies outside the drawing plane", id));
            }

            if let Some(parent) = node.parent() {
                match self.nodes.get(&parent) {
                    None => problems.push(format!("node {} has unknown parent {}", id, parent)),
                    Some(p) if !p.has_child(id) => {
                        problems.push(format!("parent {} does not list child {}", parent, id))
                    }
                    _ => {}
                }
                match node.connection_to_parent().and_then(|c| self.connections.get(&c).map(|conn| (c, conn))) {
                    Some((c, conn)) => {
                        referenced.insert(c);
                        if conn.from() != parent || conn.to() != id {
                            problems.push(format!(
                                "parent connection {} of {} does not run from {}",
                                c, id, parent
                            ));
                        }
                    }
                    None => problems.push(format!("node {} has no parent connection", id)),
                }
                if self.is_descendant(parent, id) {
                    problems.push(format!("node {} is its own ancestor", id));
                }
            } else if node.connection_to_parent().is_some() {
                problems.push(format!("parentless node {} keeps a parent connection", id));
            }

            for child in node.children() {
                if self.nodes.get(&child).and_then(Node::parent) != Some(id) {
                    problems.push(format!("child {} does not point back to {}", child, id));
                }
            }

            for sibling in node.siblings() {
                let Some(other) = self.nodes.get(&sibling) else {
                    problems.push(format!("node {} has unknown sibling {}", id, sibling));
                    continue;
                };
                let mine = node.owns_sibling_connection(sibling);
                let theirs = other.owns_sibling_connection(id);
                match (mine, theirs) {
                    (Some(a), Some(b)) if a != b => {}
                    (Some(_), Some(_)) => problems.push(format!(
                        "siblings {} and {} do not have exactly one owner",
                        id, sibling
                    )),
                    _ => problems.push(format!(
                        "sibling relation {} -> {} is not symmetric",
                        id, sibling
                    )),
                }
                let shared = node.sibling_connection(sibling);
                if shared.is_none() || shared != other.sibling_connection(id) {
                    problems.push(format!(
                        "siblings {} and {} do not share one connection",
                        id, sibling
                    ));
                }
                if let Some(c) = shared {
                    match self.connections.get(&c) {
                        Some(conn) if conn.joins(id, sibling) => {
                            referenced.insert(c);
                        }
                        _ => problems.push(format!(
                            "sibling connection {} does not join {} and {}",
                            c, id, sibling
                        )),
                    }
                }
            }
        }

        for id in self.connections.keys() {
            if !referenced.contains(id) {
                problems.push(format!("connection {} is not used by any node", id));
            }
        }

        problems
    }
}
