//! Editing session over one map
//!
//! [`SearchMap`] owns the graph, its undo history and the renderer, and
//! records the right snapshot before every user-level mutation. A failed
//! mutation leaves both the graph and the history unchanged.

use std::fs;
use std::path::Path;

use tracing::{info, span, Level};

use crate::core::{
    Color, ConnectionAction, GraphConfig, HistoryConfig, Location, NodeId, Renderer, Result,
    SearchMapError,
};
use crate::graph::{Graph, NodeKind};
use crate::undo::{Revertable, UndoRedoSystem};

pub struct SearchMap<R: Renderer> {
    graph: Graph,
    history: UndoRedoSystem,
    renderer: R,
}

impl<R: Renderer> SearchMap<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, GraphConfig::default(), HistoryConfig::default())
    }

    pub fn with_config(renderer: R, graph: GraphConfig, history: HistoryConfig) -> Self {
        Self {
            graph: Graph::with_config(graph),
            history: UndoRedoSystem::with_config(history),
            renderer,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn history(&self) -> &UndoRedoSystem {
        &self.history
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_parts(self) -> (Graph, R) {
        (self.graph, self.renderer)
    }

    pub fn display(&mut self) {
        self.graph.display(&mut self.renderer);
    }

    /// Replace the map with a stored document and forget the history
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let _span = span!(Level::INFO, "load_map").entered();
        let loaded = Graph::from_json(json, self.graph.config().clone())?;
        self.graph.replace_with(loaded, &mut self.renderer)?;
        self.history.clear();
        info!(nodes = self.graph.node_count(), "Map loaded");
        Ok(())
    }

    pub fn save_json(&self) -> Result<String> {
        let json = self.graph.to_json()?;
        info!(nodes = self.graph.node_count(), bytes = json.len(), "Map saved");
        Ok(json)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let json = fs::read_to_string(path.as_ref())?;
        self.load_json(&json)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.save_json()?)?;
        Ok(())
    }

    /// Run `mutation`, recording `snapshot` only if it succeeds
    fn recorded<T>(
        &mut self,
        snapshot: Revertable,
        mutation: impl FnOnce(&mut Graph, &mut R) -> Result<T>,
    ) -> Result<T> {
        let value = mutation(&mut self.graph, &mut self.renderer)?;
        self.history.record(snapshot);
        Ok(value)
    }

    /// Create a node, attach it and place it
    ///
    /// Without a parent and with no root yet, the node becomes the root.
    /// Without an explicit location a child is placed automatically around
    /// its parent.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        location: Option<Location>,
    ) -> Result<NodeId> {
        if let Some(p) = parent {
            self.graph.require(p)?;
        }
        let snapshot = Revertable::graph(&self.graph);
        self.recorded(snapshot, |graph, renderer| {
            let start = match (location, parent) {
                (Some(at), _) => at,
                (None, Some(p)) => graph.require(p)?.location(),
                (None, None) => Location::ORIGIN,
            };
            let id = graph.create_node(kind, start);
            match parent {
                Some(p) => {
                    graph.set_parent(id, Some(p), renderer)?;
                    if location.is_none() {
                        graph.place_node(id, renderer)?;
                    }
                }
                None if graph.root().is_none() => graph.set_root(Some(id))?,
                None => {}
            }
            graph.increase_size_if_location_not_available(id, renderer);
            graph.refresh(id, false, renderer)?;
            Ok(id)
        })
    }

    pub fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.graph.require(node)?;
        if let Some(p) = parent {
            self.graph.require(p)?;
            if p == node {
                return Err(SearchMapError::invalid_argument(format!(
                    "node {} cannot be its own parent",
                    node
                )));
            }
        }
        let snapshot = Revertable::graph(&self.graph);
        self.recorded(snapshot, |graph, renderer| {
            graph.set_parent(node, parent, renderer)?;
            graph.refresh(node, false, renderer)
        })
    }

    pub fn add_sibling(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let snapshot = Revertable::graph(&self.graph);
        self.recorded(snapshot, |graph, renderer| graph.add_sibling(a, b, renderer))
    }

    pub fn remove_sibling(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let snapshot = Revertable::graph(&self.graph);
        self.recorded(snapshot, |graph, renderer| graph.remove_sibling(a, b, renderer))
    }

    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        let snapshot = Revertable::graph(&self.graph);
        self.recorded(snapshot, |graph, renderer| {
            graph.delete_node(id, renderer)?;
            graph.refresh_all(renderer)
        })
    }

    pub fn move_node(&mut self, id: NodeId, location: Location) -> Result<()> {
        let snapshot = Revertable::node(&self.graph, id);
        self.recorded(snapshot, |graph, renderer| graph.move_node(id, location, renderer))
    }

    pub fn resize_node(&mut self, id: NodeId, width: i32, height: i32) -> Result<()> {
        let snapshot = Revertable::node(&self.graph, id);
        self.recorded(snapshot, |graph, renderer| {
            graph.resize_node(id, width, height, renderer)
        })
    }

    pub fn set_node_colors(&mut self, id: NodeId, fill: Color, border: Color) -> Result<()> {
        let snapshot = Revertable::node(&self.graph, id);
        self.recorded(snapshot, |graph, renderer| {
            graph.set_node_colors(id, fill, border, renderer)
        })
    }

    pub fn set_node_kind(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        let snapshot = Revertable::node(&self.graph, id);
        self.recorded(snapshot, |graph, renderer| graph.set_node_kind(id, kind, renderer))
    }

    /// What a drag at `point` edits on the connection joining `a` and `b`
    pub fn connection_action_at(&self, a: NodeId, b: NodeId, point: Location) -> Result<ConnectionAction> {
        self.graph
            .connection_action_at(a, b, point, self.renderer.zoom_level())
    }

    pub fn edit_connection_point(
        &mut self,
        a: NodeId,
        b: NodeId,
        action: ConnectionAction,
        location: Location,
    ) -> Result<()> {
        let snapshot = Revertable::connection(&self.graph, a, b);
        self.recorded(snapshot, |graph, renderer| {
            graph.edit_connection_point(a, b, action, location, renderer)
        })
    }

    pub fn reset_connection(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        let snapshot = Revertable::connection(&self.graph, a, b);
        self.recorded(snapshot, |graph, renderer| graph.reset_connection(a, b, renderer))
    }

    pub fn set_connection_colors(
        &mut self,
        a: NodeId,
        b: NodeId,
        inner: Option<Color>,
        shadow: Option<Color>,
    ) -> Result<()> {
        let snapshot = Revertable::connection(&self.graph, a, b);
        self.recorded(snapshot, |graph, renderer| {
            graph.set_connection_colors(a, b, inner, shadow, renderer)
        })
    }

    /// Collect the snapshots of several mutations into one undo step
    pub fn begin_group(&mut self) {
        self.history.begin_group();
    }

    pub fn end_group(&mut self) {
        self.history.end_group();
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.graph, &mut self.renderer)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.graph, &mut self.renderer)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeadlessRenderer;

    fn session() -> (SearchMap<HeadlessRenderer>, NodeId) {
        let mut map = SearchMap::new(HeadlessRenderer::new());
        map.display();
        let root = map.add_node(NodeKind::title("Root"), None, None).unwrap();
        (map, root)
    }

    #[test]
    fn test_first_parentless_node_becomes_root() {
        let (map, root) = session();
        assert_eq!(map.graph().root(), Some(root));
        assert_eq!(map.renderer().live_count(), 1);
    }

    #[test]
    fn test_failed_mutation_records_nothing() {
        let (mut map, root) = session();
        let before = map.history().undo_len();
        assert!(map.add_sibling(root, root).is_err());
        assert!(map.move_node(NodeId(99), Location::ORIGIN).is_err());
        assert_eq!(map.history().undo_len(), before);
    }

    #[test]
    fn test_add_child_then_undo() {
        let (mut map, root) = session();
        let child = map
            .add_node(NodeKind::text("child"), Some(root), None)
            .unwrap();
        assert_eq!(map.graph().node(child).unwrap().parent(), Some(root));
        assert_eq!(map.renderer().live_count(), 3);

        assert!(map.undo());
        assert!(!map.graph().contains(child));
        assert_eq!(map.renderer().live_count(), 1);

        assert!(map.redo());
        assert!(map.graph().contains(child));
        assert_eq!(map.renderer().live_count(), 3);
    }

    #[test]
    fn test_load_clears_history() {
        let (mut map, root) = session();
        map.add_node(NodeKind::text("c"), Some(root), None).unwrap();
        let json = map.save_json().unwrap();
        map.load_json(&json).unwrap();
        assert!(!map.history().can_undo());
        assert_eq!(map.graph().node_count(), 2);
        assert_eq!(map.renderer().live_count(), 3);
    }

    #[test]
    fn test_file_round_trip() {
        let (mut map, root) = session();
        map.add_node(NodeKind::file("/tmp/notes.md"), Some(root), None)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        map.save_file(&path).unwrap();

        let mut copy = SearchMap::new(HeadlessRenderer::new());
        copy.load_file(&path).unwrap();
        assert_eq!(copy.graph().node_count(), 2);
        assert_eq!(copy.graph().children_of(root).len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let (mut map, _) = session();
        let err = map.load_file("/no/such/dir/map.json").unwrap_err();
        assert!(matches!(err, SearchMapError::Io { .. }));
        assert_eq!(map.graph().node_count(), 1);
    }

    #[test]
    fn test_bad_load_keeps_current_map() {
        let (mut map, _) = session();
        assert!(map.load_json("{}").is_err());
        assert_eq!(map.graph().node_count(), 1);
    }
}
