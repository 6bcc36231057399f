//! Nodes of a map and their kind-specific content
//!
//! A [`Node`] is always owned by a [`Graph`](super::Graph). Its hierarchy
//! fields are private: they only change through graph operations, which keep
//! parent/children and sibling records consistent on both sides.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

use crate::core::{Color, ConnectionId, GraphConfig, Location, NodeId, Rect, RenderId, COORDINATE_LIMIT};

/// Drawing-plane width of one display column of title text
const TITLE_COLUMN_WIDTH: i32 = 24;
/// Horizontal padding around title text
const TITLE_PADDING: i32 = 40;
const TITLE_HEIGHT: i32 = 100;
const TITLE_MIN_WIDTH: i32 = 120;
const TITLE_MAX_WIDTH: i32 = 2000;

/// Kind-specific content of a node
///
/// Serialized as `{"type": "...", "payload": {...}}` so a stored node can
/// always be rebuilt as the right kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum NodeKind {
    /// A link to a web page
    WebLink {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    /// A heading that sizes itself to its text
    Title { text: String },
    /// Free text
    Text { text: String },
    /// A file on disk
    File { path: PathBuf },
}

impl NodeKind {
    pub fn web_link(url: impl Into<String>) -> Self {
        NodeKind::WebLink {
            url: url.into(),
            title: None,
        }
    }

    pub fn title(text: impl Into<String>) -> Self {
        NodeKind::Title { text: text.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeKind::Text { text: text.into() }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        NodeKind::File { path: path.into() }
    }

    /// Stable tag used in serialized documents
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::WebLink { .. } => "web_link",
            NodeKind::Title { .. } => "title",
            NodeKind::Text { .. } => "text",
            NodeKind::File { .. } => "file",
        }
    }

    /// Short text shown by renderers for this node
    pub fn summary(&self) -> String {
        match self {
            NodeKind::WebLink { url, title } => title.clone().unwrap_or_else(|| url.clone()),
            NodeKind::Title { text } | NodeKind::Text { text } => text.clone(),
            NodeKind::File { path } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    /// What clicking the node does
    pub fn click_action(&self) -> ClickAction {
        match self {
            NodeKind::WebLink { url, .. } => ClickAction::OpenUrl(url.clone()),
            NodeKind::File { path } => ClickAction::OpenFile(path.clone()),
            NodeKind::Title { .. } | NodeKind::Text { .. } => ClickAction::EditText,
        }
    }

    /// Size a freshly created node of this kind takes
    pub fn preferred_size(&self, config: &GraphConfig) -> (i32, i32) {
        match self {
            NodeKind::Title { text } => {
                let columns = i32::try_from(UnicodeWidthStr::width(text.as_str())).unwrap_or(i32::MAX);
                let width = columns
                    .saturating_mul(TITLE_COLUMN_WIDTH)
                    .saturating_add(2 * TITLE_PADDING)
                    .clamp(TITLE_MIN_WIDTH, TITLE_MAX_WIDTH);
                (width, TITLE_HEIGHT)
            }
            _ => (config.default_node_width, config.default_node_height),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Result of clicking a node, carried out by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    OpenUrl(String),
    OpenFile(PathBuf),
    EditText,
}

/// A node of the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    width: i32,
    height: i32,
    location: Location,
    fill_color: Color,
    border_color: Color,
    #[serde(default)]
    parent: Option<NodeId>,
    #[serde(default)]
    children: BTreeSet<NodeId>,
    /// Sibling id -> whether this side owns the shared connection
    #[serde(default)]
    siblings: BTreeMap<NodeId, bool>,
    #[serde(default)]
    connection_to_parent: Option<ConnectionId>,
    #[serde(default)]
    sibling_connections: BTreeMap<NodeId, ConnectionId>,
    #[serde(skip)]
    render_id: Option<RenderId>,
    #[serde(skip)]
    rendered: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, location: Location, width: i32, height: i32) -> Self {
        Self {
            id,
            kind,
            width: width.clamp(1, COORDINATE_LIMIT),
            height: height.clamp(1, COORDINATE_LIMIT),
            location: location.clamped(),
            fill_color: Color::WHITE,
            border_color: Color::BLACK,
            parent: None,
            children: BTreeSet::new(),
            siblings: BTreeMap::new(),
            connection_to_parent: None,
            sibling_connections: BTreeMap::new(),
            render_id: None,
            rendered: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Rectangle covered by the node
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.location, self.width, self.height)
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn border_color(&self) -> Color {
        self.border_color
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }

    pub fn has_child(&self, id: NodeId) -> bool {
        self.children.contains(&id)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn siblings(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.siblings.keys().copied()
    }

    pub fn is_sibling_of(&self, id: NodeId) -> bool {
        self.siblings.contains_key(&id)
    }

    /// Whether this node renders the connection shared with `sibling`
    pub fn owns_sibling_connection(&self, sibling: NodeId) -> Option<bool> {
        self.siblings.get(&sibling).copied()
    }

    pub fn connection_to_parent(&self) -> Option<ConnectionId> {
        self.connection_to_parent
    }

    pub fn sibling_connection(&self, sibling: NodeId) -> Option<ConnectionId> {
        self.sibling_connections.get(&sibling).copied()
    }

    pub fn render_id(&self) -> Option<RenderId> {
        self.render_id
    }

    /// Whether the node was ever materialized by the renderer
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location.clamped();
    }

    pub(crate) fn set_size(&mut self, width: i32, height: i32) {
        self.width = width.clamp(1, COORDINATE_LIMIT);
        self.height = height.clamp(1, COORDINATE_LIMIT);
    }

    pub(crate) fn set_colors(&mut self, fill: Color, border: Color) {
        self.fill_color = fill;
        self.border_color = border;
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<NodeId>, connection: Option<ConnectionId>) {
        self.parent = parent;
        self.connection_to_parent = connection;
    }

    pub(crate) fn take_connection_to_parent(&mut self) -> Option<ConnectionId> {
        self.connection_to_parent.take()
    }

    pub(crate) fn insert_child(&mut self, id: NodeId) {
        self.children.insert(id);
    }

    pub(crate) fn remove_child(&mut self, id: NodeId) {
        self.children.remove(&id);
    }

    pub(crate) fn insert_sibling(&mut self, id: NodeId, owner: bool, connection: ConnectionId) {
        self.siblings.insert(id, owner);
        self.sibling_connections.insert(id, connection);
    }

    /// Drop the sibling record, returning the shared connection
    pub(crate) fn remove_sibling(&mut self, id: NodeId) -> Option<ConnectionId> {
        self.siblings.remove(&id);
        self.sibling_connections.remove(&id)
    }

    pub(crate) fn sibling_connections(&self) -> impl Iterator<Item = (NodeId, ConnectionId)> + '_ {
        self.sibling_connections.iter().map(|(id, c)| (*id, *c))
    }

    pub(crate) fn set_render_id(&mut self, id: RenderId) {
        self.render_id = Some(id);
        self.rendered = true;
    }

    /// Forget the render artifact, returning it so the caller can delete it
    pub(crate) fn clear_render_state(&mut self) -> Option<RenderId> {
        self.rendered = false;
        self.render_id.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_and_summary() {
        let link = NodeKind::web_link("https://example.org/page");
        assert_eq!(link.tag(), "web_link");
        assert_eq!(link.summary(), "https://example.org/page");

        let named = NodeKind::WebLink {
            url: "https://example.org".into(),
            title: Some("Example".into()),
        };
        assert_eq!(named.summary(), "Example");

        assert_eq!(NodeKind::file("/tmp/report.pdf").summary(), "report.pdf");
        assert_eq!(NodeKind::title("Root").to_string(), "title");
    }

    #[test]
    fn test_click_actions() {
        assert_eq!(
            NodeKind::web_link("https://a.b").click_action(),
            ClickAction::OpenUrl("https://a.b".into())
        );
        assert_eq!(
            NodeKind::file("notes.txt").click_action(),
            ClickAction::OpenFile(PathBuf::from("notes.txt"))
        );
        assert_eq!(NodeKind::text("x").click_action(), ClickAction::EditText);
    }

    #[test]
    fn test_title_size_follows_display_width() {
        let config = GraphConfig::default();
        let (short, h) = NodeKind::title("ab").preferred_size(&config);
        let (long, _) = NodeKind::title("a much longer title").preferred_size(&config);
        assert_eq!(h, TITLE_HEIGHT);
        assert!(long > short);
        // wide glyphs count double
        let (wide, _) = NodeKind::title("日本").preferred_size(&config);
        assert_eq!(wide, 4 * TITLE_COLUMN_WIDTH + 2 * TITLE_PADDING);
        assert_eq!(NodeKind::text("x").preferred_size(&config), (500, 250));
    }

    #[test]
    fn test_kind_serialization_is_tagged() {
        let json = serde_json::to_value(NodeKind::title("Hello")).unwrap();
        assert_eq!(json["type"], "title");
        assert_eq!(json["payload"]["text"], "Hello");

        let back: NodeKind = serde_json::from_value(json).unwrap();
        assert_eq!(back, NodeKind::title("Hello"));
    }

    #[test]
    fn test_render_state_is_not_serialized() {
        let mut node = Node::new(NodeId(1), NodeKind::text("t"), Location::ORIGIN, 10, 10);
        node.set_render_id(RenderId(9));
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back.render_id(), None);
        assert!(!back.is_rendered());
        assert_eq!(back.id(), NodeId(1));
    }
}
