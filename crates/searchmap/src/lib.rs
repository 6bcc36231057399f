//! SearchMap - a mind-map editing engine
//!
//! A library for editing maps of web links, titles, text and file nodes
//! joined by curved connections. It keeps the node hierarchy consistent,
//! computes connection curves, places new nodes without overlap and provides
//! snapshot-based undo and redo. Drawing is left to a [`Renderer`].
//!
//! # Quick Start
//!
//! ```rust
//! use searchmap::prelude::*;
//!
//! let mut map = SearchMap::new(HeadlessRenderer::new());
//! map.display();
//!
//! let root = map.add_node(NodeKind::title("Research"), None, None).unwrap();
//! let link = map
//!     .add_node(NodeKind::web_link("https://www.rust-lang.org"), Some(root), None)
//!     .unwrap();
//!
//! assert_eq!(map.graph().node(link).unwrap().parent(), Some(root));
//! assert_eq!(map.renderer().line_count(), 1);
//!
//! map.undo();
//! assert!(!map.graph().contains(link));
//! ```
//!
//! # Advanced Usage
//!
//! The [`Graph`] can be driven directly, without history:
//!
//! ```rust
//! use searchmap::prelude::*;
//!
//! let mut graph = Graph::new();
//! let mut renderer = HeadlessRenderer::new();
//!
//! let a = graph.create_node(NodeKind::text("a"), Location::new(0, 0));
//! let b = graph.create_node(NodeKind::text("b"), Location::new(1000, 0));
//! graph.set_root(Some(a)).unwrap();
//! graph.add_sibling(a, b, &mut renderer).unwrap();
//!
//! let json = graph.to_json().unwrap();
//! let copy = Graph::from_json(&json, GraphConfig::default()).unwrap();
//! assert!(copy.node(b).unwrap().is_sibling_of(a));
//! ```

pub mod core;
pub mod graph;
mod map;
pub mod undo;

pub use core::*;
pub use graph::{
    ClickAction, Connection, CurveGeometry, Graph, MapDocument, Node, NodeKind, DOCUMENT_VERSION,
};
pub use map::SearchMap;
pub use undo::{Revertable, RevertGroup, UndoRedoSystem};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Color, ConnectionAction, GraphConfig, HeadlessRenderer, HistoryConfig, Location, NodeId,
        Renderer, Result, SearchMapError,
    };
    pub use crate::graph::{Connection, Graph, Node, NodeKind};
    pub use crate::map::SearchMap;
    pub use crate::undo::{Revertable, UndoRedoSystem};
}
