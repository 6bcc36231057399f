//! JSON document format of a map
//!
//! A document is the complete, self-contained state of a graph: nodes with
//! their relations, connections with their user customizations, the drawing
//! plane size and the id counter. Render handles are never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{Connection, Graph, Node};
use crate::core::{ConnectionId, GraphConfig, NodeId, Renderer, Result, SearchMapError};

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

/// Serialized form of a [`Graph`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDocument {
    pub version: u32,
    pub next_id: u32,
    #[serde(default)]
    pub root: Option<NodeId>,
    pub width: i32,
    pub height: i32,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: BTreeMap<ConnectionId, Connection>,
}

impl Graph {
    /// Capture the graph as a document
    pub fn to_document(&self) -> MapDocument {
        MapDocument {
            version: DOCUMENT_VERSION,
            next_id: self.next_id,
            root: self.root,
            width: self.width,
            height: self.height,
            nodes: self.nodes.values().cloned().collect(),
            connections: self.connections.clone(),
        }
    }

    /// Rebuild a graph from a document, rejecting inconsistent ones
    ///
    /// The returned graph is not displayed; render state starts empty.
    pub fn from_document(document: MapDocument, config: GraphConfig) -> Result<Graph> {
        if document.version > DOCUMENT_VERSION {
            return Err(SearchMapError::invalid_argument(format!(
                "document version {} is newer than supported version {}",
                document.version, DOCUMENT_VERSION
            )));
        }

        let mut graph = Graph::with_config(config);
        for node in document.nodes {
            let id = node.id();
            if graph.nodes.insert(id, node).is_some() {
                return Err(SearchMapError::invalid_argument(format!(
                    "node {} appears twice",
                    id
                )));
            }
        }
        graph.connections = document.connections;
        graph.root = document.root;
        graph.width = document.width.max(1);
        graph.height = document.height.max(1);

        let max_node = graph.nodes.keys().next_back().map_or(0, |id| id.0);
        graph.next_id = document.next_id.max(max_node + 1);
        graph.next_connection_id = graph
            .connections
            .keys()
            .next_back()
            .map_or(1, |id| id.0 + 1);
        graph.last_registered = graph.nodes.keys().next_back().copied();

        let problems = graph.validate();
        if let Some(first) = problems.first() {
            return Err(SearchMapError::invalid_argument(format!(
                "inconsistent document ({} problems): {}",
                problems.len(),
                first
            )));
        }
        debug!(
            nodes = graph.node_count(),
            connections = graph.connection_count(),
            "Rebuilt graph from document"
        );
        Ok(graph)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    pub fn from_json(json: &str, config: GraphConfig) -> Result<Graph> {
        let document: MapDocument = serde_json::from_str(json)?;
        Graph::from_document(document, config)
    }

    /// Replace the whole content of this graph with `other`
    ///
    /// Current render artifacts are deleted first. If this graph was
    /// displayed, the new content is displayed in its place.
    pub fn replace_with(&mut self, other: Graph, renderer: &mut dyn Renderer) -> Result<()> {
        let displayed = self.displayed;
        self.clear_render_artifacts(renderer);

        self.nodes = other.nodes;
        self.connections = other.connections;
        self.next_id = other.next_id;
        self.next_connection_id = other.next_connection_id;
        self.last_registered = other.last_registered;
        self.width = other.width;
        self.height = other.height;
        self.root = other.root;

        info!(nodes = self.node_count(), "Replaced graph content");
        if displayed {
            renderer.set_drawing_zone_size(self.width, self.height);
            self.refresh_all(renderer)?;
        }
        Ok(())
    }
}
