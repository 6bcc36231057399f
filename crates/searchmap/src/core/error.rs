//! Core error types for map editing
//!
//! This module defines the error type shared by the graph, the connection
//! geometry engine, the placement algorithm and the undo system.

use thiserror::Error;

use super::{NodeId, RenderId};

/// Core error types for map editing
#[derive(Error, Debug)]
pub enum SearchMapError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Already connected: nodes {a} and {b}")]
    AlreadyConnected { a: NodeId, b: NodeId },

    #[error("Unknown node: {id}")]
    UnknownNode { id: NodeId },

    #[error("Unknown connection between nodes {from} and {to}")]
    UnknownConnection { from: NodeId, to: NodeId },

    #[error("Unknown render id: {id}")]
    UnknownRenderId { id: RenderId },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SearchMapError {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Returns true for every error caused by a bad request from the caller.
    ///
    /// The graph is left unchanged when one of these is returned.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::AlreadyConnected { .. }
                | Self::UnknownNode { .. }
                | Self::UnknownConnection { .. }
                | Self::UnknownRenderId { .. }
        )
    }

    /// Returns true for geometric impossibilities
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, SearchMapError>;
