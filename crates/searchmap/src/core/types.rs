//! Core type definitions for map editing
//!
//! This module contains the small value types used throughout SearchMap:
//! identifiers, colors, rectangle sides and connection edit actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::geometry::Vector;

/// Identifier of a node, assigned by its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a connection inside its graph's connection table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Opaque handle handed out by a [`Renderer`](crate::Renderer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderId(pub u64);

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// 32-bit ARGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const BLACK: Color = Color(0xFF00_0000);

    /// Import a packed ARGB value
    pub fn from_argb(argb: u32) -> Self {
        Self(argb)
    }

    pub fn from_components(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(u32::from_be_bytes([a, r, g, b]))
    }

    /// Export as a packed ARGB value
    pub fn to_argb(&self) -> u32 {
        self.0
    }

    pub fn alpha(&self) -> u8 {
        self.0.to_be_bytes()[0]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parses `#AARRGGBB` or `#RRGGBB` (opaque)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let value =
            u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid color '{}': {}", s, e))?;
        match hex.len() {
            8 => Ok(Color(value)),
            6 => Ok(Color(0xFF00_0000 | value)),
            _ => Err(format!("Invalid color '{}': expected #AARRGGBB or #RRGGBB", s)),
        }
    }
}

/// Side of a node rectangle crossed by a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Outward direction of this side with the given magnitude
    pub fn tangent(&self, magnitude: i32) -> Vector {
        match self {
            Side::Left => Vector::new(-magnitude, 0),
            Side::Right => Vector::new(magnitude, 0),
            Side::Top => Vector::new(0, -magnitude),
            Side::Bottom => Vector::new(0, magnitude),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
            Side::Top => write!(f, "top"),
            Side::Bottom => write!(f, "bottom"),
        }
    }
}

/// What dragging at a given point of a connection edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionAction {
    /// The endpoint on the `from` node
    EditConnector1,
    /// The endpoint on the `to` node
    EditConnector2,
    /// The shared middle control point
    EditControlPoint,
}

impl ConnectionAction {
    /// Indices in [`Connection::points`](crate::Connection::points) edited by this action
    pub fn point_indices(&self) -> &'static [usize] {
        match self {
            ConnectionAction::EditConnector1 => &[0],
            ConnectionAction::EditConnector2 => &[3],
            ConnectionAction::EditControlPoint => &[1, 2],
        }
    }
}
