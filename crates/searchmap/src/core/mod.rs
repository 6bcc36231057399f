//! Core building blocks shared by every part of the engine
//!
//! Geometry primitives, identifiers, errors, configuration, the renderer
//! contract and logging setup.

mod config;
mod error;
mod geometry;
pub mod logging;
mod renderer;
mod types;

pub use config::*;
pub use error::*;
pub use geometry::*;
pub use logging::*;
pub use renderer::*;
pub use types::*;
