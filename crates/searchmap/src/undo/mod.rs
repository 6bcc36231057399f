//! Snapshot-based undo and redo

mod history;
mod snapshot;

pub use history::{RevertGroup, UndoRedoSystem};
pub use snapshot::{
    ConnectionAttributes, ConnectionSnapshot, GraphSnapshot, NodeAttributes, NodeSnapshot,
    Revertable,
};
