//! Input routing and the edit engine.
//!
//! Decoded surface events enter through [`Router::handle`], which tracks the
//! per-session modifier set, translates keys into [`EditorAction`]s, and maps
//! mouse pixels to buffer positions. Actions are applied atomically to the
//! session state by [`dispatch::dispatch`]. File open/save cross the
//! collaborator boundary in [`io_ops`].

pub mod dispatch;
pub mod io_ops;
pub mod router;
mod translate;

pub use io_ops::{DiskStore, FileError, FileStore};
pub use router::Router;
pub use translate::translate;

/// Cursor motion kinds the router can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

/// A structured edit or control operation, produced by key translation and
/// consumed by the dispatcher. Each is atomic with respect to
/// buffer + cursor + selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Insert literal text at the cursor (replace semantics when a selection
    /// is active). Printable keys, space, and tab expansion land here.
    Insert(String),
    InsertNewline,
    DeleteBackward,
    DeleteForward,
    Move { motion: Motion, extend: bool },
    Copy,
    Cut,
    Paste,
    ClearSelection,
    NewFile,
    OpenFile,
    SaveFile,
}
