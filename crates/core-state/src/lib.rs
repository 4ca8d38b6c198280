//! Per-session editor state: cursor, selection, clipboard, viewport.
//!
//! One `EditorState` exists per connection and is only ever touched from that
//! session's thread, so nothing here locks. Motions live on `EditorState`
//! because every one of them needs the buffer for clamping and the selection
//! for extend semantics.

use core_text::{Buffer, Position};
use std::path::PathBuf;

pub mod viewport;
pub use viewport::Viewport;

/// The single insertion point. `desired_column` is the sticky column carried
/// across consecutive vertical moves: moving through a short line clamps the
/// visible column but keeps the desired one, and any horizontal move or edit
/// resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub pos: Position,
    pub desired_column: Option<usize>,
}

impl Cursor {
    pub fn origin() -> Self {
        Self {
            pos: Position::origin(),
            desired_column: None,
        }
    }
}

/// An anchor/active position pair. The anchor is where the selection began
/// and never moves while extending; normalized document order is computed on
/// demand so shrinking back across the anchor keeps working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// (start, end) in document order.
    pub fn normalized(&self) -> (Position, Position) {
        (
            self.anchor.min(self.active),
            self.anchor.max(self.active),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }
}

/// All mutable state for one session.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub buffer: Buffer,
    pub cursor: Cursor,
    pub selection: Option<Selection>,
    /// Process-held clipboard; absent until the first copy or cut.
    pub clipboard: Option<String>,
    pub viewport: Viewport,
    pub path: Option<PathBuf>,
    pub modified: bool,
    /// Transient message shown in the status bar (file-op outcomes). Replaced
    /// by the next message, cleared on the next successful file op.
    pub status_message: Option<String>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Buffer::new())
    }
}

impl EditorState {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            cursor: Cursor::origin(),
            selection: None,
            clipboard: None,
            viewport: Viewport::default(),
            path: None,
            modified: false,
            status_message: None,
        }
    }

    pub fn with_path(buffer: Buffer, path: PathBuf) -> Self {
        let mut state = Self::new(buffer);
        state.path = Some(path);
        state
    }

    /// Display name for the status bar.
    pub fn file_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    // ---- selection ------------------------------------------------------

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Text covered by the selection, `None` when nothing is selected.
    pub fn selection_text(&self) -> Option<String> {
        let sel = self.selection?;
        let (start, end) = sel.normalized();
        Some(self.buffer.slice(start, end))
    }

    // ---- motions --------------------------------------------------------

    /// Clamp `target` and move the cursor there. Extending keeps (or plants)
    /// the anchor at the pre-move cursor; a non-extending move clears the
    /// selection. Resets the sticky column.
    pub fn move_to(&mut self, target: Position, extend: bool) {
        self.apply_move(target, extend, None);
    }

    fn apply_move(&mut self, target: Position, extend: bool, sticky: Option<usize>) {
        let pre = self.cursor.pos;
        let clamped = self.buffer.clamp(target);
        if extend {
            match &mut self.selection {
                Some(sel) => sel.active = clamped,
                None => self.selection = Some(Selection::new(pre, clamped)),
            }
        } else {
            self.selection = None;
        }
        self.cursor.pos = clamped;
        self.cursor.desired_column = sticky;
    }

    /// Left one column, wrapping to the end of the previous line; no-op at
    /// document start.
    pub fn move_left(&mut self, extend: bool) {
        let p = self.cursor.pos;
        let target = if p.column > 0 {
            Position::new(p.line, p.column - 1)
        } else if p.line > 0 {
            Position::new(p.line - 1, self.buffer.line_len(p.line - 1))
        } else {
            p
        };
        self.apply_move(target, extend, None);
    }

    /// Right one column, wrapping to the start of the next line; no-op at
    /// document end.
    pub fn move_right(&mut self, extend: bool) {
        let p = self.cursor.pos;
        let target = if p.column < self.buffer.line_len(p.line) {
            Position::new(p.line, p.column + 1)
        } else if p.line + 1 < self.buffer.line_count() {
            Position::new(p.line + 1, 0)
        } else {
            p
        };
        self.apply_move(target, extend, None);
    }

    pub fn move_up(&mut self, extend: bool) {
        self.move_vertical(-1, extend);
    }

    pub fn move_down(&mut self, extend: bool) {
        self.move_vertical(1, extend);
    }

    pub fn page_up(&mut self, extend: bool) {
        let page = self.viewport.text_rows().max(1) as isize;
        self.move_vertical(-page, extend);
    }

    pub fn page_down(&mut self, extend: bool) {
        let page = self.viewport.text_rows().max(1) as isize;
        self.move_vertical(page, extend);
    }

    fn move_vertical(&mut self, delta: isize, extend: bool) {
        let p = self.cursor.pos;
        let desired = self.cursor.desired_column.unwrap_or(p.column);
        let line = p
            .line
            .saturating_add_signed(delta)
            .min(self.buffer.line_count() - 1);
        self.apply_move(Position::new(line, desired), extend, Some(desired));
    }

    pub fn move_home(&mut self, extend: bool) {
        let line = self.cursor.pos.line;
        self.apply_move(Position::new(line, 0), extend, None);
    }

    pub fn move_end(&mut self, extend: bool) {
        let line = self.cursor.pos.line;
        let len = self.buffer.line_len(line);
        self.apply_move(Position::new(line, len), extend, None);
    }

    // ---- consistency ----------------------------------------------------

    /// Re-clamp cursor and selection against the current buffer. Called by
    /// the edit engine at the end of every operation.
    pub fn reclamp(&mut self) {
        self.cursor.pos = self.buffer.clamp(self.cursor.pos);
        if let Some(sel) = &mut self.selection {
            sel.anchor = self.buffer.clamp(sel.anchor);
            sel.active = self.buffer.clamp(sel.active);
        }
    }

    /// Scroll so the cursor line is visible; true when the offset moved.
    pub fn ensure_cursor_visible(&mut self) -> bool {
        self.viewport.ensure_visible(self.cursor.pos.line)
    }
}
