//! The edit engine: applies [`EditorAction`]s to an [`EditorState`].
//!
//! Every operation is atomic over buffer + cursor + selection and ends with a
//! re-clamp plus a scroll-into-view. `OutOfRange` from the buffer means a
//! clamping bug upstream; it degrades to a logged no-op rather than tearing
//! down the session, and the document stays consistent.

use crate::io_ops::FileStore;
use crate::{EditorAction, Motion};
use anyhow::Result;
use core_state::EditorState;
use core_text::{Buffer, Position, TextError};
use tracing::{debug, warn};

/// Apply one action. The returned `Result` is reserved for genuinely fatal
/// conditions; protocol-reachable failures (file errors, range misuse) are
/// absorbed here and surfaced through the status bar.
pub fn dispatch(action: EditorAction, state: &mut EditorState, store: &dyn FileStore) -> Result<()> {
    match action {
        EditorAction::Insert(text) => insert_text(state, &text),
        EditorAction::InsertNewline => insert_text(state, "\n"),
        EditorAction::DeleteBackward => delete_backward(state),
        EditorAction::DeleteForward => delete_forward(state),
        EditorAction::Move { motion, extend } => apply_motion(state, motion, extend),
        EditorAction::Copy => copy(state),
        EditorAction::Cut => cut(state),
        EditorAction::Paste => paste(state),
        EditorAction::ClearSelection => state.clear_selection(),
        EditorAction::NewFile => new_file(state),
        EditorAction::OpenFile => open_file(state, store),
        EditorAction::SaveFile => save_file(state, store),
    }
    state.reclamp();
    state.ensure_cursor_visible();
    Ok(())
}

fn absorb_range_error(op: &'static str, err: TextError) {
    // Reaching this means a position escaped clamping; the operation becomes
    // a no-op and the document stays as it was.
    warn!(target: "actions.dispatch", op, error = %err, "buffer range error absorbed");
}

/// Replace-then-insert: an active selection is deleted first, then the text
/// goes in at the cursor, which advances past it.
fn insert_text(state: &mut EditorState, text: &str) {
    if state.selection.is_some() {
        delete_selection(state);
    }
    match state.buffer.insert(state.cursor.pos, text) {
        Ok(end) => {
            state.cursor.pos = end;
            state.cursor.desired_column = None;
            state.modified = true;
        }
        Err(err) => absorb_range_error("insert", err),
    }
}

fn delete_backward(state: &mut EditorState) {
    if state.selection.is_some() {
        delete_selection(state);
        return;
    }
    let p = state.cursor.pos;
    let prev = if p.column > 0 {
        Position::new(p.line, p.column - 1)
    } else if p.line > 0 {
        // Column 0: merge with the previous line.
        Position::new(p.line - 1, state.buffer.line_len(p.line - 1))
    } else {
        return; // document start
    };
    match state.buffer.delete_range(prev, p) {
        Ok(_) => {
            state.cursor.pos = prev;
            state.cursor.desired_column = None;
            state.modified = true;
        }
        Err(err) => absorb_range_error("delete_backward", err),
    }
}

fn delete_forward(state: &mut EditorState) {
    if state.selection.is_some() {
        delete_selection(state);
        return;
    }
    let p = state.cursor.pos;
    let next = if p.column < state.buffer.line_len(p.line) {
        Position::new(p.line, p.column + 1)
    } else if p.line + 1 < state.buffer.line_count() {
        Position::new(p.line + 1, 0)
    } else {
        return; // document end
    };
    match state.buffer.delete_range(p, next) {
        Ok(_) => {
            state.cursor.desired_column = None;
            state.modified = true;
        }
        Err(err) => absorb_range_error("delete_forward", err),
    }
}

/// Remove the selected range, cursor lands at its start. No-op without a
/// selection.
fn delete_selection(state: &mut EditorState) {
    let Some(sel) = state.selection.take() else {
        return;
    };
    let (start, end) = sel.normalized();
    match state.buffer.delete_range(start, end) {
        Ok(_) => {
            state.cursor.pos = start;
            state.cursor.desired_column = None;
            state.modified = true;
        }
        Err(err) => absorb_range_error("delete_selection", err),
    }
}

/// Copy leaves the selection in place; only cut clears it.
fn copy(state: &mut EditorState) {
    match state.selection_text() {
        Some(text) if !text.is_empty() => state.clipboard = Some(text),
        _ => debug!(target: "actions.dispatch", "copy with no selection is a no-op"),
    }
}

fn cut(state: &mut EditorState) {
    if state.selection.is_none() {
        debug!(target: "actions.dispatch", "cut with no selection is a no-op");
        return;
    }
    copy(state);
    delete_selection(state);
}

fn paste(state: &mut EditorState) {
    let Some(text) = state.clipboard.clone().filter(|t| !t.is_empty()) else {
        debug!(target: "actions.dispatch", "paste with empty clipboard is a no-op");
        return;
    };
    insert_text(state, &text);
}

fn apply_motion(state: &mut EditorState, motion: Motion, extend: bool) {
    match motion {
        Motion::Left => state.move_left(extend),
        Motion::Right => state.move_right(extend),
        Motion::Up => state.move_up(extend),
        Motion::Down => state.move_down(extend),
        Motion::Home => state.move_home(extend),
        Motion::End => state.move_end(extend),
        Motion::PageUp => state.page_up(extend),
        Motion::PageDown => state.page_down(extend),
    }
}

fn new_file(state: &mut EditorState) {
    state.buffer = Buffer::new();
    state.cursor = core_state::Cursor::origin();
    state.selection = None;
    state.viewport.scroll_top = 0;
    state.path = None;
    state.modified = false;
    state.status_message = None;
    debug!(target: "actions.file", "new document");
}

fn open_file(state: &mut EditorState, store: &dyn FileStore) {
    let Some(path) = state.path.clone() else {
        state.status_message = Some("No file path".to_string());
        return;
    };
    match store.load(&path) {
        Ok(lines) => {
            state.buffer = Buffer::from_lines(&lines);
            state.cursor = core_state::Cursor::origin();
            state.selection = None;
            state.viewport.scroll_top = 0;
            state.modified = false;
            state.status_message = None;
            debug!(target: "actions.file", path = %path.display(), "opened");
        }
        Err(err) => {
            warn!(target: "actions.file", path = %path.display(), error = %err, "open failed");
            state.status_message = Some(format!("Open failed: {err}"));
        }
    }
}

fn save_file(state: &mut EditorState, store: &dyn FileStore) {
    let Some(path) = state.path.clone() else {
        state.status_message = Some("No file path".to_string());
        return;
    };
    match store.save(&path, &state.buffer.lines()) {
        Ok(()) => {
            state.modified = false;
            state.status_message = Some(format!("Saved {}", state.file_name()));
            debug!(target: "actions.file", path = %path.display(), "saved");
        }
        Err(err) => {
            warn!(target: "actions.file", path = %path.display(), error = %err, "save failed");
            state.status_message = Some(format!("Save failed: {err}"));
        }
    }
}
