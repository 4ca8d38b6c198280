//! Render differ: turns editor state into the minimal draw-command sequence.
//!
//! Every draw command is a network round trip, so redundant full repaints on
//! each keystroke are the dominant cost in this design. The differ keeps a
//! snapshot of the last frame it sent and emits:
//! * a `clear` plus a full redraw when the frame geometry changed (first
//!   frame, scroll offset moved, surface resized), or
//! * per-row repaints for rows whose text hash changed, rows entering or
//!   leaving the cursor/selection overlay, and the status row when its
//!   content changed.
//! The caret is re-drawn on every frame; it is one command and saves a
//! second diff dimension.
//!
//! Row repaint order is background rect, selection highlight, text; the
//! caret goes last so it sits on top. Command order within a frame is the
//! order the session must write it.

use core_protocol::{Color, DrawCmd};
use core_state::viewport::{CELL_H, CELL_W};
use core_state::EditorState;
use core_text::Position;
use tracing::trace;

mod snapshot;
pub use snapshot::{FrameSnapshot, LineSnap};

/// Surface colors. Defaults match the classic white-background editor look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub cursor: Color,
    pub status_background: Color,
    pub status_text: Color,
    pub selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color(0xff, 0xff, 0xff),
            text: Color(0x00, 0x00, 0x00),
            cursor: Color(0xff, 0x00, 0x00),
            status_background: Color(0xcc, 0xcc, 0xcc),
            status_text: Color(0x00, 0x00, 0x00),
            selection: Color(0xad, 0xd8, 0xe6),
        }
    }
}

/// Per-session differ; owns the previous-frame snapshot.
#[derive(Debug, Default)]
pub struct RenderDiffer {
    theme: Theme,
    prev: Option<FrameSnapshot>,
}

impl RenderDiffer {
    pub fn new(theme: Theme) -> Self {
        Self { theme, prev: None }
    }

    /// Compute the draw commands reflecting `state`, in write order.
    pub fn frame(&mut self, state: &EditorState) -> Vec<DrawCmd> {
        let vp = state.viewport;
        let line_count = state.buffer.line_count();
        let (start, end) = vp.visible_range(line_count);
        let rows = end - start;

        let lines: Vec<LineSnap> = (start..end)
            .map(|i| LineSnap::of(&state.buffer.line_text(i).unwrap_or_default()))
            .collect();
        let status = status_text(state);
        let status_snap = LineSnap::of(&status);
        let selection = state
            .selection
            .map(|s| s.normalized())
            .filter(|(a, b)| a != b);
        let cursor_px = vp.pixel_of(state.cursor.pos);

        // Geometry changes (or no history at all) force a cold frame.
        let warm = self.prev.as_ref().filter(|p| {
            p.scroll_top == vp.scroll_top
                && p.width_px == vp.width_px
                && p.height_px == vp.height_px
                && p.lines.len() == rows
        });

        let mut cmds = Vec::new();
        if let Some(p) = warm {
            let mut dirty = vec![false; rows];
            for (row, snap) in lines.iter().enumerate() {
                if p.lines[row] != *snap {
                    dirty[row] = true;
                }
            }
            // Caret moved: repaint the rows it left and entered to erase the
            // old mark before re-drawing.
            if p.cursor_px != cursor_px || p.cursor_line != state.cursor.pos.line {
                mark_line(&mut dirty, start, p.cursor_line);
                mark_line(&mut dirty, start, state.cursor.pos.line);
            }
            // Selection geometry changed: repaint both old and new spans.
            if p.selection != selection {
                mark_span(&mut dirty, start, p.selection);
                mark_span(&mut dirty, start, selection);
            }
            let repainted = dirty.iter().filter(|d| **d).count();
            for (row, _) in dirty.iter().enumerate().filter(|(_, d)| **d) {
                self.paint_row(&mut cmds, state, start, row, selection);
            }
            if p.status != status_snap {
                self.paint_status(&mut cmds, state, &status);
            }
            trace!(target: "render.differ", repainted, "partial redraw");
        } else {
            cmds.push(DrawCmd::Clear);
            cmds.push(DrawCmd::Rect {
                x: 0,
                y: 0,
                width: vp.width_px,
                height: vp.height_px,
                color: self.theme.background,
            });
            for row in 0..rows {
                self.paint_row(&mut cmds, state, start, row, selection);
            }
            self.paint_status(&mut cmds, state, &status);
            trace!(target: "render.differ", rows, "full redraw");
        }

        if let Some((cx, cy)) = cursor_px {
            cmds.push(DrawCmd::Rect {
                x: cx,
                y: cy,
                width: 2,
                height: CELL_H,
                color: self.theme.cursor,
            });
        }

        self.prev = Some(FrameSnapshot {
            scroll_top: vp.scroll_top,
            width_px: vp.width_px,
            height_px: vp.height_px,
            lines,
            cursor_line: state.cursor.pos.line,
            cursor_px,
            selection,
            status: status_snap,
        });
        cmds
    }

    /// Background, selection highlight, then text for one visible row.
    fn paint_row(
        &self,
        cmds: &mut Vec<DrawCmd>,
        state: &EditorState,
        start: usize,
        row: usize,
        selection: Option<(Position, Position)>,
    ) {
        let line_idx = start + row;
        let y = row as u32 * CELL_H;
        cmds.push(DrawCmd::Rect {
            x: 0,
            y,
            width: state.viewport.width_px,
            height: CELL_H,
            color: self.theme.background,
        });
        if let Some((c0, c1)) = selection.and_then(|span| selection_columns(state, line_idx, span)) {
            if c1 > c0 {
                cmds.push(DrawCmd::Rect {
                    x: c0 as u32 * CELL_W,
                    y,
                    width: (c1 - c0) as u32 * CELL_W,
                    height: CELL_H,
                    color: self.theme.selection,
                });
            }
        }
        let text = state.buffer.line_text(line_idx).unwrap_or_default();
        if !text.is_empty() {
            cmds.push(DrawCmd::Text {
                x: 0,
                y,
                color: self.theme.text,
                text,
            });
        }
    }

    fn paint_status(&self, cmds: &mut Vec<DrawCmd>, state: &EditorState, status: &str) {
        let vp = state.viewport;
        let y = vp.status_y();
        cmds.push(DrawCmd::Rect {
            x: 0,
            y,
            width: vp.width_px,
            height: CELL_H,
            color: self.theme.status_background,
        });
        cmds.push(DrawCmd::Text {
            x: 0,
            y,
            color: self.theme.status_text,
            text: status.to_string(),
        });
    }
}

/// The highlighted column range of `line_idx` under a normalized selection
/// span: partial width on the first and last line, full line width between.
fn selection_columns(
    state: &EditorState,
    line_idx: usize,
    (start, end): (Position, Position),
) -> Option<(usize, usize)> {
    if line_idx < start.line || line_idx > end.line {
        return None;
    }
    let c0 = if line_idx == start.line { start.column } else { 0 };
    let c1 = if line_idx == end.line {
        end.column
    } else {
        state.buffer.line_len(line_idx)
    };
    Some((c0, c1))
}

/// Status bar content: file name, modified marker, cursor position, and any
/// transient message (file-op outcomes ride here; the protocol has no error
/// channel).
fn status_text(state: &EditorState) -> String {
    let modified = if state.modified { "*" } else { "" };
    let base = format!(
        "{}{} | Line: {}/{} | Col: {}",
        state.file_name(),
        modified,
        state.cursor.pos.line + 1,
        state.buffer.line_count(),
        state.cursor.pos.column + 1
    );
    match &state.status_message {
        Some(msg) => format!("{base} | {msg}"),
        None => base,
    }
}

fn mark_line(dirty: &mut [bool], start: usize, line: usize) {
    if line >= start && line - start < dirty.len() {
        dirty[line - start] = true;
    }
}

fn mark_span(dirty: &mut [bool], start: usize, span: Option<(Position, Position)>) {
    if let Some((a, b)) = span {
        for line in a.line..=b.line {
            mark_line(dirty, start, line);
        }
    }
}
