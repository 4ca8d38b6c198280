//! Viewport: scroll offset + last-known surface size, and the only copy of
//! the cell-metric math. Both the input router (pixel -> Position) and the
//! render differ (Position -> pixel) convert through here so the coordinate
//! system stays in one place.

use core_text::{Buffer, Position};

/// Fixed monospace cell width in pixels (protocol contract).
pub const CELL_W: u32 = 8;
/// Fixed monospace cell height in pixels (protocol contract).
pub const CELL_H: u32 = 14;

/// One bottom row of cells is reserved for the status bar.
pub const STATUS_ROWS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
    /// Topmost visible buffer line.
    pub scroll_top: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        // Surface windows open at 800x600 until the first resize arrives.
        Self {
            width_px: 800,
            height_px: 600,
            scroll_top: 0,
        }
    }
}

impl Viewport {
    /// Number of full text rows above the status bar.
    pub fn text_rows(&self) -> usize {
        (self.height_px / CELL_H).saturating_sub(STATUS_ROWS) as usize
    }

    /// Pixel y of the status bar row (bottom-aligned).
    pub fn status_y(&self) -> u32 {
        self.height_px.saturating_sub(CELL_H)
    }

    /// Half-open range of buffer lines currently visible.
    pub fn visible_range(&self, line_count: usize) -> (usize, usize) {
        let start = self.scroll_top.min(line_count.saturating_sub(1));
        let end = (start + self.text_rows()).min(line_count);
        (start, end)
    }

    /// Map a surface pixel to the buffer position under it, clamped to the
    /// nearest valid line and column. Row and column derive directly from the
    /// cell grid: row = y / cell height, column = x / cell width.
    pub fn position_at_pixel(&self, buffer: &Buffer, x: u32, y: u32) -> Position {
        let line = self.scroll_top + (y / CELL_H) as usize;
        let column = (x / CELL_W) as usize;
        buffer.clamp(Position::new(line, column))
    }

    /// Map a buffer position to its surface pixel, or `None` when the line is
    /// scrolled out of the text area.
    pub fn pixel_of(&self, pos: Position) -> Option<(u32, u32)> {
        if pos.line < self.scroll_top || pos.line >= self.scroll_top + self.text_rows() {
            return None;
        }
        let row = (pos.line - self.scroll_top) as u32;
        Some((pos.column as u32 * CELL_W, row * CELL_H))
    }

    /// Record a new surface size.
    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.width_px = width_px;
        self.height_px = height_px;
    }

    /// Scroll the minimal amount needed to bring `line` into the text area.
    /// Returns whether the scroll offset changed.
    pub fn ensure_visible(&mut self, line: usize) -> bool {
        let rows = self.text_rows().max(1);
        let prev = self.scroll_top;
        if line < self.scroll_top {
            self.scroll_top = line;
        } else if line >= self.scroll_top + rows {
            self.scroll_top = line + 1 - rows;
        }
        if self.scroll_top != prev {
            tracing::trace!(target: "state.viewport", from = prev, to = self.scroll_top, "scroll");
            true
        } else {
            false
        }
    }
}
