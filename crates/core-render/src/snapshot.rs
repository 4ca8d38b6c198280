//! Previous-frame snapshot used for diffing.
//!
//! Hashing strategy: (ahash64, char len) per visible line, trailing newline
//! already excluded by the buffer's line queries. Length is kept alongside the
//! hash to shrink collision odds and allow short-circuit mismatch checks.

use ahash::AHasher;
use core_text::Position;
use std::hash::{Hash, Hasher};

/// Hash metadata for one drawn line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSnap {
    pub hash: u64,
    pub len: usize,
}

impl LineSnap {
    pub fn of(line: &str) -> Self {
        let mut hasher = AHasher::default();
        line.hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            len: line.len(),
        }
    }
}

/// Everything the differ needs to know about the frame it last sent.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub scroll_top: usize,
    pub width_px: u32,
    pub height_px: u32,
    /// One entry per visible text row.
    pub lines: Vec<LineSnap>,
    pub cursor_line: usize,
    /// Caret pixel position, `None` while the cursor is scrolled out.
    pub cursor_px: Option<(u32, u32)>,
    /// Normalized non-empty selection span, if one was drawn.
    pub selection: Option<(Position, Position)>,
    pub status: LineSnap,
}
