//! Rope-based line/column text buffer.
//!
//! The buffer stores the document as a `ropey::Rope` and addresses it with
//! `(line, column)` positions where `column` counts chars within the line.
//! Invariants:
//! * At least one line is always present (an empty document is one empty line).
//! * No line contains an embedded newline; `insert` splits its input on `\n`.
//! * The buffer does not track positions held elsewhere; after any mutation
//!   callers re-clamp their cursor/selection via [`Buffer::clamp`].

use ropey::Rope;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextError {
    /// Addressed a line past the end of the buffer. Clamping at the call site
    /// should prevent this; callers treat it as a no-op, never a crash.
    #[error("position line {line} out of range (buffer has {line_count} lines)")]
    OutOfRange { line: usize, line_count: usize },
}

/// A position inside a buffer as (line index, char column within that line).
/// Ordering is lexicographic by (line, column), which is exactly the document
/// order selections normalize with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn origin() -> Self {
        Self { line: 0, column: 0 }
    }
}

/// Line-oriented text storage for one session.
#[derive(Debug, Clone)]
pub struct Buffer {
    rope: Rope,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// An empty document: exactly one empty line.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    pub fn from_str(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    /// Build a buffer from already-split lines (the file collaborator hands
    /// documents over in this shape).
    pub fn from_lines(lines: &[String]) -> Self {
        Self::from_str(&lines.join("\n"))
    }

    /// Total number of lines; never zero.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Char length of a line, excluding any trailing newline.
    pub fn line_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// The line's text without its newline, or `None` past the end.
    pub fn line_text(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// All lines as owned strings (save path).
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .map(|i| self.line_text(i).unwrap_or_default())
            .collect()
    }

    /// Clamp a position to the nearest valid (line, column).
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        let column = pos.column.min(self.line_len(line));
        Position { line, column }
    }

    fn char_index(&self, pos: Position) -> usize {
        self.rope.line_to_char(pos.line) + pos.column.min(self.line_len(pos.line))
    }

    /// Insert `text` at `pos`, splitting on embedded newlines. Returns the
    /// position just past the inserted text (the cursor-equivalent end).
    pub fn insert(&mut self, pos: Position, text: &str) -> Result<Position, TextError> {
        if pos.line >= self.line_count() {
            return Err(TextError::OutOfRange {
                line: pos.line,
                line_count: self.line_count(),
            });
        }
        let pos = self.clamp(pos);
        self.rope.insert(self.char_index(pos), text);
        let newlines = text.matches('\n').count();
        let end = if newlines == 0 {
            Position::new(pos.line, pos.column + text.chars().count())
        } else {
            let tail = text.rsplit('\n').next().unwrap_or("");
            Position::new(pos.line + newlines, tail.chars().count())
        };
        Ok(end)
    }

    /// Remove the content between two positions, merging the surrounding
    /// lines. Returns the removed text. A zero-width range is a no-op.
    /// Callers pass normalized positions; a reversed pair is reordered rather
    /// than rejected.
    pub fn delete_range(&mut self, start: Position, end: Position) -> Result<String, TextError> {
        let count = self.line_count();
        if start.line >= count || end.line >= count {
            return Err(TextError::OutOfRange {
                line: start.line.max(end.line),
                line_count: count,
            });
        }
        let (start, end) = (self.clamp(start.min(end)), self.clamp(start.max(end)));
        if start == end {
            return Ok(String::new());
        }
        let s = self.char_index(start);
        let e = self.char_index(end);
        let removed = self.rope.slice(s..e).to_string();
        self.rope.remove(s..e);
        Ok(removed)
    }

    /// The text between two positions with `\n` joining spanned lines.
    /// Out-of-range positions are clamped, reversed pairs reordered.
    pub fn slice(&self, start: Position, end: Position) -> String {
        let (start, end) = (self.clamp(start.min(end)), self.clamp(start.max(end)));
        self.rope
            .slice(self.char_index(start)..self.char_index(end))
            .to_string()
    }

    /// Entire document as one string (newline-joined, no trailing newline
    /// added beyond what the lines carry).
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_one_line() {
        let b = Buffer::new();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line_len(0), 0);
        assert_eq!(b.line_text(0).unwrap(), "");
    }

    #[test]
    fn line_queries_strip_newlines() {
        let b = Buffer::from_str("hello\nworld");
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_text(0).unwrap(), "hello");
        assert_eq!(b.line_text(1).unwrap(), "world");
        assert_eq!(b.line_len(0), 5);
        assert!(b.line_text(2).is_none());
    }

    #[test]
    fn insert_within_line_returns_end_position() {
        let mut b = Buffer::from_str("abc");
        let end = b.insert(Position::new(0, 1), "XY").unwrap();
        assert_eq!(b.line_text(0).unwrap(), "aXYbc");
        assert_eq!(end, Position::new(0, 3));
    }

    #[test]
    fn insert_splits_on_embedded_newlines() {
        let mut b = Buffer::from_str("head tail");
        let end = b.insert(Position::new(0, 5), "one\ntwo\nthr").unwrap();
        assert_eq!(
            b.lines(),
            vec!["head one".to_string(), "two".into(), "thrtail".into()]
        );
        assert_eq!(end, Position::new(2, 3));
    }

    #[test]
    fn insert_newline_at_line_end_creates_empty_line() {
        let mut b = Buffer::from_str("Hello");
        let end = b.insert(Position::new(0, 5), "\n").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_text(1).unwrap(), "");
        assert_eq!(end, Position::new(1, 0));
    }

    #[test]
    fn insert_past_last_line_is_out_of_range() {
        let mut b = Buffer::from_str("x");
        let err = b.insert(Position::new(3, 0), "y").unwrap_err();
        assert_eq!(
            err,
            TextError::OutOfRange {
                line: 3,
                line_count: 1
            }
        );
    }

    #[test]
    fn delete_range_within_line() {
        let mut b = Buffer::from_str("abcdef");
        let removed = b
            .delete_range(Position::new(0, 1), Position::new(0, 4))
            .unwrap();
        assert_eq!(removed, "bcd");
        assert_eq!(b.line_text(0).unwrap(), "aef");
    }

    #[test]
    fn delete_range_merges_lines() {
        let mut b = Buffer::from_str("alpha\nbeta\ngamma");
        let removed = b
            .delete_range(Position::new(0, 3), Position::new(2, 2))
            .unwrap();
        assert_eq!(removed, "ha\nbeta\nga");
        assert_eq!(b.lines(), vec!["alpmma".to_string()]);
        assert_eq!(b.line_count(), 1);
    }

    #[test]
    fn delete_range_zero_width_is_noop() {
        let mut b = Buffer::from_str("same");
        let removed = b
            .delete_range(Position::new(0, 2), Position::new(0, 2))
            .unwrap();
        assert_eq!(removed, "");
        assert_eq!(b.line_text(0).unwrap(), "same");
    }

    #[test]
    fn delete_range_accepts_reversed_positions() {
        let mut b = Buffer::from_str("abcdef");
        let removed = b
            .delete_range(Position::new(0, 4), Position::new(0, 1))
            .unwrap();
        assert_eq!(removed, "bcd");
    }

    #[test]
    fn delete_range_out_of_range_line() {
        let mut b = Buffer::from_str("one");
        assert!(
            b.delete_range(Position::new(0, 0), Position::new(5, 0))
                .is_err()
        );
    }

    #[test]
    fn slice_spans_lines() {
        let b = Buffer::from_str("one\ntwo\nthree");
        let s = b.slice(Position::new(0, 2), Position::new(2, 1));
        assert_eq!(s, "e\ntwo\nt");
    }

    #[test]
    fn clamp_snaps_to_nearest_valid() {
        let b = Buffer::from_str("ab\nc");
        assert_eq!(b.clamp(Position::new(9, 9)), Position::new(1, 1));
        assert_eq!(b.clamp(Position::new(0, 9)), Position::new(0, 2));
        assert_eq!(b.clamp(Position::new(0, 1)), Position::new(0, 1));
    }

    #[test]
    fn position_ordering_is_document_order() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(1, 2) < Position::new(1, 3));
        assert_eq!(
            Position::new(2, 1).min(Position::new(1, 9)),
            Position::new(1, 9)
        );
    }

    #[test]
    fn from_lines_round_trips() {
        let lines = vec!["a".to_string(), "".into(), "c".into()];
        let b = Buffer::from_lines(&lines);
        assert_eq!(b.lines(), lines);
    }
}
