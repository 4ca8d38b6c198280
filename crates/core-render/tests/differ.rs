//! Frame diffing behavior: cold redraws, warm per-row repaints, caret overlay.

use core_protocol::{Color, DrawCmd};
use core_render::{RenderDiffer, Theme};
use core_state::{EditorState, Selection};
use core_text::{Buffer, Position};

fn state(text: &str) -> EditorState {
    EditorState::new(Buffer::from_str(text))
}

fn texts(cmds: &[DrawCmd]) -> Vec<(u32, String)> {
    cmds.iter()
        .filter_map(|c| match c {
            DrawCmd::Text { y, text, .. } => Some((*y, text.clone())),
            _ => None,
        })
        .collect()
}

fn caret(cmds: &[DrawCmd]) -> Option<(u32, u32)> {
    match cmds.last() {
        Some(DrawCmd::Rect {
            x,
            y,
            width: 2,
            height: 14,
            color,
        }) if *color == Theme::default().cursor => Some((*x, *y)),
        _ => None,
    }
}

#[test]
fn first_frame_is_a_full_redraw() {
    let st = state("one\ntwo");
    let mut differ = RenderDiffer::default();
    let cmds = differ.frame(&st);

    assert_eq!(cmds.first(), Some(&DrawCmd::Clear));
    let drawn = texts(&cmds);
    assert!(drawn.contains(&(0, "one".to_string())));
    assert!(drawn.contains(&(14, "two".to_string())));
    // Status bar sits on the bottom cell row.
    assert!(drawn.contains(&(586, "Untitled | Line: 1/2 | Col: 1".to_string())));
    assert_eq!(caret(&cmds), Some((0, 0)));
}

#[test]
fn unchanged_frame_emits_only_the_caret() {
    let st = state("one\ntwo");
    let mut differ = RenderDiffer::default();
    differ.frame(&st);
    let cmds = differ.frame(&st);
    assert_eq!(cmds.len(), 1);
    assert_eq!(caret(&cmds), Some((0, 0)));
}

#[test]
fn single_line_edit_repaints_only_that_row() {
    let mut st = state("aaa\nbbb\nccc");
    let mut differ = RenderDiffer::default();
    differ.frame(&st);

    st.buffer
        .insert(Position::new(1, 3), "!")
        .unwrap();
    let cmds = differ.frame(&st);

    assert!(!cmds.contains(&DrawCmd::Clear));
    assert_eq!(texts(&cmds), vec![(14, "bbb!".to_string())]);
    // One background rect for the row, the text, the caret.
    assert_eq!(cmds.len(), 3);
}

#[test]
fn cursor_move_repaints_departed_and_entered_rows() {
    let mut st = state("aaa\nbbb");
    let mut differ = RenderDiffer::default();
    differ.frame(&st);

    st.cursor.pos = Position::new(1, 2);
    let cmds = differ.frame(&st);

    assert!(!cmds.contains(&DrawCmd::Clear));
    let drawn = texts(&cmds);
    assert!(drawn.contains(&(0, "aaa".to_string())));
    assert!(drawn.contains(&(14, "bbb".to_string())));
    // Status changed with the cursor position.
    assert!(drawn.iter().any(|(_, t)| t.ends_with("Line: 2/2 | Col: 3")));
    assert_eq!(caret(&cmds), Some((16, 14)));
}

#[test]
fn resize_forces_a_full_redraw() {
    let mut st = state("one");
    let mut differ = RenderDiffer::default();
    differ.frame(&st);

    st.viewport.resize(400, 300);
    let cmds = differ.frame(&st);
    assert_eq!(cmds.first(), Some(&DrawCmd::Clear));
}

#[test]
fn scroll_change_forces_a_full_redraw() {
    let text = (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
    let mut st = state(&text);
    let mut differ = RenderDiffer::default();
    differ.frame(&st);

    st.cursor.pos = Position::new(60, 0);
    st.ensure_cursor_visible();
    let cmds = differ.frame(&st);
    assert_eq!(cmds.first(), Some(&DrawCmd::Clear));
    // Topmost drawn line follows the new scroll offset.
    let first_text = texts(&cmds).into_iter().find(|(y, _)| *y == 0).unwrap();
    assert_eq!(first_text.1, st.viewport.scroll_top.to_string());
}

#[test]
fn selection_paints_highlight_rects_per_row() {
    let mut st = state("aaaa\nbbbbbb\ncc");
    let mut differ = RenderDiffer::default();
    differ.frame(&st);

    st.selection = Some(Selection::new(Position::new(0, 2), Position::new(2, 1)));
    st.cursor.pos = Position::new(2, 1);
    let cmds = differ.frame(&st);

    let sel_color = Theme::default().selection;
    let highlights: Vec<(u32, u32, u32)> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCmd::Rect {
                x,
                y,
                width,
                color,
                ..
            } if *color == sel_color => Some((*x, *y, *width)),
            _ => None,
        })
        .collect();
    // Row 0 from column 2 to end of line, row 1 in full, row 2 up to column 1.
    assert_eq!(highlights, vec![(16, 0, 16), (0, 14, 48), (0, 28, 8)]);

    // Clearing the selection repaints the same rows without highlights.
    st.selection = None;
    let cmds = differ.frame(&st);
    assert!(!cmds.iter().any(|c| matches!(
        c,
        DrawCmd::Rect { color, .. } if *color == sel_color
    )));
    assert_eq!(texts(&cmds).len(), 3);
}

#[test]
fn status_row_repaints_when_its_text_changes() {
    let mut st = state("one");
    let mut differ = RenderDiffer::default();
    differ.frame(&st);

    st.status_message = Some("Saved notes.txt".to_string());
    let cmds = differ.frame(&st);
    let drawn = texts(&cmds);
    assert_eq!(drawn.len(), 1);
    assert!(drawn[0].1.ends_with("| Saved notes.txt"));
    assert_eq!(drawn[0].0, 586);
}

#[test]
fn custom_theme_colors_flow_through() {
    let theme = Theme {
        background: Color(0x10, 0x10, 0x10),
        text: Color(0xee, 0xee, 0xee),
        ..Theme::default()
    };
    let st = state("x");
    let mut differ = RenderDiffer::new(theme);
    let cmds = differ.frame(&st);
    assert!(cmds.iter().any(|c| matches!(
        c,
        DrawCmd::Rect { color, .. } if *color == theme.background
    )));
    assert!(cmds.iter().any(|c| matches!(
        c,
        DrawCmd::Text { color, .. } if *color == theme.text
    )));
}
