//! One connection's event loop.
//!
//! Strictly sequential: read a chunk, frame it into lines, decode each line,
//! route it, and when routing reports a possible visible change, diff and
//! write the draw commands before touching the next line. Malformed lines are
//! logged and dropped; EOF or a failed write ends the session cleanly.

use anyhow::Result;
use core_actions::{DiskStore, Router};
use core_protocol::{LineDecoder, decode_event, encode_frame};
use core_render::{RenderDiffer, Theme};
use core_state::EditorState;
use std::io::{Read, Write};
use tracing::{debug, info, warn};

pub struct Session<R, W> {
    reader: R,
    writer: W,
    state: EditorState,
    router: Router,
    differ: RenderDiffer,
    decoder: LineDecoder,
}

impl<R: Read, W: Write> Session<R, W> {
    pub fn new(reader: R, writer: W, state: EditorState, theme: Theme, tab_width: usize) -> Self {
        Self {
            reader,
            writer,
            state,
            router: Router::new(tab_width),
            differ: RenderDiffer::new(theme),
            decoder: LineDecoder::new(),
        }
    }

    /// Run until the surface disconnects. A clean disconnect (EOF, write
    /// failure, reset) returns `Ok`; the session state is simply dropped.
    pub fn run(&mut self) -> Result<()> {
        // The surface knows nothing until we paint it.
        if self.send_frame().is_err() {
            info!(target: "session", "surface gone before the first frame");
            return Ok(());
        }

        let mut buf = [0u8; 4096];
        loop {
            let n = match self.reader.read(&mut buf) {
                Ok(0) => {
                    info!(target: "session", "surface closed the connection");
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) => {
                    warn!(target: "session", error = %e, "read failed, closing session");
                    return Ok(());
                }
            };
            self.decoder.feed(&buf[..n]);
            while let Some(line) = self.decoder.next_line() {
                match decode_event(&line) {
                    Ok(event) => {
                        debug!(target: "session", ?event, "event");
                        if self.router.handle(event, &mut self.state, &DiskStore)?
                            && self.send_frame().is_err()
                        {
                            info!(target: "session", "write failed, closing session");
                            return Ok(());
                        }
                    }
                    Err(e) => warn!(target: "session", error = %e, "dropped protocol line"),
                }
            }
        }
    }

    fn send_frame(&mut self) -> std::io::Result<()> {
        let cmds = self.differ.frame(&self.state);
        self.writer.write_all(encode_frame(&cmds).as_bytes())?;
        self.writer.flush()
    }

    #[cfg(test)]
    fn state(&self) -> &EditorState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{Buffer, Position};
    use std::io;

    /// Hands the script to the session in fixed-size pieces, like a socket
    /// under arbitrary TCP segmentation.
    struct ChunkReader {
        data: Vec<u8>,
        offset: usize,
        chunk: usize,
    }

    impl ChunkReader {
        fn new(data: &str, chunk: usize) -> Self {
            Self {
                data: data.as_bytes().to_vec(),
                offset: 0,
                chunk,
            }
        }
    }

    impl Read for ChunkReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let remaining = &self.data[self.offset..];
            let n = remaining.len().min(self.chunk).min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.offset += n;
            Ok(n)
        }
    }

    fn run_script(initial: &str, script: &str) -> (String, EditorState) {
        let mut out = Vec::new();
        let state = EditorState::new(Buffer::from_str(initial));
        let mut session = Session::new(
            script.as_bytes(),
            &mut out,
            state,
            Theme::default(),
            4,
        );
        session.run().unwrap();
        let state = session.state().clone();
        drop(session);
        (String::from_utf8(out).unwrap(), state)
    }

    #[test]
    fn initial_frame_precedes_any_input() {
        let (out, _) = run_script("hello", "");
        assert!(out.starts_with("clear\n"));
        assert!(out.contains("text,0,0,#000000,hello\n"));
    }

    #[test]
    fn typing_flows_through_to_draw_commands() {
        let (out, state) = run_script("", "keydown,H\nkeydown,i\n");
        assert_eq!(state.buffer.lines(), vec!["Hi".to_string()]);
        assert_eq!(state.cursor.pos, Position::new(0, 2));
        assert!(out.contains("text,0,0,#000000,Hi\n"));
    }

    #[test]
    fn chunk_boundaries_do_not_split_events() {
        let script = "keydown,H\nkeydown,i\nkeydown,Return\nkeydown,!\n";
        for chunk in [1, 3, 7] {
            let mut out = Vec::new();
            let mut session = Session::new(
                ChunkReader::new(script, chunk),
                &mut out,
                EditorState::new(Buffer::new()),
                Theme::default(),
                4,
            );
            session.run().unwrap();
            assert_eq!(
                session.state().buffer.lines(),
                vec!["Hi".to_string(), "!".into()],
                "chunk size {chunk}"
            );
        }
    }

    #[test]
    fn malformed_line_is_dropped_without_output() {
        let (baseline, _) = run_script("abc", "");
        let (out, state) = run_script("abc", "rect,abc,0,100,100,#ff0000\n");
        // The bogus line produces no draw commands and no state change.
        assert_eq!(out, baseline);
        assert_eq!(state.buffer.lines(), vec!["abc".to_string()]);
    }

    #[test]
    fn malformed_line_does_not_poison_later_events() {
        let (_, state) = run_script("", "bogus,1,2\nkeydown,x\n");
        assert_eq!(state.buffer.lines(), vec!["x".to_string()]);
    }

    #[test]
    fn resize_triggers_a_second_full_redraw() {
        let (out, state) = run_script("abc", "resize,1024,768\n");
        assert_eq!(out.matches("clear\n").count(), 2);
        assert_eq!(state.viewport.width_px, 1024);
    }

    #[test]
    fn modifier_keydown_emits_no_frame() {
        let (baseline, _) = run_script("abc", "");
        let (out, _) = run_script("abc", "keydown,LeftShift\n");
        assert_eq!(out, baseline);
    }

    #[test]
    fn mouse_selection_round_trip() {
        let script = "mousedown,0,0\nmousemove,24,0\nmouseup,24,0\n";
        let (out, state) = run_script("hello", script);
        let sel = state.selection.expect("drag leaves a selection");
        assert_eq!(sel.normalized(), (Position::origin(), Position::new(0, 3)));
        // The selection highlight rect is 3 cells wide.
        assert!(out.contains("rect,0,0,24,14,#add8e6\n"));
    }
}
