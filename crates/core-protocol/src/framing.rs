//! Line framing over a raw byte stream.
//!
//! TCP delivers arbitrary chunking, so the decoder accumulates bytes until a
//! `\n` regardless of how many reads it took. Lines are handed out in arrival
//! order; blank lines are skipped (they carry no event).

/// Incremental newline-delimited frame decoder.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk read from the stream.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete line, without its terminator. Returns `None`
    /// until a full line has accumulated. The protocol is ASCII; any stray
    /// non-UTF-8 bytes are replaced rather than aborting the session.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let idx = self.buf.iter().position(|&b| b == b'\n')?;
            let mut line: Vec<u8> = self.buf.drain(..=idx).collect();
            line.pop(); // the '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                tracing::trace!(target: "protocol.framing", "skipping blank line");
                continue;
            }
            return Some(String::from_utf8_lossy(&line).into_owned());
        }
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_split_lines() {
        let mut d = LineDecoder::new();
        d.feed(b"mousedo");
        assert_eq!(d.next_line(), None);
        d.feed(b"wn,10,2");
        assert_eq!(d.next_line(), None);
        d.feed(b"0\nkeydown,a\nkeyu");
        assert_eq!(d.next_line().as_deref(), Some("mousedown,10,20"));
        assert_eq!(d.next_line().as_deref(), Some("keydown,a"));
        assert_eq!(d.next_line(), None);
        assert_eq!(d.pending(), 4);
    }

    #[test]
    fn one_chunk_many_lines() {
        let mut d = LineDecoder::new();
        d.feed(b"resize,1,2\nresize,3,4\n");
        assert_eq!(d.next_line().as_deref(), Some("resize,1,2"));
        assert_eq!(d.next_line().as_deref(), Some("resize,3,4"));
        assert_eq!(d.next_line(), None);
    }

    #[test]
    fn skips_blank_lines_and_strips_crlf() {
        let mut d = LineDecoder::new();
        d.feed(b"\n\r\nkeydown,x\r\n");
        assert_eq!(d.next_line().as_deref(), Some("keydown,x"));
        assert_eq!(d.next_line(), None);
    }
}
