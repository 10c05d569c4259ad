//! Stdio side of the bridge: newline-delimited JSON in, newline-delimited JSON out.

use std::io::{self, BufRead, Write};

/// Line-framed reader/writer pair.
///
/// Every written line is flushed at once: the client reads one document per
/// line and may block until it arrives.
pub struct StdioChannel<R, W> {
    reader: R,
    writer: W,
    buf: Vec<u8>,
}

impl<R: BufRead, W: Write> StdioChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buf: Vec::new(),
        }
    }

    /// Read the next line, without its terminator.
    ///
    /// Returns `Ok(None)` at end of input. Lines that are not valid UTF-8 are
    /// logged and skipped; only errors of the underlying reader are returned.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                self.buf.pop();
            }
            match String::from_utf8(std::mem::take(&mut self.buf)) {
                Ok(line) => return Ok(Some(line)),
                Err(e) => tracing::warn!("Dropping input line that is not UTF-8: {e}"),
            }
        }
    }

    /// Write one line and flush it.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
