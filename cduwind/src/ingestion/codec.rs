//! Newline framing for the ingestion feed.
//!
//! [`WeatherLineCodec`] splits the byte stream on `\n`, strips a trailing
//! `\r` and decodes each line as UTF-8. Unlike `LinesCodec`, bad input never
//! surfaces as a decoder error: invalid UTF-8 and overlong lines are reported
//! as frames so the connection survives them.

use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

/// One framed unit from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineFrame {
    /// A complete line without its terminator.
    Line(String),
    /// A complete line that was not valid UTF-8.
    InvalidUtf8 { len: usize },
    /// A line exceeding the length limit; `discarded` bytes were dropped.
    Overlong { discarded: usize },
}

/// Decoder for newline-delimited text with a per-line length bound.
#[derive(Debug)]
pub struct WeatherLineCodec {
    max_length: usize,
    /// Offset up to which the buffer is known to contain no newline.
    next_index: usize,
    /// Dropping bytes until the next newline.
    discarding: bool,
    discarded: usize,
}

impl WeatherLineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
            discarded: 0,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Decoder for WeatherLineCodec {
    type Item = LineFrame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<LineFrame>, io::Error> {
        let newline = buf[self.next_index..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|offset| self.next_index + offset);

        match (self.discarding, newline) {
            (true, Some(end)) => {
                buf.advance(end + 1);
                let discarded = self.discarded + end;
                self.discarding = false;
                self.discarded = 0;
                self.next_index = 0;
                Ok(Some(LineFrame::Overlong { discarded }))
            }
            (true, None) => {
                self.discarded += buf.len();
                buf.clear();
                Ok(None)
            }
            (false, Some(end)) => {
                self.next_index = 0;
                let raw = buf.split_to(end + 1);
                let line = &raw[..end];
                let line = line.strip_suffix(b"\r").unwrap_or(line);

                if line.len() > self.max_length {
                    return Ok(Some(LineFrame::Overlong {
                        discarded: line.len(),
                    }));
                }

                Ok(Some(match std::str::from_utf8(line) {
                    Ok(text) => LineFrame::Line(text.to_string()),
                    Err(_) => LineFrame::InvalidUtf8 { len: line.len() },
                }))
            }
            (false, None) => {
                // Room for a `\r` still to be stripped
                if buf.len() > self.max_length.saturating_add(1) {
                    self.discarding = true;
                    self.discarded = buf.len();
                    self.next_index = 0;
                    buf.clear();
                } else {
                    self.next_index = buf.len();
                }
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<LineFrame>, io::Error> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }

        // An unterminated trailing line is dropped with the connection.
        if !buf.is_empty() {
            tracing::debug!(bytes = buf.len(), "Discarding partial line at end of stream");
            buf.clear();
        }
        self.next_index = 0;
        self.discarding = false;
        self.discarded = 0;
        Ok(None)
    }
}
