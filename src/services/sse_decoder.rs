// src/services/sse_decoder.rs
use futures::{Stream, StreamExt};
use std::pin::Pin;

use crate::error::ClientError;
use crate::message::ReplyChunk;

pub const SSE_PREFIX: &str = "data:";
pub const DONE_MARKER: &str = "[DONE]";

/// A decoded unit of the reply stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    Text(String),
    Done,
}

/// Line-oriented decoder for the mentor's `text/event-stream` replies.
///
/// Bytes are buffered until a `\n` shows up, so chunk boundaries never
/// change the frames that come out. Splitting happens on raw bytes before
/// UTF-8 decoding: `\n` never occurs inside a multi-byte sequence, so a
/// character torn across two chunks is decoded whole.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.finished = false;
    }

    /// Feed one network chunk and return every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        let mut frames = Vec::new();
        if self.finished {
            return frames;
        }
        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let frame = normalize_line(&String::from_utf8_lossy(&self.buffer[start..end]));
            start = end + 1;

            match frame {
                Some(StreamFrame::Done) => {
                    self.finished = true;
                    self.buffer.clear();
                    frames.push(StreamFrame::Done);
                    return frames;
                }
                Some(frame) => frames.push(frame),
                None => {}
            }
        }
        self.buffer.drain(..start);
        frames
    }

    /// Signal end of input. Flushes a trailing partial line and always
    /// ends with `Done`, whether or not the producer sent the sentinel.
    pub fn finish(&mut self) -> Vec<StreamFrame> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;

        let rest = std::mem::take(&mut self.buffer);
        match normalize_line(&String::from_utf8_lossy(&rest)) {
            Some(StreamFrame::Text(text)) => vec![StreamFrame::Text(text), StreamFrame::Done],
            _ => vec![StreamFrame::Done],
        }
    }
}

/// Trim, drop empties, detect the sentinel, strip one `data:` prefix.
pub fn normalize_line(line: &str) -> Option<StreamFrame> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == DONE_MARKER {
        return Some(StreamFrame::Done);
    }

    let payload = trimmed
        .strip_prefix(SSE_PREFIX)
        .map_or(trimmed, str::trim);
    match payload {
        "" => None,
        // the backend frames its sentinel as `data: [DONE]`
        DONE_MARKER => Some(StreamFrame::Done),
        text => Some(StreamFrame::Text(text.to_string())),
    }
}

pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<ReplyChunk, ClientError>> + Send>>;

/// Turn a response body into reply chunks, stopping at the sentinel or at
/// end of body. A read error is yielded once and ends the stream.
pub fn decode_reply_stream<S, B, E>(byte_stream: S) -> ReplyStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = SseFrameDecoder::new();
        let mut byte_stream = Box::pin(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(ClientError::Stream(e.to_string()));
                    return;
                }
            };

            for frame in decoder.feed(chunk.as_ref()) {
                match frame {
                    StreamFrame::Text(text) => {
                        yield Ok(ReplyChunk { text });
                    }
                    StreamFrame::Done => return,
                }
            }
        }

        for frame in decoder.finish() {
            if let StreamFrame::Text(text) = frame {
                yield Ok(ReplyChunk { text });
            }
        }
    })
}
