//! Link message classification and the bulk transfer buffer.
//!
//! # Message grammar
//!
//! | Message | Meaning |
//! |---------|---------|
//! | `L:<mask>:<lx>:<ly>:<rx>:<ry>` | live frame |
//! | `START:<byteLength>` | begin a buffered transfer (length informational) |
//! | `END` | finish the transfer |
//! | anything else | document chunk, kept only while transferring |
//!
//! Control keywords tolerate a trailing CR/LF. Chunks are kept byte for byte.

use heapless::Vec;
use switch_proto::{is_live_frame, DocumentError, MAX_DOCUMENT_LEN};

const START_PREFIX: &[u8] = b"START:";
const END_KEYWORD: &[u8] = b"END";

/// One message from the link, classified by its prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message<'a> {
    /// Live frame, still unparsed.
    Live(&'a [u8]),
    /// Start of a transfer with the announced length, if it was readable.
    Start { announced_len: Option<usize> },
    /// End of a transfer.
    End,
    /// Document chunk.
    Chunk(&'a [u8]),
}

impl<'a> Message<'a> {
    /// Classify a raw message.
    #[must_use]
    pub fn classify(raw: &'a [u8]) -> Self {
        if is_live_frame(raw) {
            return Message::Live(raw);
        }
        let trimmed = strip_line_ending(raw);
        if let Some(len) = trimmed.strip_prefix(START_PREFIX) {
            return Message::Start {
                announced_len: parse_len(len),
            };
        }
        if trimmed == END_KEYWORD {
            return Message::End;
        }
        Message::Chunk(raw)
    }
}

/// Accumulates the chunks of one transfer.
///
/// Once a chunk does not fit, the transfer is marked overflowed and every
/// later chunk is dropped until the next [`begin`](Self::begin).
pub struct TransferBuffer {
    buf: Vec<u8, MAX_DOCUMENT_LEN>,
    overflowed: bool,
}

impl TransferBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
        }
    }

    /// Discard anything received and start a fresh transfer.
    pub fn begin(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }

    /// Append a chunk verbatim.
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), DocumentError> {
        if self.overflowed {
            return Err(DocumentError::TooLarge);
        }
        self.buf.extend_from_slice(chunk).map_err(|_| {
            self.overflowed = true;
            DocumentError::TooLarge
        })
    }

    /// The complete document, unless it overflowed.
    pub fn document(&self) -> Result<&[u8], DocumentError> {
        if self.overflowed {
            Err(DocumentError::TooLarge)
        } else {
            Ok(&self.buf)
        }
    }

    /// Bytes received so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Full-capacity scratch space for loading a stored document.
    ///
    /// Call [`truncate`](Self::truncate) with the loaded length afterwards.
    pub(crate) fn scratch(&mut self) -> &mut [u8] {
        self.begin();
        // Vec<u8> resize within capacity cannot fail
        let _ = self.buf.resize(MAX_DOCUMENT_LEN, 0);
        &mut self.buf
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }
}

impl Default for TransferBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip trailing CR and/or LF from a message.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

fn parse_len(s: &[u8]) -> Option<usize> {
    if s.is_empty() {
        return None;
    }
    s.iter().try_fold(0usize, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add((b - b'0') as usize)
    })
}
