//! Raw lines read from an input source

use std::borrow::Cow;
use std::fmt;

/// Stream a raw line was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamOrigin {
    Stdin,
    Stdout,
    Stderr,
}

impl StreamOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamOrigin::Stdin => "stdin",
            StreamOrigin::Stdout => "stdout",
            StreamOrigin::Stderr => "stderr",
        }
    }

    /// Lines from this stream go through the transformer
    pub fn is_transformed(&self) -> bool {
        !matches!(self, StreamOrigin::Stderr)
    }
}

impl fmt::Display for StreamOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One newline-delimited unit read from a stream
///
/// `bytes` keeps the line terminator (if any) so the line can be relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub origin: StreamOrigin,
    bytes: Vec<u8>,
}

impl RawLine {
    pub fn new(origin: StreamOrigin, bytes: Vec<u8>) -> Self {
        Self { origin, bytes }
    }

    /// Raw bytes as read, including the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Line content without a trailing `\n` or `\r\n`
    pub fn text(&self) -> Cow<'_, str> {
        let mut end = self.bytes.len();
        if end > 0 && self.bytes[end - 1] == b'\n' {
            end -= 1;
            if end > 0 && self.bytes[end - 1] == b'\r' {
                end -= 1;
            }
        }
        String::from_utf8_lossy(&self.bytes[..end])
    }
}
