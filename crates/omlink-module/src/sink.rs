use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

/// Category of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTag {
    /// Decoded unsolicited event.
    Event,
    /// Decoded response to a host command.
    Response,
    /// Framing, length, checksum or decode failure.
    Error,
    /// Supplementary detail (hex dumps, transmitted commands).
    Trace,
}

impl LineTag {
    pub fn as_str(self) -> &'static str {
        match self {
            LineTag::Event => "event",
            LineTag::Response => "response",
            LineTag::Error => "error",
            LineTag::Trace => "trace",
        }
    }
}

impl fmt::Display for LineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tagged, timestamped output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub tag: LineTag,
    pub timestamp_ms: u64,
    pub text: String,
}

/// Destination for the link's human-readable output.
pub trait LineSink {
    fn emit(&mut self, line: Line);
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn emit(&mut self, line: Line) {
        (**self).emit(line)
    }
}

/// Forwards lines to `tracing`, with the tag as a structured field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn emit(&mut self, line: Line) {
        let tag = line.tag.as_str();
        match line.tag {
            LineTag::Event | LineTag::Response => {
                info!(tag, ts = line.timestamp_ms, "{}", line.text)
            }
            LineTag::Error => warn!(tag, ts = line.timestamp_ms, "{}", line.text),
            LineTag::Trace => debug!(tag, ts = line.timestamp_ms, "{}", line.text),
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<Line>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Text of every line carrying `tag`, in order.
    pub fn texts(&self, tag: LineTag) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|line| line.tag == tag)
            .map(|line| line.text.as_str())
            .collect()
    }

    /// Take and clear the collected lines.
    pub fn take(&mut self) -> Vec<Line> {
        std::mem::take(&mut self.lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LineSink for MemorySink {
    fn emit(&mut self, line: Line) {
        self.lines.push(line);
    }
}
