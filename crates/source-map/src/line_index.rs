//! Offset to line/column conversion for error reporting.

use crate::ByteOffset;
use std::fmt;
use text_size::TextSize;

/// A line and column position (0-indexed, column in bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed byte column within the line.
    pub col: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Renders as the 1-indexed `line:column` pair editors expect.
impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// Line start table for one source unit.
///
/// Only `\n` starts a new line; a preceding `\r` stays part of the previous
/// line's text so CRLF files report the same line numbers as LF files.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the offset where line `i` begins.
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
        );

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Returns `None` past the end of the source. The end offset itself is
    /// valid, since EOF errors point there.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let col = u32::from(offset) - u32::from(self.line_starts[line]);

        Some(LineCol {
            line: line as u32,
            col,
        })
    }

    /// Converts a line/column position back to a byte offset.
    pub fn offset(&self, line_col: LineCol) -> Option<ByteOffset> {
        let line_start = *self.line_starts.get(line_col.line as usize)?;
        let offset = line_start + TextSize::from(line_col.col);
        (offset <= self.len).then_some(offset)
    }

    /// Returns the byte offset where a line starts.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }
}
