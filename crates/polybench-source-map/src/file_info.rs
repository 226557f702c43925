//! Efficient line information for location lookups

use crate::types::Location;
use serde::{Deserialize, Serialize};

/// Line-break index over a piece of text
///
/// Stores the byte offset of every `\n` so that offset-to-location
/// conversions and line slicing run without rescanning the text. A `\r`
/// directly before a `\n` is treated as part of the line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInformation {
    /// Byte offsets of each newline character in the text
    line_breaks: Vec<usize>,

    /// Total length of the text in bytes
    total_length: usize,
}

impl FileInformation {
    /// Create line information by scanning the content once.
    ///
    /// # Example
    ///
    /// ```
    /// use polybench_source_map::FileInformation;
    ///
    /// let info = FileInformation::new("line 1\nline 2\nline 3");
    /// assert_eq!(info.line_count(), 3);
    /// ```
    pub fn new(content: &str) -> Self {
        let line_breaks: Vec<usize> = content
            .bytes()
            .enumerate()
            .filter_map(|(idx, b)| if b == b'\n' { Some(idx) } else { None })
            .collect();

        FileInformation {
            line_breaks,
            total_length: content.len(),
        }
    }

    /// Convert a byte offset to a Location with row and column.
    ///
    /// The column counts characters from the start of the line, so the
    /// original `content` is required. Offsets that fall inside a multi-byte
    /// character are rounded down to the character boundary.
    ///
    /// Returns None if the offset is out of bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use polybench_source_map::FileInformation;
    ///
    /// let text = "hello\nworld";
    /// let info = FileInformation::new(text);
    /// let loc = info.offset_to_location(6, text).unwrap();
    /// assert_eq!(loc.row, 1);
    /// assert_eq!(loc.column, 0);
    /// ```
    pub fn offset_to_location(&self, offset: usize, content: &str) -> Option<Location> {
        if offset > self.total_length {
            return None;
        }

        // A newline belongs to the line it terminates
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx,
        };

        let line_start = self.line_start(row)?;
        let mut end = offset;
        while end > line_start && !content.is_char_boundary(end) {
            end -= 1;
        }
        let column = content.get(line_start..end)?.chars().count();

        Some(Location {
            offset,
            row,
            column,
        })
    }

    /// Byte offset at which `row` starts.
    pub fn line_start(&self, row: usize) -> Option<usize> {
        match row {
            0 => Some(0),
            _ => self.line_breaks.get(row - 1).map(|b| b + 1),
        }
    }

    /// Byte offset just past the visible text of `row` (before `\r\n` or `\n`).
    pub fn line_end(&self, row: usize, content: &str) -> Option<usize> {
        let start = self.line_start(row)?;
        let end = self
            .line_breaks
            .get(row)
            .copied()
            .unwrap_or(self.total_length);
        if end > start && content.as_bytes().get(end - 1) == Some(&b'\r') {
            Some(end - 1)
        } else {
            Some(end)
        }
    }

    /// The visible text of `row`, without its line terminator.
    pub fn line_text<'a>(&self, row: usize, content: &'a str) -> Option<&'a str> {
        let start = self.line_start(row)?;
        let end = self.line_end(row, content)?;
        content.get(start..end)
    }

    /// Get the total length of the text in bytes
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Get the number of lines in the text
    pub fn line_count(&self) -> usize {
        // n newlines separate n+1 lines
        self.line_breaks.len() + 1
    }
}
