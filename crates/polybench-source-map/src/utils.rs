//! Utility functions for working with source positions

use crate::types::{Location, Range};

/// Convert a byte offset to a Location with line and column info
///
/// Columns count characters. Returns None if the offset is out of bounds.
pub fn offset_to_location(source: &str, offset: usize) -> Option<Location> {
    if offset > source.len() {
        return None;
    }

    let mut row = 0;
    let mut column = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }

        if ch == '\n' {
            row += 1;
            column = 0;
        } else {
            column += 1;
        }

        current_offset += ch.len_utf8();
    }

    Some(Location {
        offset,
        row,
        column,
    })
}

/// Convert line and column numbers to a byte offset
///
/// Line and column are 0-indexed, the column in characters. Returns None if
/// out of bounds.
pub fn line_col_to_offset(source: &str, line: usize, col: usize) -> Option<usize> {
    let mut current_line = 0;
    let mut current_col = 0;
    let mut offset = 0;

    for ch in source.chars() {
        if current_line == line && current_col == col {
            return Some(offset);
        }

        if ch == '\n' {
            current_line += 1;
            current_col = 0;
        } else {
            current_col += 1;
        }

        offset += ch.len_utf8();
    }

    if current_line == line && current_col == col {
        return Some(offset);
    }

    None
}

/// Convert a UTF-16 code unit offset into a byte offset.
///
/// JavaScript-hosted toolchains report positions in UTF-16 code units.
/// Offsets past the end clamp to `source.len()`.
pub fn utf16_to_byte_offset(source: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in source.char_indices() {
        if units >= utf16_offset {
            return idx;
        }
        units += ch.len_utf16();
    }
    source.len()
}

/// Number of content lines in a fragment.
///
/// A trailing newline terminates the last line rather than starting a new
/// one, and the empty fragment has no lines.
pub fn content_line_count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let breaks = text.bytes().filter(|b| *b == b'\n').count();
    if text.ends_with('\n') {
        breaks
    } else {
        breaks + 1
    }
}

/// Build a Range from byte offsets, filling in rows and columns.
///
/// Returns None if either offset is out of bounds.
pub fn range_from_offsets(source: &str, start: usize, end: usize) -> Option<Range> {
    Some(Range {
        start: offset_to_location(source, start)?,
        end: offset_to_location(source, end)?,
    })
}
