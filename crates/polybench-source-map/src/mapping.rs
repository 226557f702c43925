//! Position mapping from a wrapped fragment back to its document

use crate::file_info::FileInformation;
use crate::types::Location;
use crate::utils::content_line_count;

/// Maps coordinates in a synthetic wrapper back to the enclosing document.
///
/// A foreign fragment is a byte-exact slice of the document starting at
/// `parent_offset` on document row `parent_row`. Toolchains see it behind
/// `header_lines` injected lines (`header_bytes` long) and possibly followed
/// by a footer. Locations inside the header or footer have no document
/// counterpart and map to `None`.
#[derive(Debug, Clone)]
pub struct FragmentMap<'a> {
    fragment: &'a str,
    info: FileInformation,
    parent_offset: usize,
    parent_row: usize,
    header_lines: usize,
    header_bytes: usize,
    line_count: usize,
}

impl<'a> FragmentMap<'a> {
    pub fn new(
        fragment: &'a str,
        parent_offset: usize,
        parent_row: usize,
        header_lines: usize,
        header_bytes: usize,
    ) -> Self {
        FragmentMap {
            fragment,
            info: FileInformation::new(fragment),
            parent_offset,
            parent_row,
            header_lines,
            header_bytes,
            line_count: content_line_count(fragment),
        }
    }

    /// Number of content lines the fragment contributes.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Map a 0-based wrapped line and 0-based byte column.
    ///
    /// Columns past the end of the line clamp to the line end; columns that
    /// split a multi-byte character round down to its start.
    pub fn map_line_column(&self, wrapped_line: usize, byte_column: usize) -> Option<Location> {
        let line = wrapped_line.checked_sub(self.header_lines)?;
        if line >= self.line_count {
            return None;
        }
        let start = self.info.line_start(line)?;
        let end = self.info.line_end(line, self.fragment)?;

        let mut offset = (start + byte_column).min(end);
        while offset > start && !self.fragment.is_char_boundary(offset) {
            offset -= 1;
        }
        let column = self.fragment.get(start..offset)?.chars().count();

        Some(Location {
            offset: self.parent_offset + offset,
            row: self.parent_row + line,
            column,
        })
    }

    /// Map a byte offset into the wrapped source.
    pub fn map_offset(&self, wrapped_offset: usize) -> Option<Location> {
        let offset = wrapped_offset.checked_sub(self.header_bytes)?;
        if offset > self.fragment.len() {
            return None;
        }
        let local = self.info.offset_to_location(offset, self.fragment)?;
        if local.row >= self.line_count {
            return None;
        }
        Some(Location {
            offset: self.parent_offset + offset,
            row: self.parent_row + local.row,
            column: local.column,
        })
    }
}
