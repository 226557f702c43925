//! Document abstraction for language analysis.
//!
//! A document is immutable text plus a line index built once at
//! construction. Analysis never mutates it.

use crate::types::{ByteRange, Position, Range};
use polybench_source_map::FileInformation;

/// A document for language analysis.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document's URI or path.
    uri: String,
    /// The document content.
    content: String,
    /// Line-break index over `content`.
    info: FileInformation,
}

impl Document {
    /// Create a new document with the given URI and content.
    pub fn new(uri: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let info = FileInformation::new(&content);
        Self {
            uri: uri.into(),
            content,
            info,
        }
    }

    /// Get the document's URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the document's content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the filename from the URI (for display purposes).
    pub fn filename(&self) -> &str {
        self.uri.rsplit(['/', '\\']).next().unwrap_or(&self.uri)
    }

    pub fn line_count(&self) -> usize {
        self.info.line_count()
    }

    /// Text of a line without its terminator.
    pub fn line(&self, row: usize) -> Option<&str> {
        self.info.line_text(row, &self.content)
    }

    /// Byte offset at which a line starts.
    pub fn line_start(&self, row: usize) -> Option<usize> {
        self.info.line_start(row)
    }

    /// Position of a byte offset. Offsets past the end clamp to the end.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.content.len());
        match self.info.offset_to_location(offset, &self.content) {
            Some(loc) => Position::new(loc.row as u32, loc.column as u32),
            None => Position::default(),
        }
    }

    /// Byte offset of a (line, character) pair on that line.
    ///
    /// Returns None when the line does not exist or the character lies past
    /// its end.
    pub fn offset_at(&self, line: usize, character: usize) -> Option<usize> {
        let start = self.info.line_start(line)?;
        let text = self.line(line)?;
        if character == 0 {
            return Some(start);
        }
        let mut count = 0;
        for (idx, _) in text.char_indices() {
            if count == character {
                return Some(start + idx);
            }
            count += 1;
        }
        (count == character).then_some(start + text.len())
    }

    /// Byte span covered by a single-line range.
    pub fn byte_range(&self, range: &Range) -> Option<ByteRange> {
        let start = self.offset_at(range.start.line as usize, range.start.character as usize)?;
        let end = self.offset_at(range.end.line as usize, range.end.character as usize)?;
        Some(ByteRange::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_basics() {
        let doc = Document::new("/path/to/suite.bench", "suite a {\r\n}\r\n");
        assert_eq!(doc.filename(), "suite.bench");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(0), Some("suite a {"));
        assert_eq!(doc.line(1), Some("}"));
        assert_eq!(doc.line_start(1), Some(11));
    }

    #[test]
    fn test_position_and_offset_agree() {
        let doc = Document::new("t.bench", "ab\nçd e\n");
        let offset = doc.offset_at(1, 1).unwrap();
        assert_eq!(&doc.content()[offset..offset + 1], "d");
        assert_eq!(doc.position_at(offset), Position::new(1, 1));
        assert_eq!(doc.offset_at(1, 4), Some(doc.content().len() - 1));
        assert_eq!(doc.offset_at(1, 5), None);
    }

    #[test]
    fn test_byte_range_of_token() {
        let doc = Document::new("t.bench", "x\n  go: f(a)\n");
        let range = Range::on_line(1, 6, 1);
        let bytes = doc.byte_range(&range).unwrap();
        assert_eq!(&doc.content()[bytes.start..bytes.end], "f");
    }
}
