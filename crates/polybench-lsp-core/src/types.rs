//! Core types shared by every analysis tier.
//!
//! These types are designed to be:
//! - Transport-agnostic (no LSP protocol dependencies)
//! - Easily serializable to JSON
//!
//! All positions use 0-based line and character indices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a text document, expressed as zero-based line and character offset.
///
/// Character offsets count Unicode scalar values within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset.
    pub character: u32,
}

impl Position {
    /// Create a new position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.character.cmp(&other.character),
            ord => ord,
        }
    }
}

/// A range in a text document, expressed as start and end positions.
///
/// A zero-width range means the diagnostic has no known end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    /// The range's start position (inclusive).
    pub start: Position,
    /// The range's end position (exclusive).
    pub end: Position,
}

impl Range {
    /// Create a new range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range spanning a single position (zero-width).
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// A range over `len` characters of one line.
    pub fn on_line(line: usize, column: usize, len: usize) -> Self {
        Self {
            start: Position::new(line as u32, column as u32),
            end: Position::new(line as u32, (column + len) as u32),
        }
    }

    /// Check if this range contains a position.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if this range is empty (zero-width).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Byte offsets into the document, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Reports an error.
    Error = 1,
    /// Reports a warning.
    Warning = 2,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A foreign language that can be embedded in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "ts")]
    TypeScript,
    #[serde(rename = "rust")]
    Rust,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Go, Language::TypeScript, Language::Rust];

    /// Resolve the marker used in `setup LANG {` and `LANG: {` lines.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "go" => Some(Language::Go),
            "ts" => Some(Language::TypeScript),
            "rust" => Some(Language::Rust),
            _ => None,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::TypeScript => "ts",
            Language::Rust => "rust",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Go => "Go",
            Language::TypeScript => "TypeScript",
            Language::Rust => "Rust",
        }
    }

    /// Whether bench calls in this language may name a fixture's
    /// `<fixture>_hex` encoded form.
    pub fn accepts_hex_alias(&self) -> bool {
        matches!(self, Language::TypeScript)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Which analysis tier produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiagnosticOrigin {
    Syntax,
    Semantic,
    Foreign { language: Language },
}

impl fmt::Display for DiagnosticOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticOrigin::Syntax => write!(f, "syntax"),
            DiagnosticOrigin::Semantic => write!(f, "semantic"),
            DiagnosticOrigin::Foreign { language } => write!(f, "{}", language.marker()),
        }
    }
}

/// A diagnostic in document coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The tier that produced this diagnostic.
    pub origin: DiagnosticOrigin,
    /// The range at which the diagnostic applies.
    pub range: Range,
    /// The diagnostic's severity.
    pub severity: DiagnosticSeverity,
    /// The diagnostic's message.
    pub message: String,
    /// The diagnostic's code, which might appear in the user interface.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<String>,
    /// Byte span in the document, when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub byte_range: Option<ByteRange>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(
        origin: DiagnosticOrigin,
        range: Range,
        severity: DiagnosticSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            origin,
            range,
            severity,
            message: message.into(),
            code: None,
            byte_range: None,
        }
    }

    pub fn error(origin: DiagnosticOrigin, range: Range, message: impl Into<String>) -> Self {
        Self::new(origin, range, DiagnosticSeverity::Error, message)
    }

    pub fn warning(origin: DiagnosticOrigin, range: Range, message: impl Into<String>) -> Self {
        Self::new(origin, range, DiagnosticSeverity::Warning, message)
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the byte span the diagnostic covers.
    pub fn with_byte_range(mut self, byte_range: Option<ByteRange>) -> Self {
        self.byte_range = byte_range;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let p1 = Position::new(0, 5);
        let p2 = Position::new(0, 10);
        let p3 = Position::new(1, 0);

        assert!(p1 < p2);
        assert!(p2 < p3);
        assert!(p1 < p3);
    }

    #[test]
    fn test_range_contains() {
        let range = Range::on_line(1, 4, 6);
        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(1, 9)));
        assert!(!range.contains(Position::new(1, 10)));
        assert!(!range.contains(Position::new(0, 5)));
    }

    #[test]
    fn test_language_markers() {
        for language in Language::ALL {
            assert_eq!(Language::from_marker(language.marker()), Some(language));
        }
        assert_eq!(Language::from_marker("python"), None);
        assert!(Language::TypeScript.accepts_hex_alias());
        assert!(!Language::Go.accepts_hex_alias());
    }

    #[test]
    fn test_diagnostic_serialization() {
        let diag = Diagnostic::warning(
            DiagnosticOrigin::Foreign {
                language: Language::TypeScript,
            },
            Range::on_line(3, 2, 5),
            "something odd",
        )
        .with_code("TS2304");

        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["origin"]["kind"], "foreign");
        assert_eq!(json["origin"]["language"], "ts");
        assert_eq!(json["code"], "TS2304");
        assert!(json.get("byte_range").is_none());

        let back: Diagnostic = serde_json::from_value(json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_origin_tags() {
        let json = serde_json::to_string(&DiagnosticOrigin::Syntax).unwrap();
        assert_eq!(json, r#"{"kind":"syntax"}"#);
    }
}
