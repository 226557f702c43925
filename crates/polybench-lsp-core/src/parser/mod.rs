//! Structural parser for `.bench` documents.
//!
//! A single top-to-bottom scan over the lines maintains a stack of open
//! blocks. Containers (`suite`, `fixture`, `bench`) close on any lone `}`;
//! language blocks close only on a lone `}` indented exactly like their
//! opening marker, because the foreign code inside may open and close
//! braces of its own. Lines inside a language block are never matched
//! against markers.
//!
//! The parser is error tolerant: a misplaced marker is reported and its
//! frame is still pushed so that nested content keeps being extracted.

pub mod marker;
pub mod scan;

use crate::types::Language;
use marker::{InlineFixture, Marker, MarkerKind};
use polybench_source_map::FileInformation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The construct an embedded block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Setup,
    Fixture,
    Bench,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Setup => write!(f, "setup"),
            BlockKind::Fixture => write!(f, "fixture"),
            BlockKind::Bench => write!(f, "bench"),
        }
    }
}

/// A contiguous range of foreign source extracted from the document.
///
/// `source` is exactly `document[start_offset..end_offset]`: every content
/// line between the opening marker and the closing brace line, terminators
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedBlock {
    pub language: Language,
    pub kind: BlockKind,
    /// Name of the enclosing fixture or bench; `None` for setup blocks.
    pub owner: Option<String>,
    /// First content line (the line after the opening marker).
    pub start_line: usize,
    /// Last content line. Smaller than `start_line` for an empty block.
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub source: String,
}

impl EmbeddedBlock {
    /// Whether the block contains anything besides whitespace.
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty()
    }
}

/// A structural violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub errors: Vec<SyntaxError>,
    /// Embedded blocks in document order.
    pub embedded: Vec<EmbeddedBlock>,
}

impl ParseResult {
    pub fn blocks_of(&self, language: Language) -> impl Iterator<Item = &EmbeddedBlock> {
        self.embedded.iter().filter(move |b| b.language == language)
    }
}

/// What an open frame on the parse stack represents.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameKind {
    Suite,
    Fixture(String),
    Bench(String),
    /// A language block. `language` is None for an unrecognized marker and
    /// `owner` is None when the block is misplaced; neither is recorded.
    Language {
        /// Block label used in messages, e.g. `setup go` or `fixture ts`.
        label: String,
        language: Option<Language>,
        owner: Option<(BlockKind, Option<String>)>,
    },
}

#[derive(Debug, Clone)]
struct BlockFrame {
    kind: FrameKind,
    opening_line: usize,
    indent: String,
    column: usize,
}

impl BlockFrame {
    fn is_language(&self) -> bool {
        matches!(self.kind, FrameKind::Language { .. })
    }

    fn unclosed_message(&self) -> String {
        match &self.kind {
            FrameKind::Suite => "Unclosed suite block".to_string(),
            FrameKind::Fixture(_) => "Unclosed fixture block".to_string(),
            FrameKind::Bench(_) => "Unclosed bench block".to_string(),
            FrameKind::Language { label, .. } => format!("Unclosed {} block", label),
        }
    }
}

/// Parse a document's structure.
///
/// # Example
///
/// ```rust
/// use polybench_lsp_core::parse;
///
/// let text = "suite s {\n  setup go {\n    func f() {}\n  }\n}\n";
/// let result = parse(text);
/// assert!(result.errors.is_empty());
/// let block = &result.embedded[0];
/// assert_eq!(block.source, "    func f() {}\n");
/// assert_eq!(&text[block.start_offset..block.end_offset], block.source);
/// ```
pub fn parse(text: &str) -> ParseResult {
    let info = FileInformation::new(text);
    let mut errors = Vec::new();
    let mut embedded = Vec::new();
    let mut stack: Vec<BlockFrame> = Vec::new();

    for row in 0..info.line_count() {
        let Some(line) = info.line_text(row, text) else {
            continue;
        };

        // A one-line fixture opens and closes nothing
        if !stack.last().is_some_and(BlockFrame::is_language)
            && InlineFixture::parse(line).is_some()
        {
            if !matches!(stack.last().map(|f| &f.kind), Some(FrameKind::Suite)) {
                errors.push(SyntaxError::new(
                    row,
                    scan::indent_width(line),
                    "'fixture' must be inside a suite",
                ));
            }
            continue;
        }

        for brace in scan::unquoted_braces(line).into_iter().filter(|b| !b.open) {
            let Some(top) = stack.last() else {
                errors.push(SyntaxError::new(row, brace.column, "Unexpected }"));
                continue;
            };
            let closes = if top.is_language() {
                scan::closes_block(line, &top.indent)
            } else {
                scan::is_lone_close(line)
            };
            if !closes {
                continue;
            }
            if let Some(frame) = stack.pop()
                && let Some(block) = finish_block(&frame, row, &info, text)
            {
                embedded.push(block);
            }
        }

        if stack.last().is_some_and(BlockFrame::is_language) {
            continue;
        }

        let Some(marker) = Marker::parse(line) else {
            continue;
        };
        let column = scan::indent_width(line);
        let indent = scan::indentation(line).to_string();
        let parent = stack.last().map(|f| &f.kind);
        let in_suite = matches!(parent, Some(FrameKind::Suite));

        let kind = match marker.kind {
            MarkerKind::Suite => {
                if !stack.is_empty() {
                    errors.push(SyntaxError::new(row, column, "Nested 'suite' not allowed"));
                }
                FrameKind::Suite
            }
            MarkerKind::Fixture | MarkerKind::Bench => {
                let is_fixture = marker.kind == MarkerKind::Fixture;
                if !in_suite {
                    let keyword = if is_fixture { "fixture" } else { "bench" };
                    errors.push(SyntaxError::new(
                        row,
                        column,
                        format!("'{}' must be inside a suite", keyword),
                    ));
                }
                if is_fixture {
                    FrameKind::Fixture(marker.name.to_string())
                } else {
                    FrameKind::Bench(marker.name.to_string())
                }
            }
            MarkerKind::Setup => {
                let language = Language::from_marker(marker.name);
                if language.is_none() {
                    errors.push(SyntaxError::new(
                        row,
                        marker.name_column,
                        format!("Unknown language '{}'", marker.name),
                    ));
                }
                let owner = if in_suite {
                    Some((BlockKind::Setup, None))
                } else {
                    errors.push(SyntaxError::new(
                        row,
                        column,
                        format!("'setup {}' must be inside a suite", marker.name),
                    ));
                    None
                };
                FrameKind::Language {
                    label: format!("setup {}", marker.name),
                    language,
                    owner,
                }
            }
            MarkerKind::LanguageBlock => {
                let language = Language::from_marker(marker.name);
                if language.is_none() {
                    errors.push(SyntaxError::new(
                        row,
                        marker.name_column,
                        format!("Unknown language '{}'", marker.name),
                    ));
                }
                let owner = match parent {
                    Some(FrameKind::Fixture(name)) => {
                        Some((BlockKind::Fixture, Some(name.clone())))
                    }
                    Some(FrameKind::Bench(name)) => Some((BlockKind::Bench, Some(name.clone()))),
                    _ => {
                        errors.push(SyntaxError::new(
                            row,
                            column,
                            format!("'{}' block must be inside a fixture or bench", marker.name),
                        ));
                        None
                    }
                };
                let label = match &owner {
                    Some((kind, _)) => format!("{} {}", kind, marker.name),
                    None => marker.name.to_string(),
                };
                FrameKind::Language {
                    label,
                    language,
                    owner,
                }
            }
        };

        stack.push(BlockFrame {
            kind,
            opening_line: row,
            indent,
            column,
        });
    }

    for frame in stack.iter().rev() {
        errors.push(SyntaxError::new(
            frame.opening_line,
            frame.column,
            frame.unclosed_message(),
        ));
    }

    ParseResult { errors, embedded }
}

/// Record a closed language frame as an embedded block.
fn finish_block(
    frame: &BlockFrame,
    closing_line: usize,
    info: &FileInformation,
    text: &str,
) -> Option<EmbeddedBlock> {
    let FrameKind::Language {
        language: Some(language),
        owner: Some((kind, owner)),
        ..
    } = &frame.kind
    else {
        return None;
    };
    let start_line = frame.opening_line + 1;
    let start_offset = info.line_start(start_line)?;
    let end_offset = info.line_start(closing_line)?;
    Some(EmbeddedBlock {
        language: *language,
        kind: *kind,
        owner: owner.clone(),
        start_line,
        end_line: closing_line - 1,
        start_offset,
        end_offset,
        source: text.get(start_offset..end_offset)?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = r#"suite hashing {
  description: "hash throughput"
  iterations: 1000

  setup go {
    import "crypto/sha256"

    func hashIt(b []byte) [32]byte {
      if len(b) == 0 {
        return [32]byte{}
      }
      return sha256.Sum256(b)
    }
  }

  setup ts {
    import { createHash } from "node:crypto";
  }

  fixture data {
    hex: "68656c6c6f"
    ts: {
      return new Uint8Array([104, 105]);
    }
  }

  bench sha {
    go: hashIt(data)
    rust: {
      let _ = data.len();
    }
  }
}
"#;

    fn messages(result: &ParseResult) -> Vec<(usize, usize, &str)> {
        result
            .errors
            .iter()
            .map(|e| (e.line, e.column, e.message.as_str()))
            .collect()
    }

    #[test]
    fn test_well_formed_document_has_no_errors() {
        let result = parse(SUITE);
        assert_eq!(messages(&result), vec![]);
        assert_eq!(result.embedded.len(), 4);

        let kinds: Vec<_> = result
            .embedded
            .iter()
            .map(|b| (b.language, b.kind, b.owner.as_deref()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (Language::Go, BlockKind::Setup, None),
                (Language::TypeScript, BlockKind::Setup, None),
                (Language::TypeScript, BlockKind::Fixture, Some("data")),
                (Language::Rust, BlockKind::Bench, Some("sha")),
            ]
        );
    }

    #[test]
    fn test_blocks_are_exact_slices() {
        let result = parse(SUITE);
        for block in &result.embedded {
            assert_eq!(&SUITE[block.start_offset..block.end_offset], block.source);
        }
        let go = &result.embedded[0];
        assert_eq!(go.start_line, 5);
        assert_eq!(go.end_line, 12);
        assert!(go.source.starts_with("    import \"crypto/sha256\"\n"));
        assert!(go.source.ends_with("    }\n"));
    }

    #[test]
    fn test_inner_braces_do_not_close_block() {
        let result = parse(SUITE);
        let go = &result.embedded[0];
        let opens = go.source.matches('{').count();
        let closes = go.source.matches('}').count();
        assert_eq!(opens, closes);
        assert!(go.source.contains("return sha256.Sum256(b)"));
    }

    #[test]
    fn test_empty_block() {
        let text = "suite s {\n  setup go {\n  }\n}\n";
        let result = parse(text);
        assert!(result.errors.is_empty());
        let block = &result.embedded[0];
        assert_eq!(block.source, "");
        assert_eq!(block.start_line, 2);
        assert_eq!(block.end_line, 1);
        assert_eq!(block.start_offset, block.end_offset);
    }

    #[test]
    fn test_crlf_lines() {
        let text = "suite s {\r\n  setup ts {\r\n    const x = 1;\r\n  }\r\n}\r\n";
        let result = parse(text);
        assert!(result.errors.is_empty());
        assert_eq!(result.embedded[0].source, "    const x = 1;\r\n");
    }

    #[test]
    fn test_unexpected_close() {
        let result = parse("suite s {\n}\n  }\n");
        assert_eq!(messages(&result), vec![(2, 2, "Unexpected }")]);
    }

    #[test]
    fn test_misplaced_markers_are_reported_and_pushed() {
        let text = "setup go {\n  func f() {}\n}\nfixture x {\n  hex: \"00\"\n}\ngo: {\n}\n";
        let result = parse(text);
        assert_eq!(
            messages(&result),
            vec![
                (0, 0, "'setup go' must be inside a suite"),
                (3, 0, "'fixture' must be inside a suite"),
                (6, 0, "'go' block must be inside a fixture or bench"),
            ]
        );
        assert!(result.embedded.is_empty());
    }

    #[test]
    fn test_inline_fixture_is_balanced() {
        let result = parse("suite s {\n  fixture data { hex: \"68656c6c6f\" }\n}\n");
        assert!(result.errors.is_empty(), "{:?}", result.errors);

        let result = parse("fixture data { hex: \"00\" }\n");
        assert_eq!(messages(&result), vec![(0, 0, "'fixture' must be inside a suite")]);
    }

    #[test]
    fn test_nested_suite() {
        let result = parse("suite a {\n  suite b {\n  }\n}\n");
        assert_eq!(messages(&result), vec![(1, 2, "Nested 'suite' not allowed")]);
    }

    #[test]
    fn test_bench_outside_suite() {
        let result = parse("bench b {\n  go: f()\n}\n");
        assert_eq!(messages(&result), vec![(0, 0, "'bench' must be inside a suite")]);
    }

    #[test]
    fn test_unclosed_frames_innermost_first() {
        let text = "suite s {\n  fixture f {\n    ts: {\n      return x;\n      }\n";
        let result = parse(text);
        assert_eq!(
            messages(&result),
            vec![
                (2, 4, "Unclosed fixture ts block"),
                (1, 2, "Unclosed fixture block"),
                (0, 0, "Unclosed suite block"),
            ]
        );
    }

    #[test]
    fn test_unclosed_setup_block() {
        let result = parse("suite s {\n  setup go {\n    func f() {}\n}\n");
        assert_eq!(
            messages(&result),
            vec![(1, 2, "Unclosed setup go block"), (0, 0, "Unclosed suite block")]
        );
    }

    #[test]
    fn test_markers_inside_language_block_are_opaque() {
        let text = "suite s {\n  setup ts {\n    const suite = { a: 1 };\n    fixture x {\n  }\n}\n";
        let result = parse(text);
        assert!(result.errors.is_empty());
        assert!(result.embedded[0].source.contains("fixture x {"));
    }

    #[test]
    fn test_unknown_language_is_opaque() {
        let text = "suite s {\n  setup python {\n    def f():\n        return {}\n  }\n}\n";
        let result = parse(text);
        assert_eq!(messages(&result), vec![(1, 8, "Unknown language 'python'")]);
        assert!(result.embedded.is_empty());
    }

    #[test]
    fn test_braces_in_strings_are_ignored() {
        let text = "suite s {\n  description: \"has } brace\"\n  bench b {\n    go: f(\"{\")\n  }\n}\n";
        let result = parse(text);
        assert!(result.errors.is_empty());
    }
}
