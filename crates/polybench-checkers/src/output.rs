/*
 * output.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Toolchain output parsing and diagnostic construction.
 */

//! Toolchain output parsing and diagnostic construction.
//!
//! Text toolchains report `file:line:col: message`; lines that do not look
//! like that are ignored. Locations already mapped into document
//! coordinates become [`Diagnostic`]s tagged with their language.

use polybench_lsp_core::{
    ByteRange, Diagnostic, DiagnosticOrigin, DiagnosticSeverity, EmbeddedBlock, Language,
    Position, Range,
};
use polybench_source_map::Location;
use regex::Regex;
use std::sync::LazyLock;

/// Longest message used for a whole-block summary diagnostic.
pub const SUMMARY_MAX_CHARS: usize = 120;

static LOCATED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?):(\d+):(\d+):\s*(.*)$").expect("Invalid regex pattern for located lines")
});

/// One `file:line:col: message` report. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedMessage {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse `file:line:col: message` lines.
///
/// Tab-indented lines directly after a report are continuation lines
/// (Go's `have`/`want` notes) and are appended to its message.
pub fn parse_located_lines(output: &str) -> Vec<LocatedMessage> {
    let mut messages: Vec<LocatedMessage> = Vec::new();
    let mut continuing = false;

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(caps) = LOCATED_LINE.captures(line)
            && let (Some(file), Some(row), Some(col), Some(message)) =
                (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
            && let (Ok(row), Ok(col)) = (row.as_str().parse(), col.as_str().parse())
        {
            messages.push(LocatedMessage {
                file: file.as_str().trim().to_string(),
                line: row,
                column: col,
                message: message.as_str().trim().to_string(),
            });
            continuing = true;
            continue;
        }

        if continuing
            && line.starts_with('\t')
            && let Some(last) = messages.last_mut()
        {
            last.message.push('\n');
            last.message.push_str(line.trim());
            continue;
        }
        continuing = false;
    }

    messages
}

/// Trim a message, dropping it when nothing is left.
pub fn clean_message(message: &str) -> Option<String> {
    let trimmed = message.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Shorten a message to [`SUMMARY_MAX_CHARS`] characters.
pub fn truncate_summary(message: &str) -> String {
    if message.chars().count() <= SUMMARY_MAX_CHARS {
        return message.to_string();
    }
    let mut out: String = message.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    out.push_str("...");
    out
}

/// Diagnostic for a mapped location.
///
/// Without an explicit end, the range covers the identifier starting at
/// `start` (or a single character when there is none).
pub fn diagnostic_at(
    block: &EmbeddedBlock,
    start: Location,
    end: Option<Location>,
    severity: DiagnosticSeverity,
    message: impl Into<String>,
) -> Diagnostic {
    let end = end
        .filter(|e| e.offset > start.offset)
        .unwrap_or_else(|| token_end(block, start));

    let range = Range::new(
        Position::new(start.row as u32, start.column as u32),
        Position::new(end.row as u32, end.column as u32),
    );
    Diagnostic::new(foreign_origin(block.language), range, severity, message)
        .with_byte_range(Some(ByteRange::new(start.offset, end.offset)))
}

/// Diagnostic spanning the text of the block's first line.
pub fn block_start_diagnostic(
    block: &EmbeddedBlock,
    severity: DiagnosticSeverity,
    message: impl Into<String>,
) -> Diagnostic {
    let first = block.source.lines().next().unwrap_or("");
    let trimmed = first.trim_end();
    let indent_bytes = trimmed.len() - trimmed.trim_start().len();
    let start_col = trimmed[..indent_bytes].chars().count();
    let end_col = trimmed.chars().count().max(start_col + 1);

    let range = Range::new(
        Position::new(block.start_line as u32, start_col as u32),
        Position::new(block.start_line as u32, end_col as u32),
    );
    let start_offset = block.start_offset + indent_bytes;
    let end_offset = (block.start_offset + trimmed.len()).max(start_offset);
    Diagnostic::new(foreign_origin(block.language), range, severity, message)
        .with_byte_range(Some(ByteRange::new(start_offset, end_offset)))
}

pub fn foreign_origin(language: Language) -> DiagnosticOrigin {
    DiagnosticOrigin::Foreign { language }
}

fn token_end(block: &EmbeddedBlock, start: Location) -> Location {
    let local = start.offset.saturating_sub(block.start_offset);
    let rest = block.source.get(local..).unwrap_or("");

    let mut bytes = 0;
    let mut chars = 0;
    for ch in rest.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            bytes += ch.len_utf8();
            chars += 1;
        } else {
            break;
        }
    }
    if chars == 0
        && let Some(ch) = rest.chars().next()
        && ch != '\n'
        && ch != '\r'
    {
        bytes = ch.len_utf8();
        chars = 1;
    }

    Location {
        offset: start.offset + bytes,
        row: start.row,
        column: start.column + chars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polybench_lsp_core::BlockKind;

    fn block(source: &str) -> EmbeddedBlock {
        EmbeddedBlock {
            language: Language::Go,
            kind: BlockKind::Bench,
            owner: Some("b".to_string()),
            start_line: 4,
            end_line: 4 + source.lines().count() - 1,
            start_offset: 50,
            end_offset: 50 + source.len(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_parse_located_lines() {
        let output = "# command-line-arguments\n./main.go:5:2: undefined: foo\n./main.go:6:9: cannot use x (variable of type int) as string value\n\thave int\n\twant string\nnote: something else\n";
        let messages = parse_located_lines(output);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].file, "./main.go");
        assert_eq!((messages[0].line, messages[0].column), (5, 2));
        assert_eq!(messages[0].message, "undefined: foo");
        assert_eq!(
            messages[1].message,
            "cannot use x (variable of type int) as string value\nhave int\nwant string"
        );
    }

    #[test]
    fn test_parse_ignores_unrecognized_lines() {
        assert!(parse_located_lines("go: downloading x\nbuild failed\n").is_empty());
    }

    #[test]
    fn test_clean_and_truncate() {
        assert_eq!(clean_message("   "), None);
        assert_eq!(clean_message(" x "), Some("x".to_string()));

        let long = "a".repeat(200);
        let short = truncate_summary(&long);
        assert_eq!(short.chars().count(), SUMMARY_MAX_CHARS);
        assert!(short.ends_with("..."));
        assert_eq!(truncate_summary("short"), "short");
    }

    #[test]
    fn test_diagnostic_covers_identifier() {
        let b = block("    foo(bar)\n");
        let start = Location {
            offset: 54,
            row: 4,
            column: 4,
        };
        let d = diagnostic_at(&b, start, None, DiagnosticSeverity::Error, "undefined: foo");
        assert_eq!(d.range.start, Position::new(4, 4));
        assert_eq!(d.range.end, Position::new(4, 7));
        assert_eq!(d.byte_range, Some(ByteRange::new(54, 57)));
        assert_eq!(
            d.origin,
            DiagnosticOrigin::Foreign {
                language: Language::Go
            }
        );
    }

    #[test]
    fn test_diagnostic_on_punctuation_covers_one_char() {
        let b = block("    foo(bar)\n");
        let start = Location {
            offset: 57,
            row: 4,
            column: 7,
        };
        let d = diagnostic_at(&b, start, None, DiagnosticSeverity::Error, "x");
        assert_eq!(d.range.end, Position::new(4, 8));
    }

    #[test]
    fn test_block_start_diagnostic() {
        let b = block("    foo(bar)  \n    more\n");
        let d = block_start_diagnostic(&b, DiagnosticSeverity::Warning, "disabled");
        assert_eq!(d.range.start, Position::new(4, 4));
        assert_eq!(d.range.end, Position::new(4, 12));
        assert_eq!(d.byte_range, Some(ByteRange::new(54, 62)));
    }
}
