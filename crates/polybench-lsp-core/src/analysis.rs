//! Unified document analysis.
//!
//! `analyze_document()` runs the structural parser and the semantic pass
//! once and merges their output into tagged diagnostics: syntax errors
//! first, then semantic diagnostics. Foreign toolchain diagnostics are
//! produced elsewhere and appended by the caller.

use crate::document::Document;
use crate::parser::{self, ParseResult, SyntaxError};
use crate::semantic::{self, SymbolTable};
use crate::types::{Diagnostic, DiagnosticOrigin, Position, Range};
use serde::{Deserialize, Serialize};

/// Everything the in-process tiers know about a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub parse: ParseResult,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentAnalysis {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Analyze a document with both in-process tiers.
///
/// # Example
///
/// ```rust
/// use polybench_lsp_core::{Document, analyze_document};
///
/// let doc = Document::new("demo.bench", "suite s {\n  bench b {\n  }\n");
/// let analysis = analyze_document(&doc);
/// assert_eq!(analysis.diagnostics[0].message, "Unclosed suite block");
/// ```
pub fn analyze_document(doc: &Document) -> DocumentAnalysis {
    let parse = parser::parse(doc.content());
    let mut diagnostics: Vec<Diagnostic> = parse
        .errors
        .iter()
        .map(|e| syntax_diagnostic(doc, e))
        .collect();

    let (symbols, semantic) = semantic::analyze_with_symbols(doc, &parse);
    diagnostics.extend(semantic);

    DocumentAnalysis {
        parse,
        symbols,
        diagnostics,
    }
}

/// Convert a syntax error; the range runs to the end of the line's text.
fn syntax_diagnostic(doc: &Document, error: &SyntaxError) -> Diagnostic {
    let line_len = doc
        .line(error.line)
        .map(|l| l.trim_end().chars().count())
        .unwrap_or(error.column);
    let end = line_len.max(error.column + 1);
    let range = Range::new(
        Position::new(error.line as u32, error.column as u32),
        Position::new(error.line as u32, end as u32),
    );
    Diagnostic::error(DiagnosticOrigin::Syntax, range, error.message.clone())
        .with_code("syntax")
        .with_byte_range(doc.byte_range(&range))
}
