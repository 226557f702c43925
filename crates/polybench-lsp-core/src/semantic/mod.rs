//! Semantic analysis: key validation and symbol cross-referencing.
//!
//! Two passes over a structurally parsed document:
//!
//! 1. Key validation checks every `name: value` line against the keys its
//!    enclosing suite, fixture or bench allows, suggesting the closest valid
//!    key when one is near enough.
//! 2. Cross-referencing collects fixtures, bench calls and the names each
//!    setup block makes callable, then reports unknown callees, unknown
//!    fixture arguments, and declarations nothing uses.

pub mod calls;
pub mod keys;
mod references;
pub mod setup;
mod walker;

pub use calls::CallArgument;
pub use keys::{KeyContext, closest_key};
pub use setup::{SetupSymbol, SetupSymbolKind};
pub use walker::{Bench, BenchCall, Fixture};

use crate::document::Document;
use crate::parser::{BlockKind, ParseResult};
use crate::types::{Diagnostic, DiagnosticOrigin, Language, Range};
use serde::{Deserialize, Serialize};

/// Everything the cross-reference pass knows about a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    pub fixtures: Vec<Fixture>,
    pub benches: Vec<Bench>,
    pub calls: Vec<BenchCall>,
    /// Names provided by closed setup blocks, in document order.
    pub setup_symbols: Vec<SetupSymbol>,
}

impl SymbolTable {
    pub fn setup_names(&self, language: Language) -> impl Iterator<Item = &str> {
        self.setup_symbols
            .iter()
            .filter(move |s| s.language == language)
            .map(|s| s.name.as_str())
    }

    /// Names a bench call in `language` may pass as an argument.
    pub fn fixture_names(&self, language: Language) -> Vec<String> {
        let mut names: Vec<String> = self.fixtures.iter().map(|f| f.name.clone()).collect();
        if language.accepts_hex_alias() {
            names.extend(
                self.fixtures
                    .iter()
                    .filter(|f| f.has_primary_data)
                    .map(|f| format!("{}_hex", f.name)),
            );
        }
        names.sort();
        names.dedup();
        names
    }
}

/// Run both semantic passes.
pub fn analyze(document: &Document, parse: &ParseResult) -> Vec<Diagnostic> {
    analyze_with_symbols(document, parse).1
}

/// Run both semantic passes, also returning the symbol table.
pub fn analyze_with_symbols(
    document: &Document,
    parse: &ParseResult,
) -> (SymbolTable, Vec<Diagnostic>) {
    let (symbols, keys) = build_table(document, parse);
    let mut diagnostics = key_diagnostics(document, &keys);
    diagnostics.extend(references::check(document, parse, &symbols));
    (symbols, diagnostics)
}

fn build_table(document: &Document, parse: &ParseResult) -> (SymbolTable, Vec<walker::KeyLine>) {
    let outline = walker::walk(document);
    let setup_symbols = parse
        .embedded
        .iter()
        .filter(|b| b.kind == BlockKind::Setup)
        .flat_map(|b| setup::extract_setup_symbols(document, b))
        .collect();

    let table = SymbolTable {
        fixtures: outline.fixtures,
        benches: outline.benches,
        calls: outline.calls,
        setup_symbols,
    };
    (table, outline.keys)
}

fn key_diagnostics(document: &Document, keys: &[walker::KeyLine]) -> Vec<Diagnostic> {
    keys.iter()
        .filter_map(|k| {
            let message = keys::unknown_key_message(&k.key, k.context)?;
            Some(token_error(
                document,
                k.line,
                k.column,
                k.key.chars().count(),
                message,
                "unknown-key",
            ))
        })
        .collect()
}

pub(crate) fn token_error(
    document: &Document,
    line: usize,
    column: usize,
    len: usize,
    message: String,
    code: &str,
) -> Diagnostic {
    let range = Range::on_line(line, column, len);
    Diagnostic::error(DiagnosticOrigin::Semantic, range, message)
        .with_code(code)
        .with_byte_range(document.byte_range(&range))
}

pub(crate) fn token_warning(
    document: &Document,
    line: usize,
    column: usize,
    len: usize,
    message: String,
    code: &str,
) -> Diagnostic {
    let range = Range::on_line(line, column, len);
    Diagnostic::warning(DiagnosticOrigin::Semantic, range, message)
        .with_code(code)
        .with_byte_range(document.byte_range(&range))
}
