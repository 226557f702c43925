//! Cross-reference diagnostics over a collected symbol table.

use super::setup::SetupSymbolKind;
use super::{SymbolTable, keys, token_error, token_warning};
use crate::document::Document;
use crate::parser::{BlockKind, ParseResult};
use crate::types::{Diagnostic, Language};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static IDENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("Invalid regex pattern for identifiers")
});

/// Stretches of `text` outside comments and string literals.
///
/// `//` and `/* */` comments are skipped in every language. Double quotes
/// delimit strings everywhere; backticks and single quotes only in Go and
/// TypeScript, since a Rust `'` may start a lifetime.
fn code_segments(language: Language, text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let next = bytes.get(idx + 1).copied();
        let skip_to = match bytes[idx] {
            b'/' if next == Some(b'/') => Some(
                text[idx..]
                    .find('\n')
                    .map_or(bytes.len(), |offset| idx + offset),
            ),
            b'/' if next == Some(b'*') => Some(
                text[idx + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |offset| idx + 2 + offset + 2),
            ),
            b'"' => Some(string_end(bytes, idx, false)),
            b'`' if language != Language::Rust => Some(string_end(bytes, idx, true)),
            b'\'' if language != Language::Rust => Some(string_end(bytes, idx, false)),
            _ => None,
        };
        match skip_to {
            Some(end) => {
                segments.push(&text[start..idx]);
                start = end;
                idx = end;
            }
            None => idx += 1,
        }
    }
    segments.push(&text[start..]);
    segments
}

/// Index just past the string opened at `open`. Unterminated strings stop at
/// the end of the line unless they may span lines.
fn string_end(bytes: &[u8], open: usize, multiline: bool) -> usize {
    let quote = bytes[open];
    let mut idx = open + 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if quote != b'`' => idx += 2,
            b'\n' if !multiline => return idx,
            c if c == quote => return idx + 1,
            _ => idx += 1,
        }
    }
    bytes.len()
}

/// Identifiers used by bench and fixture code, per language.
#[derive(Debug, Default)]
struct Mentions<'a> {
    by_language: Vec<(Language, HashSet<&'a str>)>,
}

impl<'a> Mentions<'a> {
    fn add(&mut self, language: Language, text: &'a str) {
        let idx = match self.by_language.iter().position(|(l, _)| *l == language) {
            Some(idx) => idx,
            None => {
                self.by_language.push((language, HashSet::new()));
                self.by_language.len() - 1
            }
        };
        for segment in code_segments(language, text) {
            self.by_language[idx]
                .1
                .extend(IDENT_PATTERN.find_iter(segment).map(|m| m.as_str()));
        }
    }

    fn contains(&self, language: Language, name: &str) -> bool {
        self.by_language
            .iter()
            .any(|(l, names)| *l == language && names.contains(name))
    }

    fn contains_any(&self, name: &str) -> bool {
        self.by_language.iter().any(|(_, names)| names.contains(name))
    }
}

pub(super) fn check(
    document: &Document,
    parse: &ParseResult,
    symbols: &SymbolTable,
) -> Vec<Diagnostic> {
    let mut diagnostics = declaration_checks(document, symbols);

    // Bench code (inline expressions and bench blocks) references fixtures;
    // bench and fixture code may both call setup helpers.
    let mut bench_mentions = Mentions::default();
    let mut helper_mentions = Mentions::default();
    for bench in &symbols.benches {
        for (language, expression) in &bench.expressions {
            bench_mentions.add(*language, expression);
            helper_mentions.add(*language, expression);
        }
    }
    for block in &parse.embedded {
        match block.kind {
            BlockKind::Bench => {
                bench_mentions.add(block.language, &block.source);
                helper_mentions.add(block.language, &block.source);
            }
            BlockKind::Fixture => helper_mentions.add(block.language, &block.source),
            BlockKind::Setup => {}
        }
    }

    let mut used_setup: HashSet<(Language, &str)> = HashSet::new();

    for call in &symbols.calls {
        let mut names: Vec<&str> = symbols.setup_names(call.language).collect();
        names.sort_unstable();
        names.dedup();

        if names.contains(&call.callee.as_str()) {
            used_setup.insert((call.language, call.callee.as_str()));
        } else {
            let hint = match keys::closest_key(&call.callee, names.iter().copied()) {
                Some(suggestion) => format!(" Did you mean '{}'?", suggestion),
                None if !names.is_empty() => format!(" Available: {}.", names.join(", ")),
                None => format!(" No functions defined in setup {}.", call.language),
            };
            diagnostics.push(token_error(
                document,
                call.line,
                call.callee_column,
                call.callee.chars().count(),
                format!(
                    "Unknown function '{}' in bench '{}'.{}",
                    call.callee, call.bench_name, hint
                ),
                "unknown-function",
            ));
        }

        let valid = symbols.fixture_names(call.language);
        for argument in call.arguments.iter().filter(|a| a.is_identifier()) {
            if valid.contains(&argument.text) {
                continue;
            }
            let available = if valid.is_empty() {
                "none".to_string()
            } else {
                valid.join(", ")
            };
            diagnostics.push(token_error(
                document,
                call.line,
                argument.column,
                argument.text.chars().count(),
                format!(
                    "Unknown fixture or variable '{}'. Available: {}.",
                    argument.text, available
                ),
                "unknown-argument",
            ));
        }
    }

    for symbol in &symbols.setup_symbols {
        let name = symbol.name.as_str();
        if used_setup.contains(&(symbol.language, name))
            || helper_mentions.contains(symbol.language, name)
        {
            continue;
        }
        let message = match symbol.kind {
            SetupSymbolKind::Function => format!(
                "Function '{}' is defined in setup {} but never used in any bench",
                name, symbol.language
            ),
            SetupSymbolKind::Import => format!(
                "'{}' is imported in setup {} but never used in any bench",
                name, symbol.language
            ),
        };
        diagnostics.push(token_warning(
            document,
            symbol.line,
            symbol.column,
            name.chars().count(),
            message,
            "unused-setup",
        ));
    }

    for fixture in &symbols.fixtures {
        let hex_alias = format!("{}_hex", fixture.name);
        if bench_mentions.contains_any(&fixture.name) || bench_mentions.contains_any(&hex_alias) {
            continue;
        }
        diagnostics.push(token_warning(
            document,
            fixture.declaration_line,
            fixture.name_column,
            fixture.name.chars().count(),
            format!("Fixture '{}' is never referenced", fixture.name),
            "unused-fixture",
        ));
    }

    diagnostics
}

/// Duplicate names, fixtures without data and benches without bodies.
fn declaration_checks(document: &Document, symbols: &SymbolTable) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut seen = HashSet::new();
    for fixture in &symbols.fixtures {
        let len = fixture.name.chars().count();
        if !seen.insert((fixture.suite, fixture.name.as_str())) {
            diagnostics.push(token_error(
                document,
                fixture.declaration_line,
                fixture.name_column,
                len,
                format!("Duplicate fixture '{}'", fixture.name),
                "duplicate-fixture",
            ));
        }
        if !fixture.has_primary_data && fixture.implementations.is_empty() {
            diagnostics.push(token_error(
                document,
                fixture.declaration_line,
                fixture.name_column,
                len,
                format!(
                    "Fixture '{}' has no hex data or language implementations",
                    fixture.name
                ),
                "fixture-no-data",
            ));
        }
    }

    let mut seen = HashSet::new();
    for bench in &symbols.benches {
        let len = bench.name.chars().count();
        if !seen.insert((bench.suite, bench.name.as_str())) {
            diagnostics.push(token_error(
                document,
                bench.declaration_line,
                bench.name_column,
                len,
                format!("Duplicate bench '{}'", bench.name),
                "duplicate-bench",
            ));
        }
        if bench.implementations.is_empty() {
            diagnostics.push(token_warning(
                document,
                bench.declaration_line,
                bench.name_column,
                len,
                format!("Bench '{}' has no language implementations", bench.name),
                "empty-bench",
            ));
        }
    }

    diagnostics
}
