//! Lightweight extraction of the names a setup block makes callable.
//!
//! - Go: top-level `func NAME(` declarations (methods have a receiver and
//!   are not matched)
//! - Rust: top-level `fn NAME` with any visibility or qualifiers
//! - TypeScript: import bindings plus top-level `function NAME`

use crate::document::Document;
use crate::parser::EmbeddedBlock;
use crate::types::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static GO_FUNC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)func\s+([A-Za-z_][A-Za-z0-9_]*)\s*[\(\[]")
        .expect("Invalid regex pattern for Go functions")
});

static RUST_FN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^([ \t]*)(?:pub(?:\s*\([^)]*\))?\s+)?(?:(?:const|async|unsafe)\s+)*(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)"#,
    )
    .expect("Invalid regex pattern for Rust functions")
});

static TS_FUNCTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^([ \t]*)(?:export\s+)?(?:default\s+)?(?:async\s+)?function\b\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .expect("Invalid regex pattern for TypeScript functions")
});

/// `import CLAUSE from '...'`; the clause may span lines.
static TS_IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(type\s+)?([^;'"]+?)\s*\bfrom\s*['"]"#)
        .expect("Invalid regex pattern for TypeScript imports")
});

static TS_IDENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("Invalid regex pattern for identifiers")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupSymbolKind {
    Function,
    Import,
}

/// A name a setup block makes callable from benches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupSymbol {
    pub name: String,
    pub language: Language,
    pub kind: SetupSymbolKind,
    /// Declaration position in the document.
    pub line: usize,
    pub column: usize,
}

/// Extract the callable names declared by a setup block.
pub fn extract_setup_symbols(document: &Document, block: &EmbeddedBlock) -> Vec<SetupSymbol> {
    let source = block.source.as_str();
    let base = base_indent(source);
    let mut found: Vec<(usize, &str, SetupSymbolKind)> = Vec::new();

    let function_pattern = match block.language {
        Language::Go => &*GO_FUNC_PATTERN,
        Language::Rust => &*RUST_FN_PATTERN,
        Language::TypeScript => &*TS_FUNCTION_PATTERN,
    };
    for caps in function_pattern.captures_iter(source) {
        let (Some(indent), Some(name)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if indent.as_str().chars().count() == base {
            found.push((name.start(), name.as_str(), SetupSymbolKind::Function));
        }
    }

    if block.language == Language::TypeScript {
        for caps in TS_IMPORT_PATTERN.captures_iter(source) {
            if caps.get(1).is_some() {
                continue;
            }
            let Some(clause) = caps.get(2) else {
                continue;
            };
            for (offset, name) in import_bindings(clause.as_str()) {
                found.push((clause.start() + offset, name, SetupSymbolKind::Import));
            }
        }
    }

    found.sort_by_key(|(offset, _, _)| *offset);
    let mut symbols: Vec<SetupSymbol> = Vec::new();
    for (offset, name, kind) in found {
        if symbols.iter().any(|s| s.name == name) {
            continue;
        }
        let position = document.position_at(block.start_offset + offset);
        symbols.push(SetupSymbol {
            name: name.to_string(),
            language: block.language,
            kind,
            line: position.line as usize,
            column: position.character as usize,
        });
    }
    symbols
}

/// Local bindings introduced by an import clause, with byte offsets into it.
///
/// Every comma-separated specifier binds its last identifier: `a`,
/// `a as b`, `* as ns` and `default as d` all work that way. Specifiers
/// marked `type` bind nothing at runtime and are skipped.
fn import_bindings(clause: &str) -> Vec<(usize, &str)> {
    let mut bindings = Vec::new();
    let (head, named) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            (0, &clause[..open]),
            Some((open + 1, &clause[open + 1..close])),
        ),
        _ => ((0, clause), None),
    };

    for (base, part) in std::iter::once(head).chain(named) {
        let mut start = 0;
        for segment in part.split(',') {
            let tokens: Vec<_> = TS_IDENT_PATTERN.find_iter(segment).collect();
            let is_type_only = tokens.len() > 1 && tokens[0].as_str() == "type";
            if let Some(last) = tokens.last()
                && !is_type_only
            {
                bindings.push((base + start + last.start(), last.as_str()));
            }
            start += segment.len() + 1;
        }
    }
    bindings
}

/// Smallest indentation among non-blank lines, in characters.
fn base_indent(source: &str) -> usize {
    source
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn symbols(text: &str) -> Vec<(String, usize, usize, SetupSymbolKind)> {
        let doc = Document::new("t.bench", text);
        let result = parse(text);
        result
            .embedded
            .iter()
            .flat_map(|b| extract_setup_symbols(&doc, b))
            .map(|s| (s.name, s.line, s.column, s.kind))
            .collect()
    }

    #[test]
    fn test_go_functions_skip_methods() {
        let text = "suite s {\n  setup go {\n    type T struct{}\n    func (t T) method() {}\n    func helper(b []byte) int {\n      return 0\n    }\n    func Generic[T any](x T) {}\n  }\n}\n";
        assert_eq!(
            symbols(text),
            vec![
                ("helper".to_string(), 4, 9, SetupSymbolKind::Function),
                ("Generic".to_string(), 7, 9, SetupSymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_rust_functions_with_qualifiers() {
        let text = "suite s {\n  setup rust {\n    pub fn a() {}\n    pub(crate) async fn b() {}\n    const fn c() -> u8 { 0 }\n    impl X {\n        fn method(&self) {}\n    }\n  }\n}\n";
        let names: Vec<_> = symbols(text).into_iter().map(|s| s.0).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_typescript_imports() {
        let text = r#"suite s {
  setup ts {
    import { keccak256, toHex as hex, type Hash } from "viem";
    import sha from 'sha.js';
    import * as crypto from "node:crypto";
    import def, { named } from "mod";
    import type { Only } from "types";
    import {
      multi,
    } from "multi";
    export function local() {}
  }
}
"#;
        let names: Vec<_> = symbols(text)
            .into_iter()
            .map(|s| (s.0, s.1, s.2))
            .collect();
        assert_eq!(
            names,
            vec![
                ("keccak256".to_string(), 2, 13),
                ("hex".to_string(), 2, 33),
                ("sha".to_string(), 3, 11),
                ("crypto".to_string(), 4, 16),
                ("def".to_string(), 5, 11),
                ("named".to_string(), 5, 18),
                ("multi".to_string(), 8, 6),
                ("local".to_string(), 10, 20),
            ]
        );
    }
}
