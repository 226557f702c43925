//! Line walk collecting fixtures, benches, bench calls and keyed lines.
//!
//! Uses the structural parser's marker recognition and closing rules with a
//! lighter context stack that only remembers what each open frame is.

use super::calls::{CallArgument, parse_call, split_top_level};
use super::keys::KeyContext;
use crate::document::Document;
use crate::parser::marker::{InlineFixture, Marker, MarkerKind};
use crate::parser::scan;
use crate::types::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*:\s*").expect("Invalid regex pattern for keys")
});

/// A `fixture NAME {` or one-line `fixture NAME { ... }` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,
    /// A `hex:` key sits directly in the fixture body.
    pub has_primary_data: bool,
    pub declaration_line: usize,
    pub name_column: usize,
    /// Languages with a `LANG: {` block or `LANG:` line in the body.
    pub implementations: Vec<Language>,
    /// Index of the enclosing suite in document order.
    pub suite: Option<usize>,
}

/// A `bench NAME {` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bench {
    pub name: String,
    pub declaration_line: usize,
    pub name_column: usize,
    pub implementations: Vec<Language>,
    /// Every `LANG: EXPR` line of the body, parsed as a call or not.
    pub expressions: Vec<(Language, String)>,
    pub suite: Option<usize>,
}

/// A single-expression bench line such as `go: hashIt(data)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchCall {
    pub bench_name: String,
    pub language: Language,
    pub raw_expression: String,
    pub callee: String,
    pub callee_column: usize,
    pub arguments: Vec<CallArgument>,
    pub line: usize,
}

/// A `name: value` line outside any language block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyLine {
    pub context: KeyContext,
    pub key: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Outline {
    pub fixtures: Vec<Fixture>,
    pub benches: Vec<Bench>,
    pub calls: Vec<BenchCall>,
    pub keys: Vec<KeyLine>,
}

#[derive(Debug)]
enum Context {
    Suite,
    Setup,
    Fixture(usize),
    Bench(usize),
    /// A fixture or bench outside a suite; the parser reports it.
    Misplaced,
    Block,
}

impl Context {
    fn is_container(&self) -> bool {
        matches!(
            self,
            Context::Suite | Context::Fixture(_) | Context::Bench(_) | Context::Misplaced
        )
    }
}

pub(crate) fn walk(document: &Document) -> Outline {
    let mut outline = Outline::default();
    // (context, indent); indent only matters for language blocks
    let mut stack: Vec<(Context, String)> = Vec::new();
    let mut suites = 0usize;

    for row in 0..document.line_count() {
        let Some(line) = document.line(row) else {
            continue;
        };

        for _ in scan::unquoted_braces(line).iter().filter(|b| !b.open) {
            let Some((top, indent)) = stack.last() else {
                continue;
            };
            let closes = if top.is_container() {
                scan::is_lone_close(line)
            } else {
                scan::closes_block(line, indent)
            };
            if closes {
                stack.pop();
            }
        }

        if matches!(stack.last(), Some((Context::Setup | Context::Block, _))) {
            continue;
        }

        let indent = scan::indentation(line).to_string();
        let current_suite = suites.checked_sub(1);
        let in_suite = matches!(stack.last(), Some((Context::Suite, _)));

        if let Some(inline) = InlineFixture::parse(line) {
            if in_suite {
                outline.add_inline_fixture(row, line, &inline, current_suite);
            }
            continue;
        }

        if let Some(marker) = Marker::parse(line) {
            let context = match marker.kind {
                MarkerKind::Fixture | MarkerKind::Bench if !in_suite => Context::Misplaced,
                MarkerKind::Suite => {
                    suites += 1;
                    Context::Suite
                }
                MarkerKind::Setup => Context::Setup,
                MarkerKind::Fixture => {
                    outline.fixtures.push(Fixture {
                        name: marker.name.to_string(),
                        has_primary_data: false,
                        declaration_line: row,
                        name_column: marker.name_column,
                        implementations: Vec::new(),
                        suite: current_suite,
                    });
                    Context::Fixture(outline.fixtures.len() - 1)
                }
                MarkerKind::Bench => {
                    outline.benches.push(Bench {
                        name: marker.name.to_string(),
                        declaration_line: row,
                        name_column: marker.name_column,
                        implementations: Vec::new(),
                        expressions: Vec::new(),
                        suite: current_suite,
                    });
                    Context::Bench(outline.benches.len() - 1)
                }
                MarkerKind::LanguageBlock => {
                    if let Some(language) = Language::from_marker(marker.name) {
                        outline.add_implementation(stack.last().map(|(c, _)| c), language);
                    }
                    Context::Block
                }
            };
            stack.push((context, indent));
            continue;
        }

        let Some(caps) = KEY_PATTERN.captures(line) else {
            continue;
        };
        let (Some(key), Some(whole)) = (caps.get(1), caps.get(0)) else {
            continue;
        };
        let context = match stack.last() {
            Some((Context::Suite, _)) => KeyContext::Suite,
            Some((Context::Fixture(_), _)) => KeyContext::Fixture,
            Some((Context::Bench(_), _)) => KeyContext::Bench,
            _ => continue,
        };
        outline.keys.push(KeyLine {
            context,
            key: key.as_str().to_string(),
            line: row,
            column: scan::char_column(line, key.start()),
        });

        match stack.last() {
            Some((Context::Fixture(idx), _)) if key.as_str() == "hex" => {
                outline.fixtures[*idx].has_primary_data = true;
            }
            Some((Context::Bench(idx), _)) => {
                let idx = *idx;
                if let Some(language) = Language::from_marker(key.as_str()) {
                    outline.add_implementation(stack.last().map(|(c, _)| c), language);
                    let expression = line[whole.end()..].trim_end().to_string();
                    outline.benches[idx].expressions.push((language, expression));
                    if let Some(call) = parse_call(line, whole.end()) {
                        outline.calls.push(BenchCall {
                            bench_name: outline.benches[idx].name.clone(),
                            language,
                            raw_expression: call.raw,
                            callee: call.callee,
                            callee_column: call.callee_column,
                            arguments: call.arguments,
                            line: row,
                        });
                    }
                }
            }
            Some((Context::Fixture(_), _)) => {
                if let Some(language) = Language::from_marker(key.as_str()) {
                    outline.add_implementation(stack.last().map(|(c, _)| c), language);
                }
            }
            _ => {}
        }
    }

    outline
}

impl Outline {
    fn add_inline_fixture(
        &mut self,
        row: usize,
        line: &str,
        inline: &InlineFixture<'_>,
        suite: Option<usize>,
    ) {
        let mut fixture = Fixture {
            name: inline.name.to_string(),
            has_primary_data: false,
            declaration_line: row,
            name_column: inline.name_column,
            implementations: Vec::new(),
            suite,
        };
        for (start, segment) in split_top_level(inline.body) {
            let Some(key) = KEY_PATTERN.captures(segment).and_then(|caps| caps.get(1)) else {
                continue;
            };
            let name = key.as_str();
            if name == "hex" {
                fixture.has_primary_data = true;
            } else if let Some(language) = Language::from_marker(name)
                && !fixture.implementations.contains(&language)
            {
                fixture.implementations.push(language);
            }
            self.keys.push(KeyLine {
                context: KeyContext::Fixture,
                key: name.to_string(),
                line: row,
                column: scan::char_column(line, inline.body_start + start + key.start()),
            });
        }
        self.fixtures.push(fixture);
    }

    fn add_implementation(&mut self, parent: Option<&Context>, language: Language) {
        let implementations = match parent {
            Some(Context::Fixture(idx)) => &mut self.fixtures[*idx].implementations,
            Some(Context::Bench(idx)) => &mut self.benches[*idx].implementations,
            _ => return,
        };
        if !implementations.contains(&language) {
            implementations.push(language);
        }
    }
}
