//! Parsing of single-expression bench lines (`go: run(data, other)`).

use crate::parser::scan::char_column;
use serde::{Deserialize, Serialize};

/// One argument of a bench call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallArgument {
    pub text: String,
    /// Character column in the document line.
    pub column: usize,
}

impl CallArgument {
    /// Only bare identifiers are checked against fixtures.
    pub fn is_identifier(&self) -> bool {
        is_identifier(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedCall {
    pub raw: String,
    pub callee: String,
    pub callee_column: usize,
    pub arguments: Vec<CallArgument>,
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse `IDENT(args)` starting at byte `expr_start` of `line`.
///
/// Returns None for any other shape: a callee that is not a bare
/// identifier, trailing text after the closing parenthesis, or unbalanced
/// parentheses.
pub(crate) fn parse_call(line: &str, expr_start: usize) -> Option<ParsedCall> {
    let expr = line.get(expr_start..)?.trim_end();
    let open = expr.find('(')?;
    let callee = &expr[..open];
    if !is_identifier(callee) {
        return None;
    }
    let close = matching_paren(expr, open)?;
    if close != expr.len() - 1 {
        return None;
    }

    let inner_start = expr_start + open + 1;
    let inner = &expr[open + 1..close];
    let arguments = split_top_level(inner)
        .into_iter()
        .filter_map(|(start, segment)| {
            let text = segment.trim();
            if text.is_empty() {
                return None;
            }
            let lead = segment.len() - segment.trim_start().len();
            Some(CallArgument {
                text: text.to_string(),
                column: char_column(line, inner_start + start + lead),
            })
        })
        .collect();

    Some(ParsedCall {
        raw: expr.to_string(),
        callee: callee.to_string(),
        callee_column: char_column(line, expr_start),
        arguments,
    })
}

/// Byte index of the parenthesis closing the one at `open`.
fn matching_paren(expr: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in expr[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are outside brackets and strings.
pub(crate) fn split_top_level(inner: &str) -> Vec<(usize, &str)> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in inner.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push((start, &inner[start..idx]));
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push((start, &inner[start..]));
    segments
}
