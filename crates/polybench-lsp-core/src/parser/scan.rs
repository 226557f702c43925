//! Line-level scanning helpers.

/// A brace found outside any quoted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brace {
    /// Character column within the line.
    pub column: usize,
    pub open: bool,
}

/// Find every `{` and `}` of a line that is not inside a single- or
/// double-quoted string. A backslash escapes the next character inside a
/// string. Quotes never span lines.
pub fn unquoted_braces(line: &str) -> Vec<Brace> {
    let mut braces = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = line.chars().enumerate();

    while let Some((column, c)) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => braces.push(Brace { column, open: true }),
            '}' => braces.push(Brace {
                column,
                open: false,
            }),
            _ => {}
        }
    }
    braces
}

/// Leading whitespace of a line.
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Width of the indentation in characters.
pub fn indent_width(line: &str) -> usize {
    indentation(line).chars().count()
}

/// A line consisting of a lone `}` (surrounding whitespace allowed).
pub fn is_lone_close(line: &str) -> bool {
    line.trim() == "}"
}

/// A lone `}` whose indentation is exactly `indent`.
pub fn closes_block(line: &str, indent: &str) -> bool {
    is_lone_close(line) && indentation(line) == indent
}

/// Character column of a byte index within a line.
pub fn char_column(line: &str, byte_idx: usize) -> usize {
    line.get(..byte_idx)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(0)
}
