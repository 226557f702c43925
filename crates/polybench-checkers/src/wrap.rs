//! Synthetic compilation units around embedded blocks.
//!
//! A block is rarely a complete program: a Go bench body is a statement
//! list, a fixture body is a function body. Each language gets a minimal
//! wrapper that makes the block compile on its own. The block text is
//! inserted verbatim so positions inside it stay byte-exact; only the
//! header shifts them, by `header_lines` lines and `header_bytes` bytes.

use polybench_lsp_core::{BlockKind, EmbeddedBlock, Language};
use polybench_source_map::FragmentMap;
use regex::Regex;
use std::sync::LazyLock;

/// Name of the function wrapping fixture bodies.
pub const FIXTURE_FN: &str = "__fixture";
/// Name of the function wrapping Rust bench bodies.
pub const RUST_BENCH_FN: &str = "__bench_main";

static GO_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s+[A-Za-z_]\w*").expect("Invalid regex pattern for Go package")
});

static GO_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*func\s").expect("Invalid regex pattern for Go func")
});

static GO_MAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*func\s+main\s*\(").expect("Invalid regex pattern for Go main")
});

static RUST_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(pub(\([^)]*\))?\s+)?((const|async|unsafe|extern\s+"[^"]*")\s+)*fn\s+[A-Za-z_]"#)
        .expect("Invalid regex pattern for Rust fn")
});

/// A block embedded in a compilable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedUnit {
    pub source: String,
    /// Lines injected before the block text.
    pub header_lines: usize,
    /// Bytes injected before the block text.
    pub header_bytes: usize,
}

impl WrappedUnit {
    fn new(header: &str, body: &str, footer: &str) -> Self {
        let mut source = String::with_capacity(header.len() + body.len() + footer.len() + 1);
        source.push_str(header);
        source.push_str(body);
        if !footer.is_empty() && !body.is_empty() && !body.ends_with('\n') {
            source.push('\n');
        }
        source.push_str(footer);
        Self {
            source,
            header_lines: header.matches('\n').count(),
            header_bytes: header.len(),
        }
    }

    fn unwrapped(body: &str) -> Self {
        Self::new("", body, "")
    }

    /// Position map from this unit back to the block's document.
    pub fn fragment_map<'a>(&self, block: &'a EmbeddedBlock) -> FragmentMap<'a> {
        FragmentMap::new(
            &block.source,
            block.start_offset,
            block.start_line,
            self.header_lines,
            self.header_bytes,
        )
    }
}

/// Wrap a block according to its language and kind.
pub fn wrap(block: &EmbeddedBlock) -> WrappedUnit {
    match block.language {
        Language::Go => wrap_go(block.kind, &block.source),
        Language::TypeScript => wrap_typescript(block.kind, &block.source),
        Language::Rust => wrap_rust(block.kind, &block.source),
    }
}

/// Go units are always `package main`; a `func main` is appended when the
/// block does not declare one so the build links. Setup blocks hold
/// package-level declarations and are never placed inside a function.
pub fn wrap_go(kind: BlockKind, source: &str) -> WrappedUnit {
    const PACKAGE: &str = "package main\n\n";
    let needs_main = if GO_MAIN.is_match(source) {
        ""
    } else {
        "\nfunc main() {}\n"
    };

    if kind == BlockKind::Fixture {
        let header = format!("{}func {}() []byte {{\n", PACKAGE, FIXTURE_FN);
        return WrappedUnit::new(&header, source, &format!("}}\n{}", needs_main));
    }
    let has_func = GO_FUNC.is_match(source);
    if has_func && GO_PACKAGE.is_match(source) {
        WrappedUnit::unwrapped(source)
    } else if has_func || kind == BlockKind::Setup {
        WrappedUnit::new(PACKAGE, source, needs_main)
    } else {
        WrappedUnit::new("package main\n\nfunc main() {\n", source, "}\n")
    }
}

/// TypeScript blocks are modules already; fixture bodies become a function.
pub fn wrap_typescript(kind: BlockKind, source: &str) -> WrappedUnit {
    if kind == BlockKind::Fixture {
        let header = format!("function {}(): Uint8Array {{\n", FIXTURE_FN);
        WrappedUnit::new(&header, source, "}\n")
    } else {
        WrappedUnit::unwrapped(source)
    }
}

/// Rust units are library crates; unused helpers and imports are expected.
pub fn wrap_rust(kind: BlockKind, source: &str) -> WrappedUnit {
    const ATTRS: &str = "#![allow(dead_code, unused_imports)]\n";
    if kind == BlockKind::Fixture {
        let header = format!("{}fn {}() -> Vec<u8> {{\n", ATTRS, FIXTURE_FN);
        WrappedUnit::new(&header, source, "}\n")
    } else if RUST_FN.is_match(source) {
        WrappedUnit::new(ATTRS, source, "")
    } else {
        let header = format!("{}fn {}() {{\n", ATTRS, RUST_BENCH_FN);
        WrappedUnit::new(&header, source, "}\n")
    }
}
