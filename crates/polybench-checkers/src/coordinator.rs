//! Runs the foreign checkers over a whole document.

use std::collections::HashSet;
use std::sync::LazyLock;

use polybench_lsp_core::{
    BlockKind, Diagnostic, DocumentAnalysis, EmbeddedBlock, Language, ParseResult, SymbolTable,
};
use regex::Regex;

use crate::checker::ForeignChecker;
use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::go::GoChecker;
use crate::rust::RustChecker;
use crate::typescript::TypeScriptChecker;

static UNDEFINED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"undefined: ([A-Za-z_]\w*)|Cannot find name '([A-Za-z_$][\w$]*)'|cannot find (?:value|function|type) `([A-Za-z_]\w*)`|use of undeclared (?:type|crate or module) `([A-Za-z_]\w*)`",
    )
    .expect("Invalid regex pattern for undefined names")
});

static GO_IMPORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:import[ \t]+)?(?:([A-Za-z_]\w*|\.)[ \t]+)?"([^"]+)"[ \t]*$"#)
        .expect("Invalid regex pattern for Go imports")
});

static RUST_USE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?use\s+([^;]+);")
        .expect("Invalid regex pattern for Rust use")
});

/// An owned set of checkers plus the configuration they run with.
pub struct ForeignCheckers {
    config: CheckerConfig,
    checkers: Vec<Box<dyn ForeignChecker>>,
}

impl std::fmt::Debug for ForeignCheckers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignCheckers")
            .field("config", &self.config)
            .field(
                "checkers",
                &self.checkers.iter().map(|c| c.language()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ForeignCheckers {
    /// The Go, TypeScript and Rust checkers.
    pub fn new(config: CheckerConfig) -> Self {
        Self::with_checkers(
            config,
            vec![
                Box::new(GoChecker::new()),
                Box::new(TypeScriptChecker::new()),
                Box::new(RustChecker::new()),
            ],
        )
    }

    pub fn with_checkers(config: CheckerConfig, checkers: Vec<Box<dyn ForeignChecker>>) -> Self {
        Self { config, checkers }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn checker_for(&self, language: Language) -> Option<&dyn ForeignChecker> {
        self.checkers
            .iter()
            .find(|c| c.language() == language)
            .map(|c| c.as_ref())
    }

    /// Check one block with its language's checker and configured root.
    ///
    /// Disabled languages and languages without a checker yield nothing.
    pub fn check_block(&self, block: &EmbeddedBlock) -> Result<Vec<Diagnostic>, CheckError> {
        if !self.config.is_enabled(block.language) {
            return Ok(Vec::new());
        }
        let Some(checker) = self.checker_for(block.language) else {
            return Ok(Vec::new());
        };
        checker.check(block, self.config.root_for(block.language))
    }

    /// Check every embedded block of an analyzed document.
    ///
    /// Blocks are independent: one that cannot be checked is logged and
    /// skipped. Complaints about names the benchmark harness provides
    /// (fixtures and setup declarations) are dropped.
    pub fn check_document(&self, analysis: &DocumentAnalysis) -> Vec<Diagnostic> {
        self.check_blocks(&analysis.parse, &analysis.symbols)
    }

    pub fn check_blocks(&self, parse: &ParseResult, symbols: &SymbolTable) -> Vec<Diagnostic> {
        let mut provided: Vec<(Language, HashSet<String>)> = Vec::new();
        let mut diagnostics = Vec::new();

        for block in &parse.embedded {
            let found = match self.check_block(block) {
                Ok(found) => found,
                Err(error) => {
                    tracing::warn!(
                        language = block.language.display_name(),
                        line = block.start_line + 1,
                        %error,
                        "could not check block"
                    );
                    continue;
                }
            };
            if found.is_empty() {
                continue;
            }

            let names = match provided.iter().position(|(l, _)| *l == block.language) {
                Some(idx) => &provided[idx].1,
                None => {
                    provided.push((block.language, harness_names(block.language, parse, symbols)));
                    &provided[provided.len() - 1].1
                }
            };
            diagnostics.extend(found.into_iter().filter(|d| {
                let keep = !names_provided_value(&d.message, names);
                if !keep {
                    tracing::debug!(message = %d.message, "dropped harness-provided name");
                }
                keep
            }));
        }

        diagnostics
    }
}

/// Whether a diagnostic only complains that a harness-provided name is
/// undefined.
fn names_provided_value(message: &str, names: &HashSet<String>) -> bool {
    let Some(caps) = UNDEFINED_NAME.captures(message) else {
        return false;
    };
    caps.iter()
        .skip(1)
        .flatten()
        .any(|m| names.contains(m.as_str()))
}

/// Names that exist when the harness assembles the benchmark but not in an
/// isolated unit: fixtures (and their `_hex` forms) and whatever the
/// language's setup blocks declare or import.
pub fn harness_names(language: Language, parse: &ParseResult, symbols: &SymbolTable) -> HashSet<String> {
    let mut names: HashSet<String> = HashSet::new();
    for fixture in &symbols.fixtures {
        names.insert(fixture.name.clone());
        names.insert(format!("{}_hex", fixture.name));
    }
    names.extend(symbols.setup_names(language).map(str::to_string));

    for block in parse.blocks_of(language).filter(|b| b.kind == BlockKind::Setup) {
        match language {
            Language::Go => names.extend(go_import_names(&block.source)),
            Language::Rust => names.extend(rust_use_names(&block.source)),
            Language::TypeScript => {}
        }
    }
    names
}

/// Package names a Go import block brings into scope.
fn go_import_names(source: &str) -> Vec<String> {
    GO_IMPORT_SPEC
        .captures_iter(source)
        .filter_map(|caps| {
            if let Some(alias) = caps.get(1) {
                let alias = alias.as_str();
                return (alias != "." && alias != "_").then(|| alias.to_string());
            }
            let path = caps.get(2)?.as_str();
            let mut segments = path.rsplit('/');
            let last = segments.next()?;
            // major version suffixes are not part of the package name
            let is_version = last.len() > 1
                && last.starts_with('v')
                && last[1..].chars().all(|c| c.is_ascii_digit());
            let name = if is_version {
                segments.next().unwrap_or(last)
            } else {
                last
            };
            Some(name.replace('-', "_"))
        })
        .collect()
}

/// Final segments (or `as` aliases) of Rust `use` declarations.
fn rust_use_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in RUST_USE.captures_iter(source) {
        let Some(tree) = caps.get(1) else {
            continue;
        };
        for item in tree.as_str().split(['{', '}', ',']) {
            let item = item.trim();
            let name = match item.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => item.rsplit("::").next().unwrap_or(item).trim(),
            };
            if !name.is_empty() && name != "self" && name != "*" && name != "_" {
                names.push(name.to_string());
            }
        }
    }
    names
}
