/*
 * go.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Go checker.
 */

//! Go checker.
//!
//! Writes the wrapped block to `main.go` in a scratch workspace and runs
//! `go build -o <null device> ./main.go`. Inside a module root the scratch
//! directory sits under the module, so the block's imports resolve against
//! the project's `go.mod`.

use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use polybench_lsp_core::{BlockKind, Diagnostic, DiagnosticSeverity, EmbeddedBlock, Language};
use regex::Regex;

use crate::checker::{ForeignChecker, check_with};
use crate::error::CheckError;
use crate::output::{self, parse_located_lines};
use crate::toolchain::{self, GO};
use crate::workspace::ScratchWorkspace;
use crate::wrap::{self, WrappedUnit};

const UNIT_FILE: &str = "main.go";

static PACKAGE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#?\s*package\s+command-line-arguments\s*:\s*")
        .expect("Invalid regex pattern for Go package prefix")
});

static PACKAGE_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#?\s*command-line-arguments\s*$")
        .expect("Invalid regex pattern for Go package banner")
});

static MODULE_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)go\.mod file not found|no required module provides package|cannot find package|is not in std",
    )
    .expect("Invalid regex pattern for Go module noise")
});

/// Checks Go blocks with `go build`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoChecker;

impl GoChecker {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, block: &EmbeddedBlock, root: Option<&Path>) -> Result<Vec<Diagnostic>, CheckError> {
        let go = toolchain::require_tool(&GO)?;
        let unit = wrap::wrap_go(block.kind, &block.source);

        let scratch = ScratchWorkspace::create(root)?;
        scratch.write(UNIT_FILE, &unit.source)?;

        let mut command = Command::new(&go);
        command
            .arg("build")
            .arg("-o")
            .arg(toolchain::null_device())
            .arg(format!("./{}", UNIT_FILE));
        let result = toolchain::run(&GO, &mut command, scratch.path(), None)?;

        if result.success {
            return Ok(Vec::new());
        }
        Ok(diagnostics_from_output(
            block,
            &unit,
            &result.combined(),
            root.is_some(),
        ))
    }
}

impl ForeignChecker for GoChecker {
    fn language(&self) -> Language {
        Language::Go
    }

    fn check(
        &self,
        block: &EmbeddedBlock,
        root: Option<&Path>,
    ) -> Result<Vec<Diagnostic>, CheckError> {
        check_with(block, root, |resolved| self.run(block, resolved))
    }
}

/// Strip the synthetic package name from a message.
fn sanitize(message: &str) -> Option<String> {
    let stripped = PACKAGE_PREFIX.replace(message.trim(), "");
    if PACKAGE_BANNER.is_match(&stripped) {
        return None;
    }
    output::clean_message(&stripped)
}

fn is_noise(message: &str, in_module: bool, kind: BlockKind) -> bool {
    if !in_module && MODULE_NOISE.is_match(message) {
        return true;
    }
    // setup imports are used by bench blocks, which are checked separately
    kind == BlockKind::Setup && message.contains("imported and not used")
}

/// Turn a failed build's output into diagnostics on the block.
pub(crate) fn diagnostics_from_output(
    block: &EmbeddedBlock,
    unit: &WrappedUnit,
    text: &str,
    in_module: bool,
) -> Vec<Diagnostic> {
    let map = unit.fragment_map(block);
    let located = parse_located_lines(text);
    let mut diagnostics = Vec::new();

    for report in &located {
        if !report.file.ends_with(UNIT_FILE) {
            continue;
        }
        let Some(message) = sanitize(&report.message) else {
            continue;
        };
        if is_noise(&message, in_module, block.kind) {
            tracing::debug!(%message, "suppressed go noise");
            continue;
        }
        let Some(start) = map.map_line_column(
            report.line.saturating_sub(1),
            report.column.saturating_sub(1),
        ) else {
            tracing::debug!(line = report.line, %message, "go report outside the block");
            continue;
        };
        diagnostics.push(output::diagnostic_at(
            block,
            start,
            None,
            DiagnosticSeverity::Error,
            message,
        ));
    }

    if located.is_empty() {
        let summary = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .find_map(sanitize);
        if let Some(summary) = summary {
            if is_noise(&summary, in_module, block.kind) {
                tracing::debug!(%summary, "suppressed go noise");
            } else {
                diagnostics.push(output::block_start_diagnostic(
                    block,
                    DiagnosticSeverity::Error,
                    output::truncate_summary(&summary),
                ));
            }
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use polybench_lsp_core::Position;

    fn bench_block(source: &str) -> EmbeddedBlock {
        EmbeddedBlock {
            language: Language::Go,
            kind: BlockKind::Bench,
            owner: Some("b".to_string()),
            start_line: 8,
            end_line: 8 + source.lines().count() - 1,
            start_offset: 100,
            end_offset: 100 + source.len(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("# command-line-arguments"), None);
        assert_eq!(
            sanitize("package command-line-arguments: undefined: x"),
            Some("undefined: x".to_string())
        );
        assert_eq!(sanitize("   "), None);
    }

    #[test]
    fn test_located_report_maps_to_document() {
        let block = bench_block("      x := 1\n      y := z\n");
        let unit = wrap::wrap_go(block.kind, &block.source);
        // line 5 of main.go is the second block line
        let out = "# command-line-arguments\n./main.go:5:12: undefined: z\n";
        let diagnostics = diagnostics_from_output(&block, &unit, out, false);
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.message, "undefined: z");
        assert_eq!(d.range.start, Position::new(9, 11));
        assert_eq!(d.range.end, Position::new(9, 12));
        let bytes = d.byte_range.unwrap();
        assert_eq!(bytes.start, 100 + "      x := 1\n".len() + 11);
    }

    #[test]
    fn test_reports_in_wrapper_are_dropped() {
        let block = bench_block("      x := 1\n");
        let unit = wrap::wrap_go(block.kind, &block.source);
        let out = "./main.go:3:1: something about main\n./main.go:5:1: missing return\n";
        assert!(diagnostics_from_output(&block, &unit, out, true).is_empty());
    }

    #[test]
    fn test_module_noise_outside_root() {
        let block = bench_block("      sha3.Sum256(nil)\n");
        let unit = wrap::wrap_go(block.kind, &block.source);
        let out = "main.go:4:2: no required module provides package golang.org/x/crypto/sha3; to add it:\n";
        assert!(diagnostics_from_output(&block, &unit, out, false).is_empty());
        assert_eq!(diagnostics_from_output(&block, &unit, out, true).len(), 1);
    }

    #[test]
    fn test_summary_when_nothing_located() {
        let block = bench_block("      x := 1\n");
        let unit = wrap::wrap_go(block.kind, &block.source);
        let long = format!("go: build failed {}\n", "x".repeat(200));
        let diagnostics = diagnostics_from_output(&block, &unit, &long, true);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range.start, Position::new(8, 6));
        assert_eq!(diagnostics[0].message.chars().count(), output::SUMMARY_MAX_CHARS);
    }

    #[test]
    fn test_summary_noise_outside_root() {
        let block = bench_block("      x := 1\n");
        let unit = wrap::wrap_go(block.kind, &block.source);
        let out = "go: go.mod file not found in current directory or any parent directory\n";
        assert!(diagnostics_from_output(&block, &unit, out, false).is_empty());
    }

    #[test]
    fn test_setup_unused_imports_are_noise() {
        let mut block = bench_block("    import \"fmt\"\n");
        block.kind = BlockKind::Setup;
        block.owner = None;
        let unit = wrap::wrap_go(block.kind, &block.source);
        let out = "./main.go:3:12: \"fmt\" imported and not used\n";
        assert!(diagnostics_from_output(&block, &unit, out, true).is_empty());
    }
}
