/*
 * rust.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Rust checker.
 */

//! Rust checker.
//!
//! Builds a throwaway library crate around the block and runs
//! `cargo check --message-format=json`. Inside a project root the scratch
//! crate borrows the project's `[dependencies]` (path dependencies are
//! rebased, `workspace = true` entries are resolved against the root's
//! `[workspace.dependencies]`) and shares a target directory under
//! `<root>/target/polybench-check` so repeated checks reuse the build.

use std::path::Path;
use std::process::Command;

use polybench_lsp_core::{Diagnostic, DiagnosticSeverity, EmbeddedBlock, Language};
use serde::Deserialize;
use toml::{Table, Value};

use crate::checker::{ForeignChecker, check_with};
use crate::error::CheckError;
use crate::output;
use crate::toolchain::{self, CARGO};
use crate::workspace::ScratchWorkspace;
use crate::wrap::{self, FIXTURE_FN, RUST_BENCH_FN, WrappedUnit};

const UNIT_FILE: &str = "src/lib.rs";
const CRATE_NAME: &str = "polybench_check";
const DEFAULT_EDITION: &str = "2021";

// ============================================================================
// Cargo JSON messages
// ============================================================================

#[derive(Debug, Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    message: Option<CompilerMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompilerMessage {
    pub message: String,
    #[serde(default)]
    pub code: Option<CompilerCode>,
    pub level: String,
    #[serde(default)]
    pub spans: Vec<DiagnosticSpan>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompilerCode {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DiagnosticSpan {
    pub file_name: String,
    pub byte_start: usize,
    pub byte_end: usize,
    pub is_primary: bool,
}

/// Compiler messages from `cargo --message-format=json` output.
///
/// Lines that are not JSON (or not compiler messages) are skipped.
pub(crate) fn compiler_messages(stdout: &str) -> Vec<CompilerMessage> {
    stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str::<CargoMessage>(line).ok())
        .filter(|m| m.reason == "compiler-message")
        .filter_map(|m| m.message)
        .collect()
}

// ============================================================================
// Scratch manifest
// ============================================================================

/// Manifest for the scratch crate.
///
/// `root_manifest` is the project's `Cargo.toml`, when there is one.
pub(crate) fn scratch_manifest(root: Option<&Path>, root_manifest: Option<&Table>) -> String {
    let mut package = Table::new();
    package.insert("name".into(), Value::String(CRATE_NAME.into()));
    package.insert("version".into(), Value::String("0.0.0".into()));
    package.insert("edition".into(), Value::String(edition(root_manifest)));
    package.insert("publish".into(), Value::Boolean(false));

    let mut lib = Table::new();
    lib.insert("path".into(), Value::String(UNIT_FILE.into()));

    let mut manifest = Table::new();
    manifest.insert("package".into(), Value::Table(package));
    manifest.insert("lib".into(), Value::Table(lib));
    // an empty workspace keeps cargo from adopting the project's workspace
    manifest.insert("workspace".into(), Value::Table(Table::new()));

    if let (Some(root), Some(root_manifest)) = (root, root_manifest) {
        let dependencies = copied_dependencies(root, root_manifest);
        if !dependencies.is_empty() {
            manifest.insert("dependencies".into(), Value::Table(dependencies));
        }
    }

    toml::to_string(&manifest).unwrap_or_default()
}

fn edition(root_manifest: Option<&Table>) -> String {
    root_manifest
        .and_then(|m| m.get("package"))
        .and_then(|p| p.get("edition"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_EDITION)
        .to_string()
}

fn copied_dependencies(root: &Path, root_manifest: &Table) -> Table {
    let Some(dependencies) = root_manifest.get("dependencies").and_then(Value::as_table) else {
        return Table::new();
    };
    let workspace_deps = root_manifest
        .get("workspace")
        .and_then(|w| w.get("dependencies"))
        .and_then(Value::as_table);

    let mut copied = Table::new();
    for (name, spec) in dependencies {
        let inherits = spec
            .get("workspace")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let spec = if inherits {
            match workspace_deps.and_then(|w| w.get(name)) {
                Some(inherited) => inherited.clone(),
                None => {
                    tracing::debug!(dependency = %name, "workspace dependency not found, skipping");
                    continue;
                }
            }
        } else {
            spec.clone()
        };
        copied.insert(name.clone(), rebase_path(root, spec));
    }
    copied
}

/// Make a relative `path = "..."` dependency absolute.
fn rebase_path(root: &Path, spec: Value) -> Value {
    let Value::Table(mut table) = spec else {
        return spec;
    };
    if let Some(Value::String(path)) = table.get("path")
        && Path::new(path).is_relative()
    {
        let absolute = root.join(path).to_string_lossy().into_owned();
        table.insert("path".into(), Value::String(absolute));
    }
    Value::Table(table)
}

fn read_root_manifest(root: &Path) -> Option<Table> {
    let path = root.join("Cargo.toml");
    let text = std::fs::read_to_string(&path).ok()?;
    match text.parse::<Table>() {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unreadable Cargo manifest");
            None
        }
    }
}

// ============================================================================
// Checker
// ============================================================================

/// Checks Rust blocks with `cargo check`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustChecker;

impl RustChecker {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, block: &EmbeddedBlock, root: Option<&Path>) -> Result<Vec<Diagnostic>, CheckError> {
        let cargo = toolchain::require_tool(&CARGO)?;
        let unit = wrap::wrap_rust(block.kind, &block.source);

        let scratch = ScratchWorkspace::create(root)?;
        let root_manifest = root.and_then(read_root_manifest);
        scratch.write("Cargo.toml", &scratch_manifest(root, root_manifest.as_ref()))?;
        scratch.write(UNIT_FILE, &unit.source)?;

        let target_dir = match root {
            Some(root) => root.join("target").join("polybench-check"),
            None => scratch.path().join("target"),
        };

        let mut command = Command::new(&cargo);
        command
            .args(["check", "--message-format=json", "--quiet"])
            .env("CARGO_TARGET_DIR", &target_dir);
        let result = toolchain::run(&CARGO, &mut command, scratch.path(), None)?;

        let messages = compiler_messages(&result.stdout);
        let mut diagnostics = diagnostics_from_messages(block, &unit, &messages);

        // cargo itself failed before rustc said anything (bad manifest,
        // unresolvable dependency)
        if !result.success && messages.is_empty() {
            let summary = result
                .stderr
                .lines()
                .map(str::trim)
                .find(|l| l.starts_with("error"))
                .and_then(output::clean_message);
            if let Some(summary) = summary {
                diagnostics.push(output::block_start_diagnostic(
                    block,
                    DiagnosticSeverity::Error,
                    output::truncate_summary(&summary),
                ));
            }
        }
        Ok(diagnostics)
    }
}

impl ForeignChecker for RustChecker {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn check(
        &self,
        block: &EmbeddedBlock,
        root: Option<&Path>,
    ) -> Result<Vec<Diagnostic>, CheckError> {
        check_with(block, root, |resolved| self.run(block, resolved))
    }
}

fn names_wrapper(message: &str) -> bool {
    message.contains(&format!("`{}`", FIXTURE_FN))
        || message.contains(&format!("`{}`", RUST_BENCH_FN))
}

/// Map rustc messages onto the block.
pub(crate) fn diagnostics_from_messages(
    block: &EmbeddedBlock,
    unit: &WrappedUnit,
    messages: &[CompilerMessage],
) -> Vec<Diagnostic> {
    let map = unit.fragment_map(block);
    let mut diagnostics = Vec::new();

    for message in messages {
        let severity = match message.level.as_str() {
            "error" => DiagnosticSeverity::Error,
            "warning" => DiagnosticSeverity::Warning,
            _ => continue,
        };
        let Some(text) = output::clean_message(&message.message) else {
            continue;
        };
        if text.starts_with("aborting due to") || names_wrapper(&text) {
            tracing::debug!(message = %text, "suppressed rust noise");
            continue;
        }
        let Some(span) = message
            .spans
            .iter()
            .find(|s| s.is_primary && s.file_name.replace('\\', "/").ends_with(UNIT_FILE))
        else {
            tracing::debug!(message = %text, "rust report without a primary span in the unit");
            continue;
        };
        let Some(start) = map.map_offset(span.byte_start) else {
            tracing::debug!(message = %text, "rust report outside the block");
            continue;
        };
        let end = map.map_offset(span.byte_end);

        let mut diagnostic = output::diagnostic_at(block, start, end, severity, text);
        if let Some(code) = &message.code {
            diagnostic = diagnostic.with_code(code.code.clone());
        }
        diagnostics.push(diagnostic);
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use polybench_lsp_core::{BlockKind, Position};

    fn block(kind: BlockKind, source: &str) -> EmbeddedBlock {
        EmbeddedBlock {
            language: Language::Rust,
            kind,
            owner: Some("b".to_string()),
            start_line: 12,
            end_line: 12 + source.lines().count() - 1,
            start_offset: 300,
            end_offset: 300 + source.len(),
            source: source.to_string(),
        }
    }

    fn message_json(level: &str, text: &str, byte_start: usize, byte_end: usize) -> String {
        format!(
            r#"{{"reason":"compiler-message","package_id":"x","target":{{}},"message":{{"message":"{}","code":{{"code":"E0425","explanation":null}},"level":"{}","spans":[{{"file_name":"src/lib.rs","byte_start":{},"byte_end":{},"line_start":1,"line_end":1,"column_start":1,"column_end":1,"is_primary":true,"text":[],"label":null}}],"children":[],"rendered":""}}}}"#,
            text, level, byte_start, byte_end
        )
    }

    #[test]
    fn test_compiler_messages_skip_other_lines() {
        let stdout = format!(
            "{}\n{}\nnot json\n{}\n",
            r#"{"reason":"compiler-artifact","package_id":"x"}"#,
            message_json("error", "cannot find value `y` in this scope", 40, 41),
            r#"{"reason":"build-finished","success":false}"#
        );
        let messages = compiler_messages(&stdout);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, "error");
        assert_eq!(messages[0].spans[0].byte_start, 40);
    }

    #[test]
    fn test_bench_body_maps_past_header() {
        let b = block(BlockKind::Bench, "    let x = y + 1;\n");
        let unit = wrap::wrap_rust(b.kind, &b.source);
        let start = unit.header_bytes + 12;
        let stdout = message_json("error", "cannot find value `y` in this scope", start, start + 1);
        let diagnostics = diagnostics_from_messages(&b, &unit, &compiler_messages(&stdout));
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.range.start, Position::new(12, 12));
        assert_eq!(d.range.end, Position::new(12, 13));
        assert_eq!(d.code.as_deref(), Some("E0425"));
    }

    #[test]
    fn test_noise_is_dropped() {
        let b = block(BlockKind::Bench, "    let x = 1;\n");
        let unit = wrap::wrap_rust(b.kind, &b.source);
        let inside = unit.header_bytes + 8;
        let stdout = [
            r#"{"reason":"compiler-message","message":{"message":"aborting due to 1 previous error","code":null,"level":"error","spans":[]}}"#.to_string(),
            message_json("warning", "function `__bench_main` is never used", 40, 52),
            message_json("warning", "unused variable: `x`", inside, inside + 1),
            message_json("error", "mismatched types", 0, 5),
        ]
        .join("\n");
        let diagnostics = diagnostics_from_messages(&b, &unit, &compiler_messages(&stdout));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "unused variable: `x`");
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Warning);
    }

    #[test]
    fn test_manifest_without_root() {
        let manifest: Table = scratch_manifest(None, None).parse().unwrap();
        assert_eq!(manifest["package"]["name"].as_str(), Some(CRATE_NAME));
        assert_eq!(manifest["package"]["edition"].as_str(), Some(DEFAULT_EDITION));
        assert!(manifest["workspace"].as_table().unwrap().is_empty());
        assert!(manifest.get("dependencies").is_none());
    }

    #[test]
    fn test_manifest_copies_dependencies() {
        let root_manifest: Table = r#"
[package]
name = "bench-project"
edition = "2024"

[dependencies]
sha2 = "0.10"
local = { path = "../local" }
shared = { workspace = true }
missing = { workspace = true }

[workspace.dependencies]
shared = { version = "1.2", features = ["x"] }
"#
        .parse()
        .unwrap();
        let root = Path::new("/work/project");
        let manifest: Table = scratch_manifest(Some(root), Some(&root_manifest))
            .parse()
            .unwrap();

        assert_eq!(manifest["package"]["edition"].as_str(), Some("2024"));
        let deps = manifest["dependencies"].as_table().unwrap();
        assert_eq!(deps["sha2"].as_str(), Some("0.10"));
        assert_eq!(
            deps["local"]["path"].as_str(),
            Some(root.join("../local").to_string_lossy().as_ref())
        );
        assert_eq!(deps["shared"]["version"].as_str(), Some("1.2"));
        assert!(deps.get("missing").is_none());
    }
}
