/*
 * typescript.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * TypeScript checker.
 */

//! TypeScript checker.
//!
//! Runs the bundled `ts-check.cjs` driver under Node. The driver loads the
//! TypeScript compiler API, type-checks one unit and answers with the
//! unit's diagnostics as JSON:
//!
//! ```json
//! // Request (stdin)
//! {
//!   "fileName": "/project/_polybench_check_x/_polybench_snippet.ts",
//!   "source": "...",
//!   "libs": ["/project/node_modules/typescript/lib/lib.es2020.d.ts"],
//!   "moduleRoot": "/project"
//! }
//!
//! // Response (stdout)
//! [{ "start": 12, "length": 3, "message": "...", "category": "error", "code": 2304 }]
//! ```
//!
//! Offsets in the response are UTF-16 code units.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use polybench_lsp_core::{Diagnostic, DiagnosticSeverity, EmbeddedBlock, Language};
use polybench_source_map::utf16_to_byte_offset;
use serde::{Deserialize, Serialize};

use crate::checker::{ForeignChecker, check_with};
use crate::error::CheckError;
use crate::output;
use crate::toolchain::{self, NODE};
use crate::workspace::ScratchWorkspace;
use crate::wrap::{self, WrappedUnit};

const DRIVER_SCRIPT: &str = include_str!("../resources/ts-check.cjs");
const DRIVER_FILE: &str = "ts-check.cjs";
const SNIPPET_FILE: &str = "_polybench_snippet.ts";

/// Exit status the driver uses when the compiler module is missing.
const EXIT_NO_TYPESCRIPT: i32 = 3;

/// Standard-library declarations the unit is checked against.
const STD_LIBS: &[&str] = &["lib.es5.d.ts", "lib.es2020.d.ts"];

const LOCATE_TYPESCRIPT: &str =
    "process.stdout.write(require('path').dirname(require.resolve('typescript')))";

// ============================================================================
// Standard library discovery
// ============================================================================

/// The TypeScript installation's bundled `lib.*.d.ts` declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScriptLibs {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl TypeScriptLibs {
    fn from_dir(dir: PathBuf) -> Result<Self, String> {
        let files: Vec<PathBuf> = STD_LIBS
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| path.is_file())
            .collect();
        if files.is_empty() {
            return Err(format!("no lib.*.d.ts files in {}", dir.display()));
        }
        Ok(Self { dir, files })
    }
}

/// Locate the compiler's lib directory: the project's own `typescript`
/// package first, then whatever Node resolves from `cwd`.
fn discover_libs(node: &Path, root: Option<&Path>, cwd: &Path) -> Result<TypeScriptLibs, String> {
    if let Some(root) = root {
        let local = root.join("node_modules").join("typescript").join("lib");
        if local.is_dir() {
            return TypeScriptLibs::from_dir(local);
        }
    }

    let mut command = Command::new(node);
    command.arg("-e").arg(LOCATE_TYPESCRIPT);
    let result = toolchain::run(&NODE, &mut command, cwd, None).map_err(|e| e.to_string())?;
    let dir = result.stdout.trim();
    if !result.success || dir.is_empty() {
        return Err("typescript module not found".to_string());
    }
    TypeScriptLibs::from_dir(PathBuf::from(dir))
}

// ============================================================================
// Driver protocol
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DriverRequest<'a> {
    file_name: String,
    source: &'a str,
    libs: Vec<String>,
    module_root: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DriverDiagnostic {
    pub start: Option<usize>,
    pub length: Option<usize>,
    pub message: String,
    pub category: String,
    #[serde(default)]
    pub code: Option<u32>,
}

/// Paths as the compiler sees them.
fn compiler_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Checker
// ============================================================================

/// Checks TypeScript blocks with the TypeScript compiler API.
#[derive(Debug, Default)]
pub struct TypeScriptChecker {
    /// Set by the first successful discovery; failures are retried.
    libs: OnceLock<TypeScriptLibs>,
}

impl TypeScriptChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached standard library, discovered on first successful use.
    fn libs(&self, node: &Path, root: Option<&Path>, cwd: &Path) -> Result<&TypeScriptLibs, CheckError> {
        if let Some(libs) = self.libs.get() {
            return Ok(libs);
        }
        match discover_libs(node, root, cwd) {
            Ok(found) => {
                tracing::debug!(dir = %found.dir.display(), "typescript libs found");
                Ok(self.libs.get_or_init(|| found))
            }
            Err(reason) => {
                tracing::debug!(%reason, "typescript libs unavailable");
                Err(CheckError::toolchain_unavailable("typescript", reason))
            }
        }
    }

    fn run(&self, block: &EmbeddedBlock, root: Option<&Path>) -> Result<Vec<Diagnostic>, CheckError> {
        let node = toolchain::require_tool(&NODE)?;
        let unit = wrap::wrap_typescript(block.kind, &block.source);

        let scratch = ScratchWorkspace::create(root)?;
        let driver = scratch.write(DRIVER_FILE, DRIVER_SCRIPT)?;
        let snippet = scratch.write(SNIPPET_FILE, &unit.source)?;
        let libs = self.libs(&node, root, scratch.path())?;

        let request = DriverRequest {
            file_name: compiler_path(&snippet),
            source: &unit.source,
            libs: libs.files.iter().map(|p| compiler_path(p)).collect(),
            module_root: root.map(compiler_path),
        };
        let input = serde_json::to_vec(&request)?;

        let mut command = Command::new(&node);
        command.arg(&driver);
        let result = toolchain::run(&NODE, &mut command, scratch.path(), Some(&input))?;

        if result.code == Some(EXIT_NO_TYPESCRIPT) {
            return Err(CheckError::toolchain_unavailable(
                "typescript",
                result.stderr.trim().to_string(),
            ));
        }
        if !result.success {
            return Err(CheckError::malformed_output(
                "node",
                output::truncate_summary(result.stderr.trim()),
            ));
        }

        let response: Vec<DriverDiagnostic> = serde_json::from_str(&result.stdout)
            .map_err(|e| CheckError::malformed_output("node", e.to_string()))?;
        Ok(diagnostics_from_response(
            block,
            &unit,
            &response,
            root.is_some(),
        ))
    }
}

impl ForeignChecker for TypeScriptChecker {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn check(
        &self,
        block: &EmbeddedBlock,
        root: Option<&Path>,
    ) -> Result<Vec<Diagnostic>, CheckError> {
        check_with(block, root, |resolved| self.run(block, resolved))
    }
}

fn is_noise(message: &str, in_module: bool) -> bool {
    if message.contains("Cannot find module 'node:") {
        return true;
    }
    !in_module
        && (message.starts_with("Cannot find module")
            || message.contains("Cannot find name 'require'"))
}

fn severity(category: &str) -> Option<DiagnosticSeverity> {
    match category {
        "error" => Some(DiagnosticSeverity::Error),
        "warning" => Some(DiagnosticSeverity::Warning),
        _ => None,
    }
}

/// Map the driver's answer onto the block.
pub(crate) fn diagnostics_from_response(
    block: &EmbeddedBlock,
    unit: &WrappedUnit,
    response: &[DriverDiagnostic],
    in_module: bool,
) -> Vec<Diagnostic> {
    let map = unit.fragment_map(block);
    let mut diagnostics = Vec::new();

    for item in response {
        let Some(message) = output::clean_message(&item.message) else {
            continue;
        };
        if is_noise(&message, in_module) {
            tracing::debug!(%message, "suppressed typescript noise");
            continue;
        }
        let Some(severity) = severity(&item.category) else {
            continue;
        };

        let start_units = item.start.unwrap_or(0);
        let start = utf16_to_byte_offset(&unit.source, start_units);
        let Some(start) = map.map_offset(start) else {
            tracing::debug!(%message, "typescript report outside the block");
            continue;
        };
        let end = item
            .length
            .filter(|len| *len > 0)
            .and_then(|len| map.map_offset(utf16_to_byte_offset(&unit.source, start_units + len)));

        let mut diagnostic = output::diagnostic_at(block, start, end, severity, message);
        if let Some(code) = item.code {
            diagnostic = diagnostic.with_code(format!("TS{}", code));
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
            language: Language::TypeScript,
            kind,
            owner: Some("f".to_string()),
            start_line: 3,
            end_line: 3 + source.lines().count() - 1,
            start_offset: 40,
            end_offset: 40 + source.len(),
            source: source.to_string(),
        }
    }

    fn report(start: usize, length: usize, message: &str) -> DriverDiagnostic {
        DriverDiagnostic {
            start: Some(start),
            length: Some(length),
            message: message.to_string(),
            category: "error".to_string(),
            code: Some(2304),
        }
    }

    #[test]
    fn test_fixture_offsets_skip_header() {
        let b = block(BlockKind::Fixture, "    return foo;\n");
        let unit = wrap::wrap_typescript(b.kind, &b.source);
        let start = unit.header_bytes + 11;
        let diagnostics = diagnostics_from_response(
            &b,
            &unit,
            &[report(start, 3, "Cannot find name 'foo'.")],
            true,
        );
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.range.start, Position::new(3, 11));
        assert_eq!(d.range.end, Position::new(3, 14));
        assert_eq!(d.code.as_deref(), Some("TS2304"));
    }

    #[test]
    fn test_utf16_offsets() {
        // the emoji is two UTF-16 units and four bytes
        let b = block(BlockKind::Bench, "const s = \"😀\"; bad;\n");
        let unit = wrap::wrap_typescript(b.kind, &b.source);
        let diagnostics =
            diagnostics_from_response(&b, &unit, &[report(16, 3, "Cannot find name 'bad'.")], true);
        let d = &diagnostics[0];
        assert_eq!(d.range.start, Position::new(3, 15));
        assert_eq!(d.range.end, Position::new(3, 18));
        let bytes = d.byte_range.unwrap();
        assert_eq!(bytes.start, 40 + "const s = \"😀\"; ".len());
    }

    #[test]
    fn test_wrapper_reports_are_dropped() {
        let b = block(BlockKind::Fixture, "    const x = 1;\n");
        let unit = wrap::wrap_typescript(b.kind, &b.source);
        let diagnostics = diagnostics_from_response(
            &b,
            &unit,
            &[report(22, 10, "A function whose declared type is neither 'undefined', 'void', nor 'any' must return a value.")],
            true,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_module_noise() {
        let b = block(BlockKind::Setup, "import { x } from 'viem';\nimport fs from 'node:fs';\n");
        let unit = wrap::wrap_typescript(b.kind, &b.source);
        let response = [
            report(18, 6, "Cannot find module 'viem' or its corresponding type declarations."),
            report(41, 9, "Cannot find module 'node:fs' or its corresponding type declarations."),
        ];
        assert!(diagnostics_from_response(&b, &unit, &response, false).is_empty());
        let in_root = diagnostics_from_response(&b, &unit, &response, true);
        assert_eq!(in_root.len(), 1);
        assert!(in_root[0].message.contains("'viem'"));
    }

    #[test]
    fn test_suggestions_are_ignored() {
        let b = block(BlockKind::Bench, "let x = 1;\n");
        let unit = wrap::wrap_typescript(b.kind, &b.source);
        let mut item = report(4, 1, "'x' is declared but its value is never read.");
        item.category = "suggestion".to_string();
        assert!(diagnostics_from_response(&b, &unit, &[item], true).is_empty());
    }

    #[test]
    fn test_request_serialization() {
        let request = DriverRequest {
            file_name: "/p/_polybench_snippet.ts".to_string(),
            source: "x;",
            libs: vec!["/ts/lib/lib.es5.d.ts".to_string()],
            module_root: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"fileName":"/p/_polybench_snippet.ts","source":"x;","libs":["/ts/lib/lib.es5.d.ts"],"moduleRoot":null}"#
        );
    }

    #[test]
    fn test_failed_lib_discovery_is_retried() {
        let checker = TypeScriptChecker::new();
        let cwd = tempfile::tempdir().unwrap();
        let node = cwd.path().join("no-such-node");

        let err = checker.libs(&node, None, cwd.path()).unwrap_err();
        assert!(err.is_toolchain_unavailable());

        let root = tempfile::tempdir().unwrap();
        let lib_dir = root.path().join("node_modules").join("typescript").join("lib");
        std::fs::create_dir_all(&lib_dir).unwrap();
        std::fs::write(lib_dir.join("lib.es5.d.ts"), "").unwrap();

        let libs = checker.libs(&node, Some(root.path()), cwd.path()).unwrap();
        assert_eq!(libs.dir, lib_dir);
        // cached from here on, whatever the root
        let again = checker.libs(&node, None, cwd.path()).unwrap();
        assert_eq!(again.files, vec![lib_dir.join("lib.es5.d.ts")]);
    }

    #[test]
    fn test_libs_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TypeScriptLibs::from_dir(dir.path().to_path_buf()).is_err());
        std::fs::write(dir.path().join("lib.es2020.d.ts"), "").unwrap();
        let libs = TypeScriptLibs::from_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(libs.files, vec![dir.path().join("lib.es2020.d.ts")]);
    }
}
