//! The foreign checker abstraction.

use std::path::Path;

use polybench_lsp_core::{Diagnostic, DiagnosticSeverity, EmbeddedBlock, Language};

use crate::error::CheckError;
use crate::output;

/// Message for a block that cannot be checked because neither a toolchain
/// nor a project root is available.
pub const CHECKING_DISABLED: &str = "checking disabled: no resolvable project root";

/// Validates one embedded block with its language's toolchain.
///
/// Compile errors come back as diagnostics in document coordinates. An
/// `Err` means the check itself failed; callers skip the block.
pub trait ForeignChecker: Send + Sync {
    fn language(&self) -> Language;

    /// Check a block. `root` is the configured project root, which is used
    /// only if it resolves for this language.
    fn check(
        &self,
        block: &EmbeddedBlock,
        root: Option<&Path>,
    ) -> Result<Vec<Diagnostic>, CheckError>;
}

/// What a missing toolchain turns into.
///
/// Without a resolvable project root there is no sign the user expects this
/// language to be checkable, so the block gets a single warning; with one,
/// the block is silently skipped.
pub(crate) fn unavailable(
    block: &EmbeddedBlock,
    resolved_root: Option<&Path>,
    error: &CheckError,
) -> Vec<Diagnostic> {
    tracing::debug!(language = %block.language, %error, "toolchain unavailable, skipping block");
    if resolved_root.is_none() && !block.is_blank() {
        vec![output::block_start_diagnostic(
            block,
            DiagnosticSeverity::Warning,
            CHECKING_DISABLED,
        )]
    } else {
        Vec::new()
    }
}

/// Shared `check` flow: skip blank blocks, resolve the root, run, and
/// absorb a missing toolchain.
pub(crate) fn check_with<F>(
    block: &EmbeddedBlock,
    root: Option<&Path>,
    run: F,
) -> Result<Vec<Diagnostic>, CheckError>
where
    F: FnOnce(Option<&Path>) -> Result<Vec<Diagnostic>, CheckError>,
{
    if block.is_blank() {
        return Ok(Vec::new());
    }
    let resolved = crate::workspace::resolve_root(block.language, root);
    match run(resolved) {
        Err(error) if error.is_toolchain_unavailable() => Ok(unavailable(block, resolved, &error)),
        other => other,
    }
}
