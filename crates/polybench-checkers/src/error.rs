/*
 * error.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Error types for foreign checkers.
 */

//! Error types for foreign checkers.
//!
//! Compile errors in a block are not errors here: they come back as
//! diagnostics. A `CheckError` means the check itself could not run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while checking a block.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The toolchain binary (or the compiler module it needs) is missing.
    #[error("Toolchain unavailable: {tool} ({reason})")]
    ToolchainUnavailable {
        /// The tool that could not be used
        tool: String,
        /// Why it could not be used
        reason: String,
    },

    /// IO error while talking to the toolchain.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to set up the scratch workspace.
    #[error("Scratch workspace error: {message}")]
    Workspace {
        /// Description of what failed
        message: String,
        /// The path involved, if any
        path: Option<PathBuf>,
    },

    /// The toolchain answered with something we could not interpret.
    #[error("Malformed output from {tool}: {message}")]
    MalformedOutput {
        /// The tool whose output was rejected
        tool: String,
        /// What was wrong with it
        message: String,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckError {
    /// Create a "toolchain unavailable" error.
    pub fn toolchain_unavailable(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ToolchainUnavailable {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Create a "workspace" error.
    pub fn workspace(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Workspace {
            message: message.into(),
            path,
        }
    }

    /// Create a "malformed output" error.
    pub fn malformed_output(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn is_toolchain_unavailable(&self) -> bool {
        matches!(self, Self::ToolchainUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_unavailable_error() {
        let err = CheckError::toolchain_unavailable("go", "not found on PATH");
        assert!(err.is_toolchain_unavailable());
        let msg = format!("{}", err);
        assert!(msg.contains("go"));
        assert!(msg.contains("not found on PATH"));
    }

    #[test]
    fn test_workspace_error() {
        let err = CheckError::workspace("cannot create", Some(PathBuf::from("/tmp/x")));
        assert!(!err.is_toolchain_unavailable());
        assert_eq!(format!("{}", err), "Scratch workspace error: cannot create");
        match err {
            CheckError::Workspace { path, .. } => assert_eq!(path, Some(PathBuf::from("/tmp/x"))),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CheckError = io.into();
        assert!(matches!(err, CheckError::Io(_)));
        assert!(format!("{}", err).contains("denied"));
    }

    #[test]
    fn test_malformed_output_error() {
        let err = CheckError::malformed_output("node", "expected a JSON array");
        assert_eq!(
            format!("{}", err),
            "Malformed output from node: expected a JSON array"
        );
    }
}
