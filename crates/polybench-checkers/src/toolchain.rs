/*
 * toolchain.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Toolchain discovery and subprocess invocation.
 */

//! Toolchain discovery and subprocess invocation.
//!
//! # Finding a toolchain
//!
//! [`find_tool`] searches in this order:
//! 1. The tool's override environment variable (`POLYBENCH_GO`,
//!    `POLYBENCH_NODE`, `POLYBENCH_CARGO`), which may name the binary itself
//!    or a directory holding it (directly or under `bin/`)
//! 2. System PATH via `which`

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::CheckError;

/// An external executable a checker delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Binary name without platform suffix.
    pub name: &'static str,
    /// Environment variable overriding the PATH lookup.
    pub env_var: &'static str,
}

pub const GO: Tool = Tool {
    name: "go",
    env_var: "POLYBENCH_GO",
};

pub const NODE: Tool = Tool {
    name: "node",
    env_var: "POLYBENCH_NODE",
};

pub const CARGO: Tool = Tool {
    name: "cargo",
    env_var: "POLYBENCH_CARGO",
};

// ============================================================================
// Discovery
// ============================================================================

/// Find a tool's binary on the system.
///
/// # Returns
///
/// `Some(path)` if the binary is found, `None` otherwise.
pub fn find_tool(tool: &Tool) -> Option<PathBuf> {
    if let Ok(value) = std::env::var(tool.env_var)
        && !value.is_empty()
    {
        let path = PathBuf::from(&value);

        if path.is_file() {
            return Some(path);
        }

        if path.is_dir() {
            let in_bin = path.join("bin").join(binary_name(tool.name));
            if in_bin.is_file() {
                return Some(in_bin);
            }

            let direct = path.join(binary_name(tool.name));
            if direct.is_file() {
                return Some(direct);
            }
        }

        tracing::debug!(
            env_var = tool.env_var,
            value = %value,
            "override does not name a usable binary, falling back to PATH"
        );
    }

    which::which(tool.name).ok()
}

/// Like [`find_tool`], but reports a missing binary as an error.
pub fn require_tool(tool: &Tool) -> Result<PathBuf, CheckError> {
    find_tool(tool).ok_or_else(|| {
        CheckError::toolchain_unavailable(
            tool.name,
            format!("not found on PATH (set {} to override)", tool.env_var),
        )
    })
}

/// Get the platform-appropriate binary name.
fn binary_name(name: &str) -> String {
    #[cfg(windows)]
    {
        format!("{}.exe", name)
    }
    #[cfg(not(windows))]
    {
        name.to_string()
    }
}

/// The platform's null device, for discarding build artifacts.
pub fn null_device() -> &'static str {
    #[cfg(windows)]
    {
        "NUL"
    }
    #[cfg(not(windows))]
    {
        "/dev/null"
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// Captured result of a toolchain run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stderr followed by stdout, for tools that report on either.
    pub fn combined(&self) -> String {
        let mut text = self.stderr.clone();
        if !self.stdout.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stdout);
        }
        text
    }
}

/// Run a prepared command to completion.
///
/// The child never inherits the terminal: stdin is closed unless `input`
/// is given, stdout and stderr are captured. A spawn failure with
/// `NotFound` is a missing toolchain, not an IO error.
pub fn run(
    tool: &Tool,
    command: &mut Command,
    working_dir: &Path,
    input: Option<&[u8]>,
) -> Result<ToolOutput, CheckError> {
    command
        .current_dir(working_dir)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!(tool = tool.name, cwd = %working_dir.display(), ?command, "running toolchain");

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CheckError::toolchain_unavailable(tool.name, format!("failed to spawn: {}", e))
        } else {
            CheckError::Io(e)
        }
    })?;

    if let Some(input) = input
        && let Some(mut stdin) = child.stdin.take()
    {
        stdin.write_all(input)?;
        // stdin drops here so the child sees EOF
    }

    let output = child.wait_with_output()?;
    Ok(ToolOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_name() {
        let name = binary_name("go");
        #[cfg(windows)]
        assert_eq!(name, "go.exe");
        #[cfg(not(windows))]
        assert_eq!(name, "go");
    }

    #[test]
    fn test_combined_output() {
        let output = ToolOutput {
            success: false,
            code: Some(1),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.combined(), "err\nout");

        let output = ToolOutput {
            success: true,
            code: Some(0),
            stdout: String::new(),
            stderr: "only\n".to_string(),
        };
        assert_eq!(output.combined(), "only\n");
    }

    #[test]
    fn test_missing_binary_is_toolchain_unavailable() {
        let tool = Tool {
            name: "polybench-definitely-missing-tool",
            env_var: "POLYBENCH_TEST_MISSING_TOOL",
        };
        let dir = tempfile::tempdir().unwrap();
        let mut command = Command::new(tool.name);
        let err = run(&tool, &mut command, dir.path(), None).unwrap_err();
        assert!(err.is_toolchain_unavailable());
        assert!(require_tool(&tool).unwrap_err().is_toolchain_unavailable());
    }
}
