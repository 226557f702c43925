/*
 * workspace.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Scratch workspaces for toolchain runs.
 */

//! Scratch workspaces for toolchain runs.
//!
//! Every check writes its synthetic unit into a fresh, uniquely named
//! directory. Inside a resolvable project root the directory is created
//! there, so the toolchain picks up the project's module metadata;
//! otherwise it lives in the system temp directory. The directory is
//! removed when the [`ScratchWorkspace`] is dropped.

use std::path::{Path, PathBuf};

use polybench_lsp_core::Language;
use tempfile::TempDir;

use crate::error::CheckError;

pub const SCRATCH_PREFIX: &str = "_polybench_check_";

/// Files whose presence makes a directory a usable project root.
pub fn root_markers(language: Language) -> &'static [&'static str] {
    match language {
        Language::Go => &["go.mod"],
        Language::TypeScript => &["package.json", "node_modules"],
        Language::Rust => &["Cargo.toml"],
    }
}

/// The configured root, if it exists and carries one of the language's
/// markers.
pub fn resolve_root(language: Language, root: Option<&Path>) -> Option<&Path> {
    let root = root?;
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "project root is not a directory");
        return None;
    }
    let found = root_markers(language)
        .iter()
        .any(|marker| root.join(marker).exists());
    if !found {
        tracing::debug!(
            root = %root.display(),
            %language,
            "project root has none of the expected markers"
        );
    }
    found.then_some(root)
}

/// A temporary directory holding one synthetic compilation unit.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Create a workspace inside `root`, or in the system temp directory.
    pub fn create(root: Option<&Path>) -> Result<Self, CheckError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root).map_err(|e| {
                CheckError::workspace(
                    format!("Failed to create scratch directory: {}", e),
                    Some(root.to_path_buf()),
                )
            })?,
            None => builder.tempdir().map_err(|e| {
                CheckError::workspace(format!("Failed to create scratch directory: {}", e), None)
            })?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file at a workspace-relative path, creating parent
    /// directories as needed.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf, CheckError> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CheckError::workspace(
                    format!("Failed to create {}: {}", parent.display(), e),
                    Some(parent.to_path_buf()),
                )
            })?;
        }
        std::fs::write(&path, contents).map_err(|e| {
            CheckError::workspace(
                format!("Failed to write {}: {}", path.display(), e),
                Some(path.clone()),
            )
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_requires_marker() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_root(Language::Go, Some(dir.path())).is_none());

        std::fs::write(dir.path().join("go.mod"), "module example.com/x\n").unwrap();
        assert_eq!(resolve_root(Language::Go, Some(dir.path())), Some(dir.path()));
        assert!(resolve_root(Language::Rust, Some(dir.path())).is_none());
    }

    #[test]
    fn test_resolve_root_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        assert!(resolve_root(Language::TypeScript, Some(dir.path())).is_some());
    }

    #[test]
    fn test_resolve_root_missing_directory() {
        let path = Path::new("/definitely/not/a/real/project/root");
        assert!(resolve_root(Language::Go, Some(path)).is_none());
        assert!(resolve_root(Language::Go, None).is_none());
    }

    #[test]
    fn test_workspace_inside_root_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let scratch_path;
        {
            let scratch = ScratchWorkspace::create(Some(root.path())).unwrap();
            scratch_path = scratch.path().to_path_buf();
            assert!(scratch_path.starts_with(root.path()));
            let name = scratch_path.file_name().unwrap().to_string_lossy();
            assert!(name.starts_with(SCRATCH_PREFIX));

            let file = scratch.write("src/lib.rs", "fn f() {}\n").unwrap();
            assert_eq!(std::fs::read_to_string(file).unwrap(), "fn f() {}\n");
        }
        assert!(!scratch_path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_workspaces_are_unique() {
        let a = ScratchWorkspace::create(None).unwrap();
        let b = ScratchWorkspace::create(None).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
