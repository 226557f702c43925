/*
 * config.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Checker configuration.
 */

//! Checker configuration: per-language project roots and enabled languages.

use polybench_lsp_core::Language;
use std::path::{Path, PathBuf};

/// Which languages to check and where their projects live.
///
/// A project root lets embedded code resolve third-party imports: the scratch
/// workspace is created inside it so the toolchain sees the project's
/// `go.mod`, `node_modules` or Cargo dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    pub go_root: Option<PathBuf>,
    pub ts_root: Option<PathBuf>,
    pub rust_root: Option<PathBuf>,
    /// Languages whose blocks are checked. Defaults to all of them.
    pub languages: Vec<Language>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            go_root: None,
            ts_root: None,
            rust_root: None,
            languages: Language::ALL.to_vec(),
        }
    }
}

impl CheckerConfig {
    /// A configuration that checks nothing.
    pub fn disabled() -> Self {
        Self {
            languages: Vec::new(),
            ..Default::default()
        }
    }

    pub fn with_root(mut self, language: Language, root: impl Into<PathBuf>) -> Self {
        let root = Some(root.into());
        match language {
            Language::Go => self.go_root = root,
            Language::TypeScript => self.ts_root = root,
            Language::Rust => self.rust_root = root,
        }
        self
    }

    pub fn root_for(&self, language: Language) -> Option<&Path> {
        match language {
            Language::Go => self.go_root.as_deref(),
            Language::TypeScript => self.ts_root.as_deref(),
            Language::Rust => self.rust_root.as_deref(),
        }
    }

    pub fn is_enabled(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let config = CheckerConfig::default();
        for language in Language::ALL {
            assert!(config.is_enabled(language));
            assert!(config.root_for(language).is_none());
        }
    }

    #[test]
    fn test_with_root() {
        let config = CheckerConfig::default()
            .with_root(Language::Go, "/work/go")
            .with_root(Language::Rust, "/work/rs");
        assert_eq!(config.root_for(Language::Go), Some(Path::new("/work/go")));
        assert_eq!(config.root_for(Language::Rust), Some(Path::new("/work/rs")));
        assert_eq!(config.root_for(Language::TypeScript), None);
    }

    #[test]
    fn test_disabled() {
        let config = CheckerConfig::disabled();
        assert!(!config.is_enabled(Language::Go));
    }
}
