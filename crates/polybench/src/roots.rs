/*
 * roots.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Default project roots for foreign checking.
 */

//! Project root discovery for documents checked without explicit roots.
//!
//! A poly-bench project keeps one environment per language under
//! `.polybench/runtime-env/`. When that environment is missing the nearest
//! ancestor of the document that looks like a project of the language is
//! used instead.

use std::path::{Path, PathBuf};

use polybench_checkers::workspace::root_markers;
use polybench_lsp_core::Language;
use tracing::debug;

/// File marking the top of a poly-bench project.
pub const PROJECT_MANIFEST: &str = "polybench.toml";

/// Directory holding the per-language environments, relative to the project.
pub const RUNTIME_ENV_DIR: &str = ".polybench/runtime-env";

/// Nearest ancestor of `start` (inclusive) holding `polybench.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_MANIFEST).is_file())
        .map(Path::to_path_buf)
}

fn has_marker(dir: &Path, language: Language) -> bool {
    root_markers(language)
        .iter()
        .any(|marker| dir.join(marker).exists())
}

/// Default root for `language` when checking a document in `start`.
pub fn discover_root(start: &Path, language: Language) -> Option<PathBuf> {
    if let Some(project) = find_project_root(start) {
        let env = project.join(RUNTIME_ENV_DIR).join(language.marker());
        if has_marker(&env, language) {
            debug!(language = %language, root = %env.display(), "Using runtime environment");
            return Some(env);
        }
    }

    let found = start
        .ancestors()
        .find(|dir| has_marker(dir, language))
        .map(Path::to_path_buf);
    if let Some(root) = &found {
        debug!(language = %language, root = %root.display(), "Using enclosing project");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_runtime_env_wins_over_enclosing_module() {
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join(PROJECT_MANIFEST), "").unwrap();
        fs::write(project.path().join("go.mod"), "module outer\n").unwrap();
        let env = project.path().join(RUNTIME_ENV_DIR).join("go");
        fs::create_dir_all(&env).unwrap();
        fs::write(env.join("go.mod"), "module polybench\n").unwrap();
        let benches = project.path().join("benchmarks");
        fs::create_dir_all(&benches).unwrap();

        assert_eq!(discover_root(&benches, Language::Go), Some(env));
    }

    #[test]
    fn test_empty_runtime_env_falls_back_to_ancestor() {
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join(PROJECT_MANIFEST), "").unwrap();
        fs::create_dir_all(project.path().join(RUNTIME_ENV_DIR).join("ts")).unwrap();
        fs::write(project.path().join("package.json"), "{}").unwrap();
        let benches = project.path().join("a").join("b");
        fs::create_dir_all(&benches).unwrap();

        assert_eq!(
            discover_root(&benches, Language::TypeScript),
            Some(project.path().to_path_buf())
        );
    }

    #[test]
    fn test_markers_are_per_language() {
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join("Cargo.toml"), "[package]\n").unwrap();

        assert_eq!(
            discover_root(project.path(), Language::Rust),
            Some(project.path().to_path_buf())
        );
        assert_eq!(discover_root(project.path(), Language::Go), None);
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join(PROJECT_MANIFEST), "").unwrap();
        let nested = project.path().join("x").join("y");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            find_project_root(&nested),
            Some(project.path().to_path_buf())
        );
    }
}
