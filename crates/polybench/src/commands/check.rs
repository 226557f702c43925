/*
 * check.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Check command implementation
 */

//! Check command implementation.
//!
//! `polybench check FILE` runs the three tiers over one document: the
//! structural parser, the semantic pass, and (unless `--no-foreign`) the
//! Go, TypeScript and Rust toolchains over the embedded blocks.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, info};

use polybench_checkers::{CheckerConfig, ForeignCheckers};
use polybench_lsp_core::{Diagnostic, Document, Language, analyze_document};

use crate::render;
use crate::roots;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Annotated source excerpts
    Text,
    /// A single JSON object on stdout
    Json,
}

/// Arguments for the check command
#[derive(Debug)]
pub struct CheckArgs {
    pub file: PathBuf,
    pub go_root: Option<PathBuf>,
    pub ts_root: Option<PathBuf>,
    pub rust_root: Option<PathBuf>,
    pub no_foreign: bool,
    pub format: OutputFormat,
}

/// What a check found.
#[derive(Debug, Serialize)]
pub struct CheckOutcome {
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckOutcome {
    fn new(file: String, diagnostics: Vec<Diagnostic>) -> Self {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = diagnostics.len() - errors;
        Self {
            file,
            diagnostics,
            errors,
            warnings,
        }
    }
}

/// Explicit roots, with the rest discovered next to the document.
fn checker_config(args: &CheckArgs) -> CheckerConfig {
    let start = args
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let start = std::fs::canonicalize(&start).unwrap_or(start);

    let mut config = CheckerConfig::default();
    for language in Language::ALL {
        let explicit = match language {
            Language::Go => args.go_root.clone(),
            Language::TypeScript => args.ts_root.clone(),
            Language::Rust => args.rust_root.clone(),
        };
        if let Some(root) = explicit.or_else(|| roots::discover_root(&start, language)) {
            config = config.with_root(language, root);
        }
    }
    config
}

/// Analyze a document and collect every diagnostic, in tier order.
pub fn check_document(doc: &Document, checkers: Option<&ForeignCheckers>) -> Vec<Diagnostic> {
    let analysis = analyze_document(doc);
    debug!(
        blocks = analysis.parse.embedded.len(),
        diagnostics = analysis.diagnostics.len(),
        "In-process analysis finished"
    );
    let foreign = checkers
        .map(|c| c.check_document(&analysis))
        .unwrap_or_default();
    let mut diagnostics = analysis.diagnostics;
    diagnostics.extend(foreign);
    diagnostics
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<CheckOutcome> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let uri = args.file.display().to_string();
    let doc = Document::new(uri.clone(), content);

    let checkers = if args.no_foreign {
        None
    } else {
        let config = checker_config(&args);
        debug!(?config, "Foreign checking enabled");
        Some(ForeignCheckers::new(config))
    };

    let outcome = CheckOutcome::new(uri, check_document(&doc, checkers.as_ref()));
    info!(
        file = %outcome.file,
        errors = outcome.errors,
        warnings = outcome.warnings,
        "Check finished"
    );

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .context("Failed to serialize diagnostics")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            for diagnostic in &outcome.diagnostics {
                write!(stdout, "{}", render::render_diagnostic(&doc, diagnostic, false))?;
            }
            writeln!(stdout, "{}", render::summary(outcome.errors, outcome.warnings))?;
        }
    }

    Ok(outcome)
}
