/*
 * lib.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Foreign toolchain checkers for poly-bench documents.
 */

//! Foreign toolchain checkers for poly-bench documents.
//!
//! Each embedded Go, TypeScript or Rust block is wrapped into a compilable
//! unit, handed to the language's own toolchain in a scratch workspace, and
//! the toolchain's complaints are mapped back to document coordinates.
//!
//! # Overview
//!
//! ```text
//! EmbeddedBlock ──wrap──▶ WrappedUnit ──toolchain──▶ output ──FragmentMap──▶ Diagnostic
//! ```
//!
//! - [`wrap`] builds the synthetic unit and remembers how far the header
//!   shifted the block.
//! - [`GoChecker`], [`TypeScriptChecker`] and [`RustChecker`] run `go build`,
//!   the TypeScript compiler API under Node, and `cargo check`.
//! - [`ForeignCheckers`] owns one checker per language plus the
//!   [`CheckerConfig`], checks a whole document block by block, and drops
//!   complaints about names the benchmark harness provides.
//!
//! A missing toolchain is not a failure: the block is skipped (with a
//! warning when no project root was configured either).
//!
//! # Example
//!
//! ```rust,no_run
//! use polybench_checkers::{CheckerConfig, ForeignCheckers};
//! use polybench_lsp_core::{Document, Language, analyze_document};
//!
//! let doc = Document::new("demo.bench", std::fs::read_to_string("demo.bench").unwrap());
//! let analysis = analyze_document(&doc);
//!
//! let config = CheckerConfig::default().with_root(Language::Go, "bench/go");
//! let checkers = ForeignCheckers::new(config);
//! for diagnostic in checkers.check_document(&analysis) {
//!     println!("{}: {}", diagnostic.range.start.line + 1, diagnostic.message);
//! }
//! ```

pub mod checker;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod go;
pub mod output;
pub mod rust;
pub mod toolchain;
pub mod typescript;
pub mod workspace;
pub mod wrap;

pub use checker::{CHECKING_DISABLED, ForeignChecker};
pub use config::CheckerConfig;
pub use coordinator::{ForeignCheckers, harness_names};
pub use error::CheckError;
pub use go::GoChecker;
pub use rust::RustChecker;
pub use typescript::{TypeScriptChecker, TypeScriptLibs};
pub use workspace::{SCRATCH_PREFIX, ScratchWorkspace};
pub use wrap::WrappedUnit;
