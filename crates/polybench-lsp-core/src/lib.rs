//! Transport-agnostic analysis for poly-bench documents.
//!
//! This crate holds the two in-process analysis tiers for `.bench` files
//! without any LSP protocol or toolchain dependencies.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      polybench-lsp-core                      │
//! │      parser (structure, embedded blocks) + semantic pass     │
//! └──────────────────────────────────────────────────────────────┘
//!             │                                   │
//!             ▼                                   ▼
//! ┌───────────────────────┐         ┌────────────────────────────┐
//! │  polybench-checkers   │         │         polybench          │
//! │ (Go / TS / Rust tools)│         │  (CLI, merges every tier)  │
//! └───────────────────────┘         └────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use polybench_lsp_core::{Document, analyze_document};
//!
//! let doc = Document::new(
//!     "demo.bench",
//!     "suite demo {\n  descriptoin: \"x\"\n}\n",
//! );
//! let analysis = analyze_document(&doc);
//! assert_eq!(analysis.diagnostics.len(), 1);
//! assert!(analysis.diagnostics[0].message.contains("Did you mean 'description'?"));
//! ```

pub mod analysis;
pub mod document;
pub mod parser;
pub mod semantic;
pub mod types;

// Re-export main types and functions for convenience
pub use analysis::{DocumentAnalysis, analyze_document};
pub use document::Document;
pub use parser::{BlockKind, EmbeddedBlock, ParseResult, SyntaxError, parse};
pub use semantic::{BenchCall, Fixture, SetupSymbol, SymbolTable};
pub use types::{
    ByteRange, Diagnostic, DiagnosticOrigin, DiagnosticSeverity, Language, Position, Range,
};
