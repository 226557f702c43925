//! Source mapping for poly-bench documents
//!
//! This crate provides the coordinate machinery shared by every analysis tier:
//! a line index over document text, conversions between byte offsets and
//! (row, column) locations, and the mapping that carries a location reported
//! against a synthetic wrapper (a foreign fragment wrapped into a compilable
//! unit) back to the original document.
//!
//! # Overview
//!
//! The core types are:
//! - [`FileInformation`]: Line-break index enabling fast offset lookups
//! - [`Location`] / [`Range`]: Positions in source text
//! - [`FragmentMap`]: Maps wrapper coordinates back into the document
//!
//! # Example
//!
//! ```rust
//! use polybench_source_map::*;
//!
//! let document = "suite s {\n  setup go {\n    func f() {}\n  }\n}\n";
//! let fragment_start = document.find("    func").unwrap();
//! let fragment_end = document.find("  }\n}").unwrap();
//! let fragment = &document[fragment_start..fragment_end];
//!
//! // Two injected header lines ("package main\n\n")
//! let map = FragmentMap::new(fragment, fragment_start, 2, 2, "package main\n\n".len());
//! let loc = map.map_line_column(2, 4).unwrap();
//! assert_eq!(loc.row, 2);
//! assert_eq!(loc.column, 4);
//! assert_eq!(&document[loc.offset..loc.offset + 4], "func");
//! ```

pub mod file_info;
pub mod mapping;
pub mod types;
pub mod utils;

// Re-export main types
pub use file_info::FileInformation;
pub use mapping::FragmentMap;
pub use types::{Location, Range};
pub use utils::{
    content_line_count, line_col_to_offset, offset_to_location, utf16_to_byte_offset,
};
