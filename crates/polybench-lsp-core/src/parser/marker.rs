//! Recognition of line-anchored block markers.
//!
//! ```text
//! suite NAME {        fixture NAME {        bench NAME {
//! setup LANG {        LANG: {
//! fixture NAME { hex: "..." }
//! ```

use crate::parser::scan::{self, char_column};
use regex::Regex;
use std::sync::LazyLock;

static CONTAINER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(suite|fixture|bench)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{\s*$")
        .expect("Invalid regex pattern for container marker")
});

static SETUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*setup\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{\s*$")
        .expect("Invalid regex pattern for setup marker")
});

static LANGUAGE_BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*:\s*\{\s*$")
        .expect("Invalid regex pattern for language block marker")
});

static INLINE_FIXTURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*fixture\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{(.*)\}\s*$")
        .expect("Invalid regex pattern for inline fixture")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Suite,
    Fixture,
    Bench,
    /// `setup LANG {`
    Setup,
    /// `LANG: {`
    LanguageBlock,
}

/// An opening marker recognized on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    pub kind: MarkerKind,
    /// Container name, or the language marker for setup and language blocks.
    pub name: &'a str,
    /// Character column of `name`.
    pub name_column: usize,
}

impl<'a> Marker<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        if let Some(caps) = CONTAINER_PATTERN.captures(line) {
            let kind = match &caps[1] {
                "suite" => MarkerKind::Suite,
                "fixture" => MarkerKind::Fixture,
                _ => MarkerKind::Bench,
            };
            let name = caps.get(2)?;
            return Some(Marker {
                kind,
                name: name.as_str(),
                name_column: char_column(line, name.start()),
            });
        }
        let (kind, caps) = if let Some(caps) = SETUP_PATTERN.captures(line) {
            (MarkerKind::Setup, caps)
        } else {
            (
                MarkerKind::LanguageBlock,
                LANGUAGE_BLOCK_PATTERN.captures(line)?,
            )
        };
        let name = caps.get(1)?;
        Some(Marker {
            kind,
            name: name.as_str(),
            name_column: char_column(line, name.start()),
        })
    }
}

/// A fixture opened and closed on one line: `fixture NAME { key: value }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineFixture<'a> {
    pub name: &'a str,
    pub name_column: usize,
    /// Text between the braces.
    pub body: &'a str,
    /// Byte index of `body` within the line.
    pub body_start: usize,
}

impl<'a> InlineFixture<'a> {
    /// The body must not open or close further braces outside strings.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = INLINE_FIXTURE_PATTERN.captures(line)?;
        let name = caps.get(1)?;
        let body = caps.get(2)?;
        if !scan::unquoted_braces(body.as_str()).is_empty() {
            return None;
        }
        Some(InlineFixture {
            name: name.as_str(),
            name_column: char_column(line, name.start()),
            body: body.as_str(),
            body_start: body.start(),
        })
    }
}
