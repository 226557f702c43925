/*
 * render.rs
 * Copyright (c) 2025 Poly-Bench Contributors
 *
 * Terminal rendering of document diagnostics.
 */

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use polybench_lsp_core::{Diagnostic, DiagnosticOrigin, DiagnosticSeverity, Document};

/// Byte span to highlight for a diagnostic.
///
/// Prefers the attached byte range, then the document range. Empty spans are
/// widened to one character so the report has something to point at.
fn byte_span(doc: &Document, diagnostic: &Diagnostic) -> Range<usize> {
    let content = doc.content();
    let (start, end) = match diagnostic.byte_range.or_else(|| doc.byte_range(&diagnostic.range)) {
        Some(bytes) => (bytes.start, bytes.end),
        None => {
            let start = doc
                .line_start(diagnostic.range.start.line as usize)
                .unwrap_or(content.len());
            (start, start)
        }
    };
    let start = start.min(content.len());
    let mut end = end.clamp(start, content.len());
    if end == start
        && let Some(c) = content[start..].chars().next()
        && c != '\n'
    {
        end = start + c.len_utf8();
    }
    start..end
}

/// Convert a byte span to the character span ariadne expects.
fn char_span(content: &str, bytes: Range<usize>) -> Range<usize> {
    let start = content[..bytes.start].chars().count();
    let len = content[bytes.start..bytes.end].chars().count();
    start..start + len
}

/// Which tier reported a diagnostic, as shown under the highlighted span.
fn origin_label(origin: DiagnosticOrigin) -> String {
    match origin {
        DiagnosticOrigin::Syntax => "syntax check".to_string(),
        DiagnosticOrigin::Semantic => "semantic check".to_string(),
        DiagnosticOrigin::Foreign { language } => format!("reported by {}", language.display_name()),
    }
}

/// Render one diagnostic as an annotated source excerpt.
pub fn render_diagnostic(doc: &Document, diagnostic: &Diagnostic, color: bool) -> String {
    let path = doc.uri().to_string();
    let content = doc.content();
    let span = char_span(content, byte_span(doc, diagnostic));

    let (kind, label_color) = match diagnostic.severity {
        DiagnosticSeverity::Error => (ReportKind::Error, Color::Red),
        DiagnosticSeverity::Warning => (ReportKind::Warning, Color::Yellow),
    };

    let mut report = Report::build(kind, path.clone(), span.start)
        .with_config(Config::default().with_color(color));
    report = match &diagnostic.code {
        Some(code) => report.with_message(format!("[{}] {}", code, diagnostic.message)),
        None => report.with_message(&diagnostic.message),
    };
    let report = report
        .with_label(
            Label::new((path.clone(), span))
                .with_message(origin_label(diagnostic.origin))
                .with_color(label_color),
        )
        .finish();

    let mut output = Vec::new();
    match report.write((path, Source::from(content)), &mut output) {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        // Fall back to a single line when the excerpt cannot be drawn
        Err(_) => plain_line(doc, diagnostic),
    }
}

/// `file:line:col: severity: message`, 1-based.
pub fn plain_line(doc: &Document, diagnostic: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: {}: {}",
        doc.uri(),
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1,
        diagnostic.severity,
        diagnostic.message
    )
}

pub fn summary(errors: usize, warnings: usize) -> String {
    fn plural(n: usize, word: &str) -> String {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    }
    format!("{}, {}", plural(errors, "error"), plural(warnings, "warning"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polybench_lsp_core::{ByteRange, Language, Position, Range as DocRange};

    fn doc() -> Document {
        Document::new("suite.bench", "suite s {\n  bench b {\n    go: f(x)\n  }\n}\n")
    }

    #[test]
    fn test_report_points_at_the_range() {
        let doc = doc();
        let range = DocRange::new(Position::new(2, 10), Position::new(2, 11));
        let diagnostic = Diagnostic::error(DiagnosticOrigin::Semantic, range, "Undefined name 'x'");
        let text = render_diagnostic(&doc, &diagnostic, false);
        assert!(text.contains("Undefined name 'x'"), "{}", text);
        assert!(text.contains("suite.bench:3:11"), "{}", text);
        assert!(text.contains("go: f(x)"), "{}", text);
    }

    #[test]
    fn test_byte_range_takes_precedence_and_code_is_shown() {
        let doc = doc();
        let start = doc.content().find("f(x)").unwrap();
        let diagnostic = Diagnostic::warning(
            DiagnosticOrigin::Syntax,
            DocRange::point(Position::new(0, 0)),
            "odd",
        )
        .with_code("W1")
        .with_byte_range(Some(ByteRange::new(start, start + 4)));
        assert_eq!(byte_span(&doc, &diagnostic), start..start + 4);
        let text = render_diagnostic(&doc, &diagnostic, false);
        assert!(text.contains("[W1] odd"), "{}", text);
    }

    #[test]
    fn test_empty_span_widens_to_one_char() {
        let doc = doc();
        let diagnostic = Diagnostic::error(
            DiagnosticOrigin::Syntax,
            DocRange::point(Position::new(0, 0)),
            "x",
        );
        assert_eq!(byte_span(&doc, &diagnostic), 0..1);
    }

    #[test]
    fn test_foreign_reports_name_the_toolchain_language() {
        let doc = doc();
        let diagnostic = Diagnostic::error(
            DiagnosticOrigin::Foreign {
                language: Language::TypeScript,
            },
            DocRange::new(Position::new(2, 8), Position::new(2, 12)),
            "Type 'string' is not assignable to type 'number'.",
        );
        let text = render_diagnostic(&doc, &diagnostic, false);
        assert!(text.contains("reported by TypeScript"), "{}", text);
    }

    #[test]
    fn test_char_span_counts_characters() {
        let content = "é = x";
        assert_eq!(char_span(content, 5..6), 4..5);
    }

    #[test]
    fn test_summary_pluralizes() {
        assert_eq!(summary(1, 0), "1 error, 0 warnings");
        assert_eq!(summary(2, 1), "2 errors, 1 warning");
    }

    #[test]
    fn test_plain_line_is_one_based() {
        let doc = doc();
        let diagnostic = Diagnostic::error(
            DiagnosticOrigin::Semantic,
            DocRange::point(Position::new(2, 4)),
            "boom",
        );
        assert_eq!(plain_line(&doc, &diagnostic), "suite.bench:3:5: error: boom");
    }
}
