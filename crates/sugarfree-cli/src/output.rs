//! Failure rendering and the run summary.

use camino::Utf8Path;
use miette::{Diagnostic, GraphicalReportHandler, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use std::fmt;
use sugarfree_transformer::TransformError;

/// A transform failure tied to the file it happened in.
#[derive(Debug)]
pub struct FileDiagnostic {
    message: String,
    code: &'static str,
    src: NamedSource<String>,
    span: SourceSpan,
}

impl FileDiagnostic {
    /// Wraps `error` with the source it was raised for.
    pub fn new(path: &Utf8Path, source: String, error: &TransformError) -> Self {
        let span = error.span();
        let start = span.start_usize().min(source.len());
        let len = span.end_usize().min(source.len()).saturating_sub(start);
        Self {
            message: error.to_string(),
            code: error.code(),
            src: NamedSource::new(path.as_str(), source),
            span: SourceSpan::from((start, len)),
        }
    }
}

impl fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FileDiagnostic {}

impl Diagnostic for FileDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("sugarfree::{}", self.code)))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some("here".to_string()),
            self.span,
        ))))
    }
}

/// Renders diagnostics with source snippets.
pub struct Formatter {
    handler: GraphicalReportHandler,
}

impl Formatter {
    /// A formatter using the terminal-appropriate theme.
    pub fn new() -> Self {
        Self {
            handler: GraphicalReportHandler::new(),
        }
    }

    /// A formatter that never emits colors or unicode art.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            handler: GraphicalReportHandler::new_themed(miette::GraphicalTheme::none()),
        }
    }

    /// Renders one diagnostic.
    pub fn render(&self, diagnostic: &FileDiagnostic) -> String {
        let mut out = String::new();
        if self.handler.render_report(&mut out, diagnostic).is_err() {
            out = format!("{}: {}\n", diagnostic.src.name(), diagnostic.message);
        }
        out
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Totals for a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files that were transpiled and written.
    pub written: usize,
    /// Files that failed to transpile or write.
    pub failed: usize,
}

impl RunSummary {
    /// Formats the one-line summary.
    pub fn format(&self, out_dir: &Utf8Path) -> String {
        let noun = if self.written == 1 { "file" } else { "files" };
        if self.failed == 0 {
            format!("Transpiled {} {} to {}", self.written, noun, out_dir)
        } else {
            format!(
                "Transpiled {} {} to {} ({} failed)",
                self.written, noun, out_dir, self.failed
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugarfree_transformer::{transform, Transform, TransformOptions};

    fn failure(source: &str) -> FileDiagnostic {
        let options = TransformOptions::from_transforms(&[Transform::Typescript]);
        let error = transform(source, &options).unwrap_err();
        FileDiagnostic::new(Utf8Path::new("src/bad.ts"), source.to_string(), &error)
    }

    #[test]
    fn test_render_includes_path_code_and_snippet() {
        let rendered = Formatter::plain().render(&failure("let a = 1;\nenum E { A }\n"));
        assert!(rendered.contains("sugarfree::unsupported-construct"));
        assert!(rendered.contains("src/bad.ts"));
        assert!(rendered.contains("enum E { A }"));
    }

    #[test]
    fn test_span_is_clamped_to_source() {
        let diagnostic = failure("f(}");
        let start: usize = diagnostic.span.offset();
        assert!(start + diagnostic.span.len() <= 3);
    }

    #[test]
    fn test_summary() {
        let out = Utf8Path::new("dist");
        let summary = RunSummary {
            written: 1,
            failed: 0,
        };
        assert_eq!(summary.format(out), "Transpiled 1 file to dist");
        let summary = RunSummary {
            written: 3,
            failed: 2,
        };
        assert_eq!(summary.format(out), "Transpiled 3 files to dist (2 failed)");
    }
}
