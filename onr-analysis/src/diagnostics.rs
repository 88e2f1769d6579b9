//! Diagnostic construction and aggregation.
//!
//! Three producers feed the published list: the structural parser, the
//! mode linter and the semantic-validator bridge. Their outputs are
//! concatenated in that order and deduplicated by `(line, col, message)`,
//! keeping the first occurrence.

use crate::validate::ProviderValidator;
use crate::{mode_lint, parser, validate};
use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

/// Source tag carried by every diagnostic this crate produces.
pub const DIAGNOSTIC_SOURCE: &str = "onr-lsp";

/// An error diagnostic spanning one character at the offending token.
pub(crate) fn diagnostic_at(line: u32, col: u32, message: impl Into<String>) -> Diagnostic {
    Diagnostic {
        range: Range {
            start: Position::new(line, col),
            end: Position::new(line, col + 1),
        },
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: message.into(),
        ..Diagnostic::default()
    }
}

/// Merged analysis output. `setup_error` carries a validator bridge failure
/// the server should also report through the client log.
#[derive(Debug, Default)]
pub struct DocumentAnalysis {
    pub diagnostics: Vec<Diagnostic>,
    pub setup_error: Option<String>,
}

/// Runs every analysis over the document and returns the merged result.
pub fn analyze_document(
    uri: &str,
    text: &str,
    validator: Option<&dyn ProviderValidator>,
) -> DocumentAnalysis {
    let mut out = parser::analyze(text);
    out.extend(mode_lint::analyze_modes(text));
    let semantic = validate::analyze_semantic(uri, text, validator);
    out.extend(semantic.diagnostics);
    DocumentAnalysis {
        diagnostics: dedupe_diagnostics(out),
        setup_error: semantic.setup_error,
    }
}

/// The merged diagnostics alone, for callers with no client log to feed.
pub fn collect_diagnostics(
    uri: &str,
    text: &str,
    validator: Option<&dyn ProviderValidator>,
) -> Vec<Diagnostic> {
    analyze_document(uri, text, validator).diagnostics
}

fn dedupe_diagnostics(diags: Vec<Diagnostic>) -> Vec<Diagnostic> {
    if diags.len() <= 1 {
        return diags;
    }
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(diags.len());
    for d in diags {
        let key = format!(
            "{}:{}:{}",
            d.range.start.line, d.range.start.character, d.message
        );
        if seen.insert(key) {
            out.push(d);
        }
    }
    out
}
