//! Mode-argument linting.
//!
//! A second pass over the raw token stream, independent of the parser: every
//! statement-start directive with a mode catalog gets its first identifier or
//! string argument checked against the allowed set (case-insensitive).

use crate::catalog;
use crate::context::is_statement_start;
use crate::diagnostics::diagnostic_at;
use crate::lexer::{lex, Token, TokenKind};
use lsp_types::Diagnostic;

/// Reports `unsupported <directive> mode "<value>"` diagnostics.
pub fn analyze_modes(text: &str) -> Vec<Diagnostic> {
    let tokens = lex(text);
    let mut out = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind != TokenKind::Ident {
            continue;
        }
        if !is_statement_start(&tokens, i) {
            continue;
        }
        let allowed = catalog::modes_for(tok.text);
        if allowed.is_empty() {
            continue;
        }
        let Some(mode_tok) = next_mode_token(&tokens, i + 1) else {
            continue;
        };
        let mode = normalize_mode_token(&mode_tok);
        if mode.is_empty() {
            continue;
        }
        if allowed.iter().any(|m| m.eq_ignore_ascii_case(&mode)) {
            continue;
        }
        out.push(diagnostic_at(
            mode_tok.line,
            mode_tok.col,
            format!("unsupported {} mode {:?}", tok.text, mode),
        ));
    }
    out
}

/// The first identifier or string after the directive, skipping `=` and any
/// stray tokens, stopping at statement or block boundaries.
fn next_mode_token<'t>(tokens: &[Token<'t>], idx: usize) -> Option<Token<'t>> {
    for tok in &tokens[idx.min(tokens.len())..] {
        match tok.kind {
            TokenKind::Ident | TokenKind::Str => return Some(*tok),
            TokenKind::Semicolon
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Eof => return None,
            _ => {}
        }
    }
    None
}

/// Trims the token and strips a single pair of surrounding quotes.
fn normalize_mode_token(tok: &Token<'_>) -> String {
    let text = tok.text.trim();
    if tok.kind == TokenKind::Str {
        let text = text.strip_prefix('"').unwrap_or(text);
        let text = text.strip_suffix('"').unwrap_or(text);
        return text.to_string();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(text: &str) -> Vec<String> {
        analyze_modes(text).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn flags_unsupported_req_map_mode() {
        let text = "provider \"x\" {\n  defaults {\n    request {\n      req_map not_a_real_mapper;\n    }\n  }\n}\n";
        let diags = analyze_modes(text);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "unsupported req_map mode \"not_a_real_mapper\""
        );
        // Anchored at the mode token, not the directive.
        assert_eq!(diags[0].range.start.line, 3);
        assert_eq!(diags[0].range.start.character, 14);
    }

    #[test]
    fn accepts_known_modes_case_insensitively() {
        let text = "provider \"x\" {\n  defaults {\n    request {\n      req_map OPENAI_CHAT_TO_OPENAI_RESPONSES;\n    }\n  }\n}\n";
        assert!(messages(text).is_empty());
    }

    #[test]
    fn quoted_modes_are_unwrapped() {
        let text = "provider \"x\" {\n  defaults {\n    error {\n      error_map \"openai\";\n    }\n  }\n}\n";
        assert!(messages(text).is_empty());
        let bad = "provider \"x\" {\n  defaults {\n    error {\n      error_map \"surprise\";\n    }\n  }\n}\n";
        assert_eq!(messages(bad), ["unsupported error_map mode \"surprise\""]);
    }

    #[test]
    fn equals_before_mode_is_skipped() {
        let text = "provider \"x\" {\n  defaults {\n    response {\n      sse_parse = bogus_chunks;\n    }\n  }\n}\n";
        assert_eq!(messages(text), ["unsupported sse_parse mode \"bogus_chunks\""]);
    }

    #[test]
    fn missing_mode_is_ignored() {
        let text = "provider \"x\" {\n  defaults {\n    request {\n      req_map ;\n    }\n  }\n}\n";
        assert!(messages(text).is_empty());
    }

    #[test]
    fn non_statement_start_occurrences_are_ignored() {
        let text = "provider \"x\" {\n  defaults {\n    request {\n      # req_map here in comment should be ignored\n      req_map ;\n      json_set \"$.x\" \"y\"; req_map openai_chat_to_openai_responses;\n    }\n  }\n}\n";
        assert!(!messages(text)
            .iter()
            .any(|m| m.contains("unsupported req_map mode")));
    }

    #[test]
    fn reports_multiple_directives_in_one_document() {
        let text = "provider \"x\" {\n  defaults {\n    request { req_map bad_req_mode; }\n    response { resp_map bad_resp_mode; }\n  }\n}\n";
        let msgs = messages(text);
        assert!(msgs.iter().any(|m| m.contains("unsupported req_map mode")));
        assert!(msgs.iter().any(|m| m.contains("unsupported resp_map mode")));
    }

    #[test]
    fn non_mode_directives_are_never_checked() {
        let text = "provider \"x\" {\n  defaults {\n    request {\n      set_header \"X\" \"y\";\n      json_set \"$.a\" \"b\";\n    }\n  }\n}\n";
        assert!(messages(text).is_empty());
    }
}
