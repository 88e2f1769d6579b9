//! Semantic token classification for editor highlighting.
//!
//! Walks the classifier lexer output with the same block automaton as the
//! context walker, plus two bits of statement state: the directive that opened
//! the current statement (provider names highlight as namespaces) and whether
//! that directive expects a mode (the next identifier or string highlights as
//! an enum member). Spans are then packed into the LSP relative encoding,
//! five `u32`s per token.

use crate::catalog;
use crate::context::BlockTracker;
use crate::lexer::{lex_with_comments, TokenKind};

/// Token-type legend, in index order, advertised at `initialize`.
pub const SEMANTIC_TOKEN_TYPES: [&str; 8] = [
    "keyword",
    "string",
    "number",
    "comment",
    "operator",
    "namespace",
    "property",
    "enumMember",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanType {
    Keyword,
    String,
    Number,
    Comment,
    Operator,
    Namespace,
    Property,
    EnumMember,
}

impl SpanType {
    fn index(self) -> u32 {
        match self {
            SpanType::Keyword => 0,
            SpanType::String => 1,
            SpanType::Number => 2,
            SpanType::Comment => 3,
            SpanType::Operator => 4,
            SpanType::Namespace => 5,
            SpanType::Property => 6,
            SpanType::EnumMember => 7,
        }
    }
}

/// A classified span before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticSpan {
    pub line: u32,
    pub start: u32,
    pub length: u32,
    pub token_type: u32,
}

/// Classifies the whole document and returns the delta-encoded data array.
pub fn semantic_tokens_data(text: &str) -> Vec<u32> {
    encode_spans(&classify_spans(text))
}

/// Classifies the document into typed spans, in source order.
pub fn classify_spans(text: &str) -> Vec<SemanticSpan> {
    let tokens = lex_with_comments(text);
    let mut spans = Vec::with_capacity(tokens.len());
    let mut tracker = BlockTracker::new();
    let mut current_directive: Option<&str> = None;
    let mut mode_pending = false;
    let mut statement_start = true;

    fn push(spans: &mut Vec<SemanticSpan>, line: u32, start: u32, length: u32, typ: SpanType) {
        spans.push(SemanticSpan {
            line,
            start,
            length,
            token_type: typ.index(),
        });
    }

    for tok in &tokens {
        match tok.kind {
            TokenKind::Comment => {
                push(&mut spans, tok.line, tok.col, tok.len(), SpanType::Comment);
                continue;
            }
            TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => {
                push(&mut spans, tok.line, tok.col, tok.len(), SpanType::Operator);
                tracker.observe(tok);
                current_directive = None;
                mode_pending = false;
                statement_start = true;
                continue;
            }
            TokenKind::Equals => {
                push(&mut spans, tok.line, tok.col, tok.len(), SpanType::Operator);
                mode_pending = false;
                statement_start = false;
                continue;
            }
            TokenKind::Eof => break,
            _ => {}
        }

        let block = tracker.current_block();
        match tok.kind {
            TokenKind::Str => {
                let typ = if current_directive == Some("provider") {
                    SpanType::Namespace
                } else if mode_pending {
                    mode_pending = false;
                    SpanType::EnumMember
                } else {
                    SpanType::String
                };
                push(&mut spans, tok.line, tok.col, tok.len(), typ);
            }
            TokenKind::Number => {
                push(&mut spans, tok.line, tok.col, tok.len(), SpanType::Number);
            }
            TokenKind::Ident => {
                if let Some(typ) = classify_identifier(tok.text, block, mode_pending) {
                    push(&mut spans, tok.line, tok.col, tok.len(), typ);
                }
                mode_pending = false;
                tracker.observe(tok);
                if statement_start {
                    current_directive = Some(tok.text);
                    mode_pending = !catalog::modes_for(tok.text).is_empty();
                }
            }
            _ => {}
        }
        statement_start = false;
    }

    spans
}

fn classify_identifier(word: &str, block: &str, mode_pending: bool) -> Option<SpanType> {
    let word = word.trim();
    if word.is_empty() {
        return None;
    }
    if mode_pending {
        return Some(SpanType::EnumMember);
    }
    if word == "true" || word == "false" || word == "syntax" {
        return Some(SpanType::Keyword);
    }
    if catalog::is_block_keyword(word) {
        return Some(SpanType::Keyword);
    }
    if catalog::in_block(word, block) {
        return Some(SpanType::Property);
    }
    None
}

/// Packs spans into the LSP relative form: `deltaLine`, `deltaStart` (column
/// relative to the previous span only on the same line), `length`, type index,
/// and an always-zero modifier bitset.
pub fn encode_spans(spans: &[SemanticSpan]) -> Vec<u32> {
    let mut data = Vec::with_capacity(spans.len() * 5);
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;
    for span in spans {
        let delta_line = span.line - prev_line;
        let delta_start = if delta_line == 0 {
            span.start - prev_start
        } else {
            span.start
        };
        data.extend_from_slice(&[delta_line, delta_start, span.length, span.token_type, 0]);
        prev_line = span.line;
        prev_start = span.start;
    }
    data
}
