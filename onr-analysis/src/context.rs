//! Block-context tracking over the token stream.
//!
//! Answers "which block encloses this position?" without building a tree: a
//! pending block keyword is pushed when its `{` arrives and popped at `}`.
//! `match` locks the pending slot because its free-form header may mention
//! other keywords before the brace. The same automaton backs the context
//! walker, the semantic classifier and the validator bridge's position
//! recovery, so it lives here once.

use crate::catalog;
use crate::lexer::{lex, Token, TokenKind};
use lsp_types::Position;

/// The keyword-to-brace automaton. Feed tokens in order with [`observe`].
///
/// [`observe`]: BlockTracker::observe
#[derive(Debug, Default)]
pub struct BlockTracker<'a> {
    stack: Vec<&'a str>,
    pending: Option<&'a str>,
    locked: bool,
}

impl<'a> BlockTracker<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, tok: &Token<'a>) {
        match tok.kind {
            TokenKind::Ident => {
                if catalog::is_block_keyword(tok.text) {
                    if tok.text == "match" {
                        self.pending = Some(tok.text);
                        self.locked = true;
                    } else if !self.locked {
                        self.pending = Some(tok.text);
                    }
                }
            }
            TokenKind::LBrace => {
                self.stack.push(self.pending.unwrap_or("unknown"));
                self.pending = None;
                self.locked = false;
            }
            TokenKind::RBrace => {
                self.stack.pop();
                self.pending = None;
                self.locked = false;
            }
            TokenKind::Semicolon => {
                if !self.locked {
                    self.pending = None;
                }
            }
            _ => {}
        }
    }

    /// The innermost enclosing block, or [`catalog::TOP`] at file level.
    pub fn current_block(&self) -> &'a str {
        self.stack.last().copied().unwrap_or(catalog::TOP)
    }

    pub fn stack(&self) -> &[&'a str] {
        &self.stack
    }
}

/// Word characters for cursor-based lookups (hover, completion prefixes).
pub(crate) fn is_word_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// True when the token starts after the cursor position.
pub fn token_after_position(tok: &Token<'_>, pos: Position) -> bool {
    tok.line > pos.line || (tok.line == pos.line && tok.col > pos.character)
}

/// True when the token at `idx` sits at a statement start: the first token,
/// or one immediately following `{`, `}` or `;`.
pub fn is_statement_start(tokens: &[Token<'_>], idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    matches!(
        tokens.get(idx - 1).map(|t| t.kind),
        Some(TokenKind::LBrace) | Some(TokenKind::RBrace) | Some(TokenKind::Semicolon)
    )
}

/// Stack of enclosing block names at the cursor, outermost first.
pub fn block_stack_at(text: &str, pos: Position) -> Vec<&str> {
    let tokens = lex(text);
    let mut tracker = BlockTracker::new();
    for tok in &tokens {
        if token_after_position(tok, pos) {
            break;
        }
        tracker.observe(tok);
    }
    tracker.stack().to_vec()
}

/// Name of the innermost block at the cursor, or [`catalog::TOP`].
pub fn current_block_at(text: &str, pos: Position) -> &str {
    block_stack_at(text, pos)
        .last()
        .copied()
        .unwrap_or(catalog::TOP)
}

/// Finds the first statement-start occurrence of `directive`, optionally
/// restricted to a named enclosing block. Used to anchor validator messages.
pub fn directive_position(text: &str, directive: &str, block_hint: &str) -> Option<Position> {
    let tokens = lex(text);
    let mut tracker = BlockTracker::new();
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind == TokenKind::Ident
            && tok.text == directive
            && is_statement_start(&tokens, i)
        {
            let block = tracker.current_block();
            if block_hint.is_empty() || block == block_hint {
                return Some(Position::new(tok.line, tok.col));
            }
        }
        tracker.observe(tok);
    }
    None
}
