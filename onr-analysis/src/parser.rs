//! Recovering structural parser for provider documents.
//!
//! Recursive descent over the diagnostic token stream. The grammar is
//! `(syntax "<v>";)* (provider "<name>" { body })*` with block bodies driven
//! entirely by the directive catalog. The parser never aborts: every problem
//! is recorded as a diagnostic at the offending token and scanning continues
//! with a local skip (to the next `;`, the end of a balanced `{ ... }`, or the
//! enclosing block's `}`).

use crate::catalog;
use crate::diagnostics::diagnostic_at;
use crate::lexer::{lex, Token, TokenKind};
use lsp_types::Diagnostic;

/// Parses the document and returns structural diagnostics.
pub fn analyze(text: &str) -> Vec<Diagnostic> {
    let tokens = lex(text);
    let mut parser = Parser {
        tokens: &tokens,
        i: 0,
        diags: Vec::new(),
    };
    parser.parse_file();
    parser.diags
}

const EOF_FALLBACK: Token<'static> = Token {
    kind: TokenKind::Eof,
    text: "",
    line: 0,
    col: 0,
};

struct Parser<'a, 't> {
    tokens: &'a [Token<'t>],
    i: usize,
    diags: Vec<Diagnostic>,
}

impl<'t> Parser<'_, 't> {
    fn parse_file(&mut self) {
        loop {
            let tok = self.peek();
            if tok.kind == TokenKind::Eof {
                return;
            }
            if tok.kind != TokenKind::Ident {
                self.next();
                continue;
            }
            if tok.text == "syntax" {
                self.next();
                let version = self.next();
                if version.kind != TokenKind::Str {
                    self.add(&version, "expected syntax version string literal");
                }
                let semi = self.next();
                if semi.kind != TokenKind::Semicolon {
                    self.add(&semi, "expected ';' after syntax directive");
                }
                continue;
            }
            if tok.text != "provider" {
                self.add(&tok, format!("unknown top-level directive: {}", tok.text));
                self.skip_stmt_or_block();
                continue;
            }
            self.next();
            let name = self.next();
            if name.kind != TokenKind::Str {
                self.add(&name, "expected provider name string literal");
            }
            let lb = self.next();
            if lb.kind != TokenKind::LBrace {
                self.add(&lb, "expected '{' after provider name");
                continue;
            }
            let mut chain = vec!["provider"];
            self.parse_block("provider", &mut chain);
        }
    }

    /// Parses the body of a block named `name`; entered after its `{`.
    ///
    /// `chain` holds the blocks currently being expanded. A block directive
    /// whose name is already on the chain gets an empty directive table, so
    /// its body is traversed with a balanced-brace skip instead of recursion.
    fn parse_block(&mut self, name: &'static str, chain: &mut Vec<&'static str>) {
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenKind::Eof => {
                    self.add(&tok, format!("missing closing '}}' for {name} block"));
                    return;
                }
                TokenKind::RBrace => {
                    self.next();
                    return;
                }
                TokenKind::Ident => {
                    let Some(meta) = catalog::directive_in_block(tok.text, name) else {
                        let allowed = catalog::allowed_blocks(tok.text);
                        if allowed.is_empty() {
                            self.add(
                                &tok,
                                format!("unknown directive in {name} block: {}", tok.text),
                            );
                        } else {
                            self.add(
                                &tok,
                                format!(
                                    "directive {} is not allowed in {name} block; allowed in: {}; \
                                     quick fix: move it into {} {{ ... }}",
                                    tok.text,
                                    allowed.join(", "),
                                    allowed[0]
                                ),
                            );
                        }
                        self.skip_stmt_or_block();
                        continue;
                    };
                    self.next();
                    if meta.is_block {
                        if meta.header_until_brace {
                            if !self.skip_until_lbrace(meta.name) {
                                return;
                            }
                        } else {
                            let lb = self.next();
                            if lb.kind != TokenKind::LBrace {
                                self.add(&lb, format!("expected '{{' after {}", meta.name));
                                continue;
                            }
                        }
                        if chain.contains(&meta.name) {
                            self.skip_balanced_block(meta.name);
                        } else {
                            chain.push(meta.name);
                            self.parse_block(meta.name, chain);
                            chain.pop();
                        }
                        continue;
                    }
                    self.skip_statement(meta.name);
                }
                _ => {
                    self.next();
                }
            }
        }
    }

    /// Consumes tokens up to and including the next `{`. Returns false on EOF.
    fn skip_until_lbrace(&mut self, name: &str) -> bool {
        loop {
            let tok = self.next();
            match tok.kind {
                TokenKind::LBrace => return true,
                TokenKind::Eof => {
                    self.add(&tok, format!("expected '{{' for {name} block"));
                    return false;
                }
                _ => {}
            }
        }
    }

    /// Skips a block body whose `{` was already consumed, tracking nesting.
    fn skip_balanced_block(&mut self, name: &str) {
        let mut depth = 1;
        while depth > 0 {
            let tok = self.next();
            match tok.kind {
                TokenKind::Eof => {
                    self.add(&tok, format!("missing closing '}}' for {name} block"));
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
        }
    }

    /// Skips a statement's arguments up to its `;`. A `{` here is an error; a
    /// `}` ends the enclosing block and is pushed back for the caller.
    fn skip_statement(&mut self, name: &str) {
        loop {
            let tok = self.next();
            match tok.kind {
                TokenKind::Semicolon => return,
                TokenKind::LBrace => {
                    self.add(&tok, format!("{name} does not use '{{ ... }}'; expected ';'"));
                    self.skip_balanced_block(name);
                    return;
                }
                TokenKind::RBrace => {
                    self.add(&tok, format!("expected ';' after {name}"));
                    self.i = self.i.saturating_sub(1);
                    return;
                }
                TokenKind::Eof => {
                    self.add(&tok, format!("expected ';' after {name}"));
                    return;
                }
                _ => {}
            }
        }
    }

    /// Recovery for an unrecognized directive: drop either the statement or
    /// the attached block, whichever follows.
    fn skip_stmt_or_block(&mut self) {
        if self.peek().kind == TokenKind::LBrace {
            self.next();
            self.skip_balanced_block("unknown");
            return;
        }
        loop {
            let tok = self.next();
            match tok.kind {
                TokenKind::Semicolon => return,
                TokenKind::LBrace => {
                    self.skip_balanced_block("unknown");
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {}
            }
        }
    }

    fn next(&mut self) -> Token<'t> {
        let tok = self.peek();
        if self.i < self.tokens.len() {
            self.i += 1;
        }
        tok
    }

    fn peek(&self) -> Token<'t> {
        self.tokens.get(self.i).copied().unwrap_or(EOF_FALLBACK)
    }

    fn add(&mut self, tok: &Token<'_>, message: impl Into<String>) {
        self.diags.push(diagnostic_at(tok.line, tok.col, message));
    }
}
