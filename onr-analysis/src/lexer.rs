//! Streaming lexer for the ONR provider-configuration DSL.
//!
//! One grammar, two variants: the diagnostic lexer drops comments (the parser
//! and linters never see them), the classifier lexer keeps them so the
//! semantic-token pass can highlight them. Both always terminate with an
//! [`TokenKind::Eof`] token carrying the final line and column, and neither
//! can fail: any byte that fits no other rule becomes [`TokenKind::Other`].

/// Closed set of token kinds shared by every pass over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Number,
    LBrace,
    RBrace,
    Semicolon,
    Equals,
    Comment,
    Other,
    Eof,
}

/// A single lexed token. `text` borrows from the input; positions are
/// zero-based and count bytes within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: u32,
    pub col: u32,
}

impl Token<'_> {
    pub fn len(&self) -> u32 {
        self.text.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Lexes for diagnostics: comments are dropped.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_mode(input, false)
}

/// Lexes for classification: comments are emitted with their source length.
pub fn lex_with_comments(input: &str) -> Vec<Token<'_>> {
    lex_mode(input, true)
}

fn lex_mode(input: &str, keep_comments: bool) -> Vec<Token<'_>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(input.len() / 4 + 1);
    let mut line = 0u32;
    let mut col = 0u32;
    let mut i = 0usize;

    while i < bytes.len() {
        let ch = bytes[i];
        if ch == b'\n' {
            line += 1;
            col = 0;
            i += 1;
            continue;
        }
        if ch == b' ' || ch == b'\t' || ch == b'\r' {
            col += 1;
            i += 1;
            continue;
        }

        let (start_line, start_col) = (line, col);
        if ch == b'#' || (ch == b'/' && bytes.get(i + 1) == Some(&b'/')) {
            let mut j = i;
            while j < bytes.len() && bytes[j] != b'\n' {
                j += 1;
            }
            if keep_comments {
                out.push(Token {
                    kind: TokenKind::Comment,
                    text: &input[i..j],
                    line: start_line,
                    col: start_col,
                });
            }
            col += (j - i) as u32;
            i = j;
            continue;
        }

        match ch {
            b'{' | b'}' | b';' | b'=' => {
                let kind = match ch {
                    b'{' => TokenKind::LBrace,
                    b'}' => TokenKind::RBrace,
                    b';' => TokenKind::Semicolon,
                    _ => TokenKind::Equals,
                };
                out.push(Token {
                    kind,
                    text: &input[i..i + 1],
                    line: start_line,
                    col: start_col,
                });
                i += 1;
                col += 1;
            }
            b'"' => {
                let mut j = i + 1;
                while j < bytes.len() {
                    if bytes[j] == b'\\' && j + 1 < bytes.len() {
                        j += 2;
                        continue;
                    }
                    if bytes[j] == b'"' {
                        j += 1;
                        break;
                    }
                    if bytes[j] == b'\n' {
                        break;
                    }
                    j += 1;
                }
                out.push(Token {
                    kind: TokenKind::Str,
                    text: &input[i..j],
                    line: start_line,
                    col: start_col,
                });
                col += (j - i) as u32;
                i = j;
            }
            _ if is_ident_start(ch) => {
                let mut j = i + 1;
                while j < bytes.len() && is_ident_part(bytes[j]) {
                    j += 1;
                }
                out.push(Token {
                    kind: TokenKind::Ident,
                    text: &input[i..j],
                    line: start_line,
                    col: start_col,
                });
                col += (j - i) as u32;
                i = j;
            }
            b'0'..=b'9' => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'.' {
                    let mut k = j + 1;
                    while k < bytes.len() && bytes[k].is_ascii_digit() {
                        k += 1;
                    }
                    if k > j + 1 {
                        j = k;
                    }
                }
                out.push(Token {
                    kind: TokenKind::Number,
                    text: &input[i..j],
                    line: start_line,
                    col: start_col,
                });
                col += (j - i) as u32;
                i = j;
            }
            _ => {
                // Multi-byte UTF-8 sequences land here one unit at a time.
                let j = input[i..]
                    .char_indices()
                    .nth(1)
                    .map(|(off, _)| i + off)
                    .unwrap_or(input.len());
                out.push(Token {
                    kind: TokenKind::Other,
                    text: &input[i..j],
                    line: start_line,
                    col: start_col,
                });
                col += (j - i) as u32;
                i = j;
            }
        }
    }

    out.push(Token {
        kind: TokenKind::Eof,
        text: "",
        line,
        col,
    });
    out
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit() || b == b'.' || b == b'-'
}
