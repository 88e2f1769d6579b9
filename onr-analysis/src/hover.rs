//! Hover documentation for the directive under the cursor.

use crate::catalog;
use crate::context::{self, is_word_char};
use lsp_types::{Position, Range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub contents: String,
    pub range: Range,
}

/// Returns block-aware markdown for the word at the cursor, or `None` when
/// the word is unknown to the catalog.
pub fn hover(text: &str, pos: Position) -> Option<HoverResult> {
    let (word, range) = word_at(text, pos)?;
    let block = context::current_block_at(text, pos);
    let doc = catalog::hover(word, block)?;
    Some(HoverResult {
        contents: format!("**{word}**\n\n{doc}"),
        range,
    })
}

/// Expands the cursor over word characters and returns the word with its
/// single-line range.
pub fn word_at(text: &str, pos: Position) -> Option<(&str, Range)> {
    let line = text.split('\n').nth(pos.line as usize).unwrap_or("");
    if line.is_empty() {
        return None;
    }
    let bytes = line.as_bytes();
    let ch = (pos.character as usize).min(bytes.len());
    let mut left = ch;
    while left > 0 && is_word_char(bytes[left - 1]) {
        left -= 1;
    }
    let mut right = ch;
    while right < bytes.len() && is_word_char(bytes[right]) {
        right += 1;
    }
    if left == right {
        return None;
    }
    Some((
        &line[left..right],
        Range {
            start: Position::new(pos.line, left as u32),
            end: Position::new(pos.line, right as u32),
        },
    ))
}
