//! Context-aware completion.
//!
//! Three candidate sets, first match wins: enum values for a directive with an
//! enumerated first argument, mode identifiers for a mode directive, and
//! finally the directives legal in the enclosing block. The line prefix left
//! of the cursor decides which applies; the context walker supplies the block.

use crate::catalog;
use crate::context::{self, is_word_char};
use lsp_types::{CompletionItemKind, Position};

/// A completion suggestion with display metadata. Maps to an LSP
/// `CompletionItem`; the server layer converts to the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub kind: CompletionItemKind,
    pub detail: String,
    pub documentation: String,
}

/// Returns completion candidates for the cursor position, sorted by label.
pub fn completion_items(text: &str, pos: Position) -> Vec<CompletionCandidate> {
    let line = line_at(text, pos.line);
    let end = (pos.character as usize).min(line.len());
    let prefix = line.get(..end).unwrap_or(line);
    let block = context::current_block_at(text, pos);

    if let Some((dir, arg_prefix)) = enum_arg_completion_prefix(prefix, block) {
        let values = catalog::enum_values(dir, 0);
        if !values.is_empty() {
            return items_from_values(
                values,
                &arg_prefix,
                format!("{dir} value"),
                "Built-in ONR directive value.",
                CompletionItemKind::VALUE,
            );
        }
    }

    if let Some((dir, mode_prefix)) = mode_completion_prefix(prefix) {
        if directive_allowed_in_block(dir, block) {
            return items_from_values(
                catalog::modes_for(dir),
                &mode_prefix,
                format!("{dir} mode"),
                "Built-in ONR mapping mode.",
                CompletionItemKind::FUNCTION,
            );
        }
    }

    let word = current_word_prefix(prefix);
    items_from_values(
        catalog::directives_in_block(block),
        word,
        "directive".to_string(),
        "ONR DSL directive.",
        CompletionItemKind::KEYWORD,
    )
}

/// Finds a directive with enum values whose name ends the line prefix,
/// returning the partial argument typed so far.
fn enum_arg_completion_prefix(line_prefix: &str, block: &str) -> Option<(&'static str, String)> {
    for &dir in catalog::directives_in_block(block) {
        if catalog::enum_values(dir, 0).is_empty() {
            continue;
        }
        if let Some(arg_prefix) = directive_completion_prefix(line_prefix, dir) {
            return Some((dir, arg_prefix));
        }
    }
    None
}

fn mode_completion_prefix(line_prefix: &str) -> Option<(&'static str, String)> {
    for &dir in catalog::mode_directive_names() {
        if let Some(mode_prefix) = directive_completion_prefix(line_prefix, dir) {
            return Some((dir, mode_prefix));
        }
    }
    None
}

/// The boundary rule: the last occurrence of `directive` in the prefix must
/// start at column zero or after a non-word character, and be followed by
/// nothing (empty argument) or whitespace (argument prefix follows).
fn directive_completion_prefix(line_prefix: &str, directive: &str) -> Option<String> {
    let idx = line_prefix.rfind(directive)?;
    if idx > 0 {
        let before = line_prefix.as_bytes()[idx - 1];
        if is_word_char(before) {
            return None;
        }
    }
    let after = &line_prefix[idx + directive.len()..];
    if after.is_empty() {
        return Some(String::new());
    }
    if !after.starts_with(' ') && !after.starts_with('\t') {
        return None;
    }
    Some(after.trim().to_string())
}

fn directive_allowed_in_block(directive: &str, block: &str) -> bool {
    let allowed = catalog::allowed_blocks(directive);
    // An empty allowed-blocks list means unrestricted.
    allowed.is_empty() || allowed.contains(&block)
}

fn current_word_prefix(line_prefix: &str) -> &str {
    let bytes = line_prefix.as_bytes();
    let mut start = bytes.len();
    while start > 0 && is_word_char(bytes[start - 1]) {
        start -= 1;
    }
    &line_prefix[start..]
}

fn items_from_values(
    values: &[&str],
    prefix: &str,
    detail: String,
    documentation: &str,
    kind: CompletionItemKind,
) -> Vec<CompletionCandidate> {
    let mut items: Vec<CompletionCandidate> = values
        .iter()
        .filter(|v| prefix.is_empty() || v.starts_with(prefix))
        .map(|v| CompletionCandidate {
            label: v.to_string(),
            kind,
            detail: detail.clone(),
            documentation: documentation.to_string(),
        })
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}

fn line_at(text: &str, line: u32) -> &str {
    text.split('\n').nth(line as usize).unwrap_or("")
}
