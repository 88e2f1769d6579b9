//! Language analysis core for the ONR provider-configuration DSL.
//!
//! This crate implements everything the language server needs to understand a
//! document, without speaking any protocol itself:
//!
//! - `lexer`: streaming tokenizer, diagnostic and classifier variants
//! - `catalog`: the static directive registry (legality, modes, enums, hover)
//! - `parser`: recovering structural parser producing diagnostics
//! - `mode_lint`: mode-argument checking over the raw token stream
//! - `context`: the enclosing-block walker shared by every cursor feature
//! - `completion`: directive / mode / enum-value candidates at a position
//! - `hover`: block-aware documentation for the word under the cursor
//! - `semantic_tokens`: typed span classification with LSP delta encoding
//! - `formatting`: idempotent indentation-stable reformatting
//! - `diagnostics`: aggregation and deduplication of all analysis output
//! - `validate`: bridge to the external deep-semantics validator
//!
//! # Design principles
//!
//! - **Stateless**: every function takes the document text; nothing is cached
//!   between requests. Reparsing is O(n) and cheap at config-file sizes.
//! - **Recovering**: analysis never aborts on malformed input; problems
//!   become positioned diagnostics and scanning continues.
//! - **Protocol-adjacent**: positions, ranges and diagnostics use the
//!   `lsp-types` structures directly so the server layer stays a thin shim.
//!
//! The directive catalog is the only process-wide state. It is immutable
//! after construction and safe for concurrent reads.

pub mod catalog;
pub mod completion;
pub mod context;
pub mod diagnostics;
pub mod formatting;
pub mod hover;
pub mod lexer;
pub mod mode_lint;
pub mod parser;
pub mod semantic_tokens;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use completion::{completion_items, CompletionCandidate};
pub use diagnostics::{analyze_document, collect_diagnostics, DocumentAnalysis};
pub use formatting::{format_document, FormatOptions};
pub use hover::{hover, HoverResult};
pub use semantic_tokens::{semantic_tokens_data, SEMANTIC_TOKEN_TYPES};
pub use validate::{ProviderValidator, SemanticAnalysis, ValidationIssue, ValidationOutcome};
