//! Language Server Protocol implementation for the ONR provider DSL.
//!
//! This crate provides editor support for the curly-brace configuration
//! language that describes request/response routing for AI-provider gateways:
//! validating diagnostics, directive and mode completion, hover docs, full
//! semantic tokens, and idempotent document formatting.
//!
//! Architecture
//!
//! ```text
//! LSP layer (tower-lsp):
//!     - JSON-RPC framing, handshaking and request routing
//!
//! Server layer (this crate):
//!     - Implements the LanguageServer trait over a per-URI text store
//!     - Thin: every handler calls into onr-analysis with the latest text
//!
//! Analysis layer (onr-analysis):
//!     - All language logic; stateless functions over document text
//!     - Dense unit tests live next to the logic
//! ```
//!
//! The server holds no parse state between requests; with full-document sync
//! every change replaces the stored text and diagnostics are recomputed from
//! scratch, which stays comfortably cheap at configuration-file sizes.
//!
//! Usage
//!
//! ```text
//! Binary:
//!     $ onr-lsp                 # serve LSP over stdio
//!     $ onr-lsp format file.conf
//!     $ onr-lsp version
//! ```

pub mod cli;
pub mod server;

pub use server::OnrLanguageServer;
