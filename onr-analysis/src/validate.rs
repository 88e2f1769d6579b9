//! Bridge to the deep semantic validator.
//!
//! The validator itself is an external collaborator; the core only depends on
//! the [`ProviderValidator`] contract: hand it a file path plus the live text,
//! get back ok, a structured issue, or a free-form error. The work here is
//! (a) materializing the buffer as `<tmpdir>/<provider>.conf` the way the
//! validator expects, and (b) recovering a useful diagnostic position from
//! whatever shape of error comes back.

use crate::catalog;
use crate::context;
use crate::diagnostics::diagnostic_at;
use lsp_types::{Diagnostic, Url};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Deep validation of a provider document. Implementations receive the path
/// of a freshly written temp copy and the exact buffer contents.
pub trait ProviderValidator: Send + Sync {
    fn validate(&self, path: &Path, text: &str) -> ValidationOutcome;
}

#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    Ok,
    Issue(ValidationIssue),
    Error(String),
}

/// A structured validation failure: the offending directive, the dotted scope
/// it was found in (e.g. `defaults.balance`), and the full message.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub directive: String,
    pub scope: String,
    pub message: String,
}

/// Output of the semantic pass. `setup_error` is set when the temp copy could
/// not be written; the server surfaces it through the client log in addition
/// to the diagnostic.
#[derive(Debug, Default)]
pub struct SemanticAnalysis {
    pub diagnostics: Vec<Diagnostic>,
    pub setup_error: Option<String>,
}

static SCANNER_ERR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+):(\d+):(\d+):\s*(.+)$").expect("scanner regex"));
static PROVIDER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bprovider\s+"([^"]+)""#).expect("provider regex"));
static DIRECTIVE_MUST_BE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*\S+\s+([a-z_][a-z0-9_]*)\s+must\s+be\b").expect("must-be regex"));
static UNSUPPORTED_MODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"unsupported\s+([a-z_][a-z0-9_]*)\s+mode\b").expect("mode regex"));
static UNSUPPORTED_DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"unsupported\s+([a-z_][a-z0-9_]*)\b").expect("unsupported regex"));

/// Runs the external validator over the document, anchoring any failure to
/// the best directive position that can be recovered. Without a validator the
/// pass contributes nothing.
pub fn analyze_semantic(
    uri: &str,
    text: &str,
    validator: Option<&dyn ProviderValidator>,
) -> SemanticAnalysis {
    let Some(validator) = validator else {
        return SemanticAnalysis::default();
    };
    if text.trim().is_empty() {
        return SemanticAnalysis::default();
    }

    let path = match write_temp_provider_file(uri, text) {
        Ok(path) => path,
        Err(err) => {
            let message =
                format!("semantic validation setup failed: write temp provider file: {err}");
            return SemanticAnalysis {
                diagnostics: vec![diagnostic_at(0, 0, message.clone())],
                setup_error: Some(message),
            };
        }
    };
    let outcome = validator.validate(&path, text);
    let _ = std::fs::remove_file(&path);

    let diagnostics = match outcome {
        ValidationOutcome::Ok => Vec::new(),
        ValidationOutcome::Issue(issue) => {
            if is_transient_mismatch(&issue.message) {
                Vec::new()
            } else {
                let hint = block_hint_from_scope(&issue.scope);
                match context::directive_position(text, &issue.directive, hint) {
                    Some(pos) => vec![diagnostic_at(pos.line, pos.character, issue.message)],
                    None => vec![diagnostic_from_message(text, &issue.message)],
                }
            }
        }
        ValidationOutcome::Error(message) => {
            if is_transient_mismatch(&message) {
                Vec::new()
            } else {
                vec![diagnostic_from_message(text, &message)]
            }
        }
    };
    SemanticAnalysis {
        diagnostics,
        setup_error: None,
    }
}

/// A stale-buffer race: the temp file name no longer matches the provider the
/// text declares. Not a real DSL problem.
fn is_transient_mismatch(message: &str) -> bool {
    message.contains("declares provider") && message.contains("expected")
}

fn diagnostic_from_message(text: &str, message: &str) -> Diagnostic {
    if let Some(caps) = SCANNER_ERR_RE.captures(message) {
        let line: u32 = caps[2].parse().unwrap_or(0);
        let col: u32 = caps[3].parse().unwrap_or(0);
        return diagnostic_at(
            line.saturating_sub(1),
            col.saturating_sub(1),
            caps[4].trim(),
        );
    }
    if let Some(pos) = semantic_directive_position(text, message) {
        return diagnostic_at(pos.line, pos.character, message);
    }
    diagnostic_at(0, 0, message)
}

fn semantic_directive_position(text: &str, message: &str) -> Option<lsp_types::Position> {
    let directive = directive_from_message(message)?;
    context::directive_position(text, &directive, "")
}

/// Pulls a directive name out of a free-form validator message.
fn directive_from_message(message: &str) -> Option<String> {
    let lowered = message.to_lowercase();
    for re in [
        &*DIRECTIVE_MUST_BE_RE,
        &*UNSUPPORTED_MODE_RE,
        &*UNSUPPORTED_DIRECTIVE_RE,
    ] {
        if let Some(caps) = re.captures(&lowered) {
            return Some(caps[1].trim().to_string());
        }
    }
    None
}

/// Maps a dotted scope onto a block hint, read right to left. OAuth
/// subdirectives live in an `auth { ... }` block regardless of nesting.
fn block_hint_from_scope(scope: &str) -> &str {
    let scope = scope.trim();
    if scope.is_empty() {
        return "";
    }
    if scope.contains(".auth.oauth") {
        return "auth";
    }
    for segment in scope.split('.').rev() {
        let base = scope_segment_base(segment);
        if catalog::is_block_keyword(base) {
            return base;
        }
    }
    ""
}

fn scope_segment_base(segment: &str) -> &str {
    let segment = segment.trim();
    match segment.find('[') {
        Some(idx) => &segment[..idx],
        None => segment,
    }
}

fn write_temp_provider_file(uri: &str, text: &str) -> std::io::Result<PathBuf> {
    let mut name = extract_provider_name(text);
    if name.is_empty() {
        name = provider_name_from_uri(uri);
    }
    if name.is_empty() {
        name = "untitled".to_string();
    }
    let name = name.trim().to_lowercase().replace(' ', "-");
    let path = std::env::temp_dir().join(format!("{name}.conf"));
    std::fs::write(&path, text)?;
    // The validator expects 0644 regardless of the process umask.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;
    }
    Ok(path)
}

fn extract_provider_name(text: &str) -> String {
    PROVIDER_NAME_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

fn provider_name_from_uri(uri: &str) -> String {
    if uri.is_empty() {
        return String::new();
    }
    let path = match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => PathBuf::from(url.path()),
        _ => PathBuf::from(uri),
    };
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
