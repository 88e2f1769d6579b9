//! Static directive catalog for the ONR DSL.
//!
//! Every editor feature reads from the one metadata table below: which
//! directives are legal in which blocks, which introduce nested blocks, which
//! take a mode or an enumerated first argument, and what their hover text is.
//! The table is turned into lookup indices once, on first use, and is
//! immutable afterwards, so concurrent reads need no synchronization.
//!
//! Block names are plain strings; the pseudo-block [`TOP`] stands for the file
//! top level and is filtered out of user-facing lists.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Pseudo-block name for the file top level. Never shown to users.
pub const TOP: &str = "_top";

/// Metadata for one directive. A directive appears once in the table; the
/// `blocks` list carries every block it is legal in.
#[derive(Debug)]
pub struct DirectiveMeta {
    pub name: &'static str,
    pub blocks: &'static [&'static str],
    pub is_block: bool,
    pub header_until_brace: bool,
    pub modes: &'static [&'static str],
    pub enum_values: &'static [&'static str],
    pub hover: &'static str,
    pub hover_by_block: &'static [(&'static str, &'static str)],
}

const fn stmt(
    name: &'static str,
    blocks: &'static [&'static str],
    hover: &'static str,
) -> DirectiveMeta {
    DirectiveMeta {
        name,
        blocks,
        is_block: false,
        header_until_brace: false,
        modes: &[],
        enum_values: &[],
        hover,
        hover_by_block: &[],
    }
}

const fn block(
    name: &'static str,
    blocks: &'static [&'static str],
    hover: &'static str,
) -> DirectiveMeta {
    DirectiveMeta {
        name,
        blocks,
        is_block: true,
        header_until_brace: false,
        modes: &[],
        enum_values: &[],
        hover,
        hover_by_block: &[],
    }
}

const fn mode_stmt(
    name: &'static str,
    blocks: &'static [&'static str],
    modes: &'static [&'static str],
    hover: &'static str,
) -> DirectiveMeta {
    DirectiveMeta {
        name,
        blocks,
        is_block: false,
        header_until_brace: false,
        modes,
        enum_values: &[],
        hover,
        hover_by_block: &[],
    }
}

const fn enum_stmt(
    name: &'static str,
    blocks: &'static [&'static str],
    enum_values: &'static [&'static str],
    hover: &'static str,
) -> DirectiveMeta {
    DirectiveMeta {
        name,
        blocks,
        is_block: false,
        header_until_brace: false,
        modes: &[],
        enum_values,
        hover,
        hover_by_block: &[],
    }
}

static DIRECTIVES: &[DirectiveMeta] = &[
    // Top level.
    stmt(
        "syntax",
        &[TOP],
        "Declares the DSL syntax version for this file, e.g. `syntax \"next-router/0.1\";`.",
    ),
    block(
        "provider",
        &[TOP],
        "Declares a provider and opens its configuration: `provider \"name\" { ... }`.",
    ),
    // Provider body.
    block(
        "defaults",
        &["provider"],
        "Phase configuration applied to every route of the provider.",
    ),
    DirectiveMeta {
        name: "match",
        blocks: &["provider"],
        is_block: true,
        header_until_brace: true,
        modes: &[],
        enum_values: &[],
        hover: "Routes requests selected by the header expression; everything up to `{` is the \
                match header.",
        hover_by_block: &[],
    },
    // Phase blocks.
    block(
        "upstream_config",
        &["defaults"],
        "Connection settings for the provider upstream, such as `base_url`.",
    ),
    block(
        "upstream",
        &["match"],
        "Per-route adjustments to the upstream URL.",
    ),
    block(
        "auth",
        &["defaults", "match"],
        "Credential injection for upstream requests.",
    ),
    block(
        "request",
        &["defaults", "match"],
        "Request-phase body and header transforms.",
    ),
    block(
        "response",
        &["defaults", "match"],
        "Response-phase body and stream transforms.",
    ),
    block(
        "error",
        &["defaults", "match"],
        "Upstream error translation.",
    ),
    block(
        "metrics",
        &["defaults", "match"],
        "Usage accounting extracted from upstream responses.",
    ),
    block(
        "balance",
        &["defaults"],
        "Account balance lookup for the provider.",
    ),
    block(
        "models",
        &["defaults"],
        "Model listing lookup for the provider.",
    ),
    // upstream_config.
    stmt(
        "base_url",
        &["upstream_config"],
        "Base URL for upstream requests, e.g. `base_url = \"https://api.openai.com\";`.",
    ),
    // upstream.
    stmt("set_path", &["upstream"], "Rewrites the upstream request path."),
    stmt(
        "set_query",
        &["upstream"],
        "Sets a query parameter on the upstream URL.",
    ),
    stmt(
        "del_query",
        &["upstream"],
        "Removes a query parameter from the upstream URL.",
    ),
    // auth.
    stmt(
        "auth_bearer",
        &["auth"],
        "Sends `Authorization: Bearer <value>` using the named credential.",
    ),
    stmt(
        "auth_header_key",
        &["auth"],
        "Sends the API key in a custom request header.",
    ),
    stmt(
        "auth_oauth_bearer",
        &["auth"],
        "Sends a bearer token obtained through the OAuth flow configured in this block.",
    ),
    mode_stmt(
        "oauth_mode",
        &["auth"],
        &["client_credentials", "refresh_token", "oauth2_device_code"],
        "OAuth grant used to obtain access tokens.",
    ),
    stmt(
        "oauth_token_url",
        &["auth"],
        "Token endpoint URL for the OAuth flow.",
    ),
    stmt("oauth_client_id", &["auth"], "OAuth client identifier."),
    stmt("oauth_client_secret", &["auth"], "OAuth client secret."),
    stmt(
        "oauth_refresh_token",
        &["auth"],
        "Long-lived refresh token exchanged for access tokens.",
    ),
    stmt("oauth_scope", &["auth"], "Scope requested with the token."),
    stmt(
        "oauth_audience",
        &["auth"],
        "Audience requested with the token.",
    ),
    enum_stmt(
        "oauth_method",
        &["auth"],
        &["GET", "POST"],
        "HTTP method for the token request.",
    ),
    enum_stmt(
        "oauth_content_type",
        &["auth"],
        &["json", "form"],
        "Encoding of the token request body.",
    ),
    stmt(
        "oauth_token_path",
        &["auth"],
        "JSON path of the access token in the token response.",
    ),
    stmt(
        "oauth_expires_in_path",
        &["auth"],
        "JSON path of the expiry seconds in the token response.",
    ),
    stmt(
        "oauth_token_type_path",
        &["auth"],
        "JSON path of the token type in the token response.",
    ),
    stmt(
        "oauth_timeout_ms",
        &["auth"],
        "Timeout for the token request, in milliseconds.",
    ),
    stmt(
        "oauth_refresh_skew_sec",
        &["auth"],
        "Seconds before expiry at which tokens are refreshed.",
    ),
    stmt(
        "oauth_fallback_ttl_sec",
        &["auth"],
        "Token lifetime assumed when the token response carries no expiry.",
    ),
    stmt(
        "oauth_form",
        &["auth"],
        "Adds a form field to the token request body.",
    ),
    // request / balance / models headers.
    DirectiveMeta {
        name: "set_header",
        blocks: &["request", "balance", "models"],
        is_block: false,
        header_until_brace: false,
        modes: &[],
        enum_values: &[],
        hover: "Sets a header on the upstream request.",
        hover_by_block: &[
            ("balance", "Sets a header on the balance query request."),
            ("models", "Sets a header on the model listing request."),
        ],
    },
    stmt(
        "del_header",
        &["request"],
        "Removes a header from the upstream request.",
    ),
    stmt(
        "model_map",
        &["request"],
        "Maps a requested model name to the upstream model name.",
    ),
    stmt(
        "model_map_default",
        &["request"],
        "Fallback upstream model when no `model_map` entry matches.",
    ),
    stmt(
        "json_set",
        &["request", "response"],
        "Sets a JSON value in the body at the given path.",
    ),
    stmt(
        "json_set_if_absent",
        &["request", "response"],
        "Sets a JSON value only when the path is missing from the body.",
    ),
    stmt(
        "json_del",
        &["request", "response"],
        "Deletes a JSON value from the body at the given path.",
    ),
    stmt(
        "json_rename",
        &["request", "response"],
        "Renames a JSON field in the body.",
    ),
    mode_stmt(
        "req_map",
        &["request"],
        &[
            "openai_chat_to_anthropic_messages",
            "openai_chat_to_openai_responses",
            "openai_chat_to_gemini_generate",
        ],
        "Maps the request body into the upstream format using a built-in mapper.",
    ),
    // response.
    stmt(
        "resp_passthrough",
        &["response"],
        "Forwards the upstream response body unchanged.",
    ),
    mode_stmt(
        "resp_map",
        &["response"],
        &[
            "anthropic_messages_to_openai_chat",
            "openai_responses_to_openai_chat",
            "gemini_generate_to_openai_chat",
        ],
        "Maps the upstream response body back using a built-in mapper.",
    ),
    mode_stmt(
        "sse_parse",
        &["response"],
        &[
            "anthropic_to_openai_chunks",
            "openai_responses_to_openai_chunks",
            "gemini_to_openai_chunks",
        ],
        "Parses upstream SSE chunks with a built-in stream mapper.",
    ),
    stmt(
        "sse_json_del_if",
        &["response"],
        "Drops a JSON field from SSE chunks when the condition holds.",
    ),
    // error.
    mode_stmt(
        "error_map",
        &["error"],
        &["openai", "anthropic", "gemini"],
        "Translates upstream error payloads into a built-in error shape.",
    ),
    // metrics.
    mode_stmt(
        "usage_extract",
        &["metrics"],
        &["openai", "anthropic", "gemini"],
        "Extracts token usage from responses with a built-in extractor.",
    ),
    stmt(
        "input_tokens",
        &["metrics"],
        "Overrides the reported input token count.",
    ),
    stmt(
        "output_tokens",
        &["metrics"],
        "Overrides the reported output token count.",
    ),
    stmt(
        "cache_read_tokens",
        &["metrics"],
        "Overrides the reported cache-read token count.",
    ),
    stmt(
        "cache_write_tokens",
        &["metrics"],
        "Overrides the reported cache-write token count.",
    ),
    stmt(
        "total_tokens",
        &["metrics"],
        "Overrides the reported total token count.",
    ),
    stmt(
        "input_tokens_path",
        &["metrics"],
        "JSON path of the input token count in the response.",
    ),
    stmt(
        "output_tokens_path",
        &["metrics"],
        "JSON path of the output token count in the response.",
    ),
    stmt(
        "cache_read_tokens_path",
        &["metrics"],
        "JSON path of the cache-read token count in the response.",
    ),
    stmt(
        "cache_write_tokens_path",
        &["metrics"],
        "JSON path of the cache-write token count in the response.",
    ),
    mode_stmt(
        "finish_reason_extract",
        &["metrics"],
        &["openai", "anthropic", "gemini"],
        "Extracts the finish reason from responses with a built-in extractor.",
    ),
    stmt(
        "finish_reason_path",
        &["metrics"],
        "JSON path of the finish reason in the response.",
    ),
    // balance.
    mode_stmt(
        "balance_mode",
        &["balance"],
        &["openai", "anthropic"],
        "Built-in balance query shape for the provider account.",
    ),
    enum_stmt(
        "balance_unit",
        &["balance"],
        &["USD", "CNY"],
        "Currency unit reported by the balance query.",
    ),
    stmt(
        "balance_path",
        &["balance"],
        "JSON path of the balance amount in the query response.",
    ),
    // models.
    mode_stmt(
        "models_mode",
        &["models"],
        &["openai", "anthropic", "gemini"],
        "Built-in model listing shape for the provider.",
    ),
    stmt(
        "models_path",
        &["models"],
        "JSON path of the model list in the query response.",
    ),
    enum_stmt(
        "method",
        &["balance", "models"],
        &["GET", "POST"],
        "HTTP method for the query request.",
    ),
];

struct CatalogIndex {
    by_name: HashMap<&'static str, &'static DirectiveMeta>,
    by_block: HashMap<&'static str, Vec<&'static str>>,
    mode_directives: Vec<&'static str>,
}

static INDEX: Lazy<CatalogIndex> = Lazy::new(|| {
    let mut by_name = HashMap::new();
    let mut by_block: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    let mut mode_directives = Vec::new();
    for meta in DIRECTIVES {
        by_name.insert(meta.name, meta);
        for b in meta.blocks {
            by_block.entry(*b).or_default().push(meta.name);
        }
        if !meta.modes.is_empty() {
            mode_directives.push(meta.name);
        }
    }
    for names in by_block.values_mut() {
        names.sort_unstable();
    }
    mode_directives.sort_unstable();
    CatalogIndex {
        by_name,
        by_block,
        mode_directives,
    }
});

/// Looks up a directive by name.
pub fn lookup(name: &str) -> Option<&'static DirectiveMeta> {
    INDEX.by_name.get(name).copied()
}

/// Directives legal in `block`, alphabetized for completion stability.
pub fn directives_in_block(block: &str) -> &'static [&'static str] {
    INDEX
        .by_block
        .get(block)
        .map(|names| names.as_slice())
        .unwrap_or(&[])
}

/// Blocks a directive is legal in, with the top-level pseudo-block filtered.
pub fn allowed_blocks(name: &str) -> Vec<&'static str> {
    lookup(name)
        .map(|meta| {
            meta.blocks
                .iter()
                .copied()
                .filter(|b| *b != TOP)
                .collect()
        })
        .unwrap_or_default()
}

/// Looks up a directive only if it is legal in the given block.
pub fn directive_in_block(name: &str, block: &str) -> Option<&'static DirectiveMeta> {
    lookup(name).filter(|meta| meta.blocks.contains(&block))
}

pub fn in_block(name: &str, block: &str) -> bool {
    directive_in_block(name, block).is_some()
}

/// True when the name introduces a brace-delimited block.
pub fn is_block_keyword(name: &str) -> bool {
    lookup(name).map(|meta| meta.is_block).unwrap_or(false)
}

/// Allowed mode tokens for the directive; empty when it takes no mode.
pub fn modes_for(name: &str) -> &'static [&'static str] {
    lookup(name).map(|meta| meta.modes).unwrap_or(&[])
}

/// All directives that take a mode argument, alphabetized.
pub fn mode_directive_names() -> &'static [&'static str] {
    &INDEX.mode_directives
}

/// Enum values legal at the given argument index; only index 0 carries any.
pub fn enum_values(name: &str, arg_index: usize) -> &'static [&'static str] {
    if arg_index != 0 {
        return &[];
    }
    lookup(name).map(|meta| meta.enum_values).unwrap_or(&[])
}

/// Hover markdown for the directive, preferring block-specific text.
pub fn hover(name: &str, block: &str) -> Option<&'static str> {
    let meta = lookup(name)?;
    let specific = meta
        .hover_by_block
        .iter()
        .find(|(b, _)| *b == block)
        .map(|(_, text)| *text);
    specific.or(if meta.hover.is_empty() {
        None
    } else {
        Some(meta.hover)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_lists_provider_and_syntax() {
        assert_eq!(directives_in_block(TOP), ["provider", "syntax"]);
    }

    #[test]
    fn block_lists_are_sorted() {
        let names = directives_in_block("request");
        let mut sorted = names.to_vec();
        sorted.sort_unstable();
        assert_eq!(names, sorted.as_slice());
        assert!(names.contains(&"req_map"));
        assert!(names.contains(&"set_header"));
    }

    #[test]
    fn allowed_blocks_filters_top_level() {
        assert!(allowed_blocks("provider").is_empty());
        assert!(allowed_blocks("no_such_directive").is_empty());
        assert_eq!(allowed_blocks("req_map"), ["request"]);
        assert_eq!(allowed_blocks("set_header"), ["request", "balance", "models"]);
        assert_eq!(allowed_blocks("method"), ["balance", "models"]);
    }

    #[test]
    fn block_keywords_match_brace_introducers() {
        for name in [
            "provider",
            "defaults",
            "match",
            "upstream_config",
            "upstream",
            "auth",
            "request",
            "response",
            "error",
            "metrics",
            "balance",
            "models",
        ] {
            assert!(is_block_keyword(name), "{name} should introduce a block");
        }
        assert!(!is_block_keyword("syntax"));
        assert!(!is_block_keyword("req_map"));
    }

    #[test]
    fn match_is_the_only_header_until_brace_directive() {
        let headered: Vec<_> = DIRECTIVES
            .iter()
            .filter(|meta| meta.header_until_brace)
            .map(|meta| meta.name)
            .collect();
        assert_eq!(headered, ["match"]);
    }

    #[test]
    fn mode_directives_are_listed() {
        let names = mode_directive_names();
        for expected in [
            "balance_mode",
            "error_map",
            "finish_reason_extract",
            "models_mode",
            "oauth_mode",
            "req_map",
            "resp_map",
            "sse_parse",
            "usage_extract",
        ] {
            assert!(names.contains(&expected), "missing mode directive {expected}");
        }
        assert!(modes_for("req_map").contains(&"openai_chat_to_openai_responses"));
        assert!(modes_for("set_header").is_empty());
    }

    #[test]
    fn enum_values_only_at_index_zero() {
        assert_eq!(enum_values("balance_unit", 0), ["USD", "CNY"]);
        assert!(enum_values("balance_unit", 1).is_empty());
        assert!(enum_values("req_map", 0).is_empty());
    }

    #[test]
    fn hover_prefers_block_specific_text() {
        let balance = hover("set_header", "balance").expect("hover text");
        assert!(balance.contains("balance query request"));
        let request = hover("set_header", "request").expect("hover text");
        assert!(!request.contains("balance"));
        assert!(hover("no_such_directive", "request").is_none());
    }

    #[test]
    fn every_directive_has_hover_text() {
        for meta in DIRECTIVES {
            assert!(!meta.hover.is_empty(), "{} lacks hover text", meta.name);
        }
    }
}
