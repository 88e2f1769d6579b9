//! Main language server implementation
//!
//! A thin shim over `onr-analysis`: documents are stored as plain text and
//! every request reparses from the latest buffer. The server is generic over
//! [`LspClient`] so tests can observe published diagnostics without a real
//! editor on the other end, and optionally carries a [`ProviderValidator`]
//! that enables the deep semantic pass.

use std::collections::HashMap;
use std::sync::Arc;

use onr_analysis::validate::ProviderValidator;
use onr_analysis::{
    analyze_document, completion_items, format_document, hover as compute_hover,
    semantic_tokens_data, CompletionCandidate, FormatOptions, SEMANTIC_TOKEN_TYPES,
};
use tokio::sync::RwLock;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse, Diagnostic,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DocumentFormattingParams, Documentation, Hover, HoverContents, HoverParams,
    HoverProviderCapability, InitializeParams, InitializeResult, InitializedParams, MarkupContent,
    MarkupKind, MessageType, OneOf, Position, Range, SemanticToken, SemanticTokenType,
    SemanticTokens,
    SemanticTokensFullOptions, SemanticTokensLegend, SemanticTokensOptions, SemanticTokensParams,
    SemanticTokensResult, SemanticTokensServerCapabilities, ServerCapabilities, ServerInfo,
    TextDocumentItem, TextDocumentSyncCapability, TextDocumentSyncKind, TextEdit, Url,
    WorkDoneProgressOptions,
};
use tower_lsp::Client;

#[async_trait]
pub trait LspClient: Send + Sync + 'static {
    async fn publish_diagnostics(&self, uri: Url, diags: Vec<Diagnostic>, version: Option<i32>);
    async fn log_message(&self, typ: MessageType, message: String);
}

#[async_trait]
impl LspClient for Client {
    async fn publish_diagnostics(&self, uri: Url, diags: Vec<Diagnostic>, version: Option<i32>) {
        self.publish_diagnostics(uri, diags, version).await;
    }

    async fn log_message(&self, typ: MessageType, message: String) {
        self.log_message(typ, message).await;
    }
}

#[derive(Default)]
struct DocumentStore {
    entries: RwLock<HashMap<Url, Arc<String>>>,
}

impl DocumentStore {
    async fn upsert(&self, uri: Url, text: String) -> Arc<String> {
        let text = Arc::new(text);
        self.entries.write().await.insert(uri, text.clone());
        text
    }

    async fn get(&self, uri: &Url) -> Option<Arc<String>> {
        self.entries.read().await.get(uri).cloned()
    }

    async fn remove(&self, uri: &Url) {
        self.entries.write().await.remove(uri);
    }
}

pub struct OnrLanguageServer<C = Client> {
    client: C,
    documents: DocumentStore,
    validator: Option<Arc<dyn ProviderValidator>>,
}

impl OnrLanguageServer<Client> {
    pub fn new(client: Client) -> Self {
        Self::with_validator(client, None)
    }
}

impl<C: LspClient> OnrLanguageServer<C> {
    pub fn with_validator(client: C, validator: Option<Arc<dyn ProviderValidator>>) -> Self {
        Self {
            client,
            documents: DocumentStore::default(),
            validator,
        }
    }

    async fn store_and_publish(&self, uri: Url, text: String) {
        let text = self.documents.upsert(uri.clone(), text).await;
        let analysis = analyze_document(uri.as_str(), &text, self.validator.as_deref());
        if let Some(error) = analysis.setup_error {
            self.client.log_message(MessageType::ERROR, error).await;
        }
        self.client
            .publish_diagnostics(uri, analysis.diagnostics, None)
            .await;
    }

    async fn document(&self, uri: &Url) -> Option<Arc<String>> {
        self.documents.get(uri).await
    }
}

fn semantic_tokens_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: SEMANTIC_TOKEN_TYPES
            .iter()
            .copied()
            .map(SemanticTokenType::new)
            .collect(),
        token_modifiers: Vec::new(),
    }
}

fn to_completion_item(candidate: CompletionCandidate) -> CompletionItem {
    CompletionItem {
        label: candidate.label,
        kind: Some(candidate.kind),
        detail: Some(candidate.detail),
        documentation: Some(Documentation::String(candidate.documentation)),
        ..Default::default()
    }
}

fn decode_token_data(data: Vec<u32>) -> Vec<SemanticToken> {
    data.chunks_exact(5)
        .map(|chunk| SemanticToken {
            delta_line: chunk[0],
            delta_start: chunk[1],
            length: chunk[2],
            token_type: chunk[3],
            token_modifiers_bitset: chunk[4],
        })
        .collect()
}

fn full_document_range(text: &str) -> Range {
    let mut line = 0u32;
    let mut col = 0u32;
    for b in text.bytes() {
        if b == b'\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    Range {
        start: Position::new(0, 0),
        end: Position::new(line, col),
    }
}

#[async_trait]
impl<C: LspClient> tower_lsp::LanguageServer for OnrLanguageServer<C> {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            completion_provider: Some(CompletionOptions {
                resolve_provider: Some(false),
                trigger_characters: Some(vec![" ".to_string(), "_".to_string()]),
                work_done_progress_options: WorkDoneProgressOptions::default(),
                all_commit_characters: None,
                ..Default::default()
            }),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            semantic_tokens_provider: Some(
                SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                    legend: semantic_tokens_legend(),
                    range: None,
                    full: Some(SemanticTokensFullOptions::Bool(true)),
                }),
            ),
            document_formatting_provider: Some(OneOf::Left(true)),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "onr-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {}

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem { uri, text, .. } = params.text_document;
        self.store_and_publish(uri, text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.store_and_publish(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        if let Some(text) = self.document(&uri).await {
            let position = params.text_document_position.position;
            let items: Vec<CompletionItem> = completion_items(&text, position)
                .into_iter()
                .map(to_completion_item)
                .collect();
            Ok(Some(CompletionResponse::Array(items)))
        } else {
            Ok(None)
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        if let Some(text) = self.document(&uri).await {
            let position = params.text_document_position_params.position;
            if let Some(result) = compute_hover(&text, position) {
                return Ok(Some(Hover {
                    contents: HoverContents::Markup(MarkupContent {
                        kind: MarkupKind::Markdown,
                        value: result.contents,
                    }),
                    range: Some(result.range),
                }));
            }
        }
        Ok(None)
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        if let Some(text) = self.document(&params.text_document.uri).await {
            let data = decode_token_data(semantic_tokens_data(&text));
            Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
                result_id: None,
                data,
            })))
        } else {
            Ok(None)
        }
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        if let Some(text) = self.document(&uri).await {
            let opts = FormatOptions {
                tab_size: params.options.tab_size,
                insert_spaces: params.options.insert_spaces,
            };
            let formatted = format_document(&text, opts);
            if formatted == *text.as_str() {
                return Ok(Some(Vec::new()));
            }
            Ok(Some(vec![TextEdit {
                range: full_document_range(&text),
                new_text: formatted,
            }]))
        } else {
            Ok(None)
        }
    }
}
