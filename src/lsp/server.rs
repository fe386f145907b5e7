//! tower-lsp based Language Server implementation.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use super::hover::build_hover_content;

use crate::config::Config;
use crate::docs::DocTarget;
use crate::resolver::{is_keyword_document, keyword_span, DEFAULT_EXTENSIONS};
use crate::session::KeywordSession;

pub const CMD_OPEN_DOCUMENTATION: &str = "cmghelp.openKeywordDocumentation";
pub const CMD_ENABLE: &str = "cmghelp.enable";
pub const CMD_DISABLE: &str = "cmghelp.disable";
pub const CMD_RELOAD: &str = "cmghelp.reload";

/// Shared state that can be cloned into spawned tasks via Arc.
struct State {
    client: Client,
    session: KeywordSession,
    config: Mutex<Config>,
    documents: DashMap<String, (i32, String)>,
}

impl State {
    fn new(client: Client, config: Config) -> Self {
        Self {
            client,
            session: KeywordSession::new(),
            config: Mutex::new(config),
            documents: DashMap::new(),
        }
    }

    /// (Re)build the keyword index from the current config, reporting failures to the user
    async fn reload(&self) {
        let config = self.config.lock().await.clone();
        match self.session.reload(&config) {
            Ok(index) => {
                if index.substituted() {
                    self.client
                        .log_message(
                            MessageType::WARNING,
                            format!(
                                "Version {} is not in the keyword dictionary; using {}. Available: {}",
                                index.settings().version,
                                index.effective_version(),
                                index.available_versions().join(", ")
                            ),
                        )
                        .await;
                }
            }
            Err(e) => {
                self.client
                    .show_message(MessageType::ERROR, format!("CMG Help: {}", e.chain()))
                    .await;
            }
        }
    }

    fn accepts(&self, uri: &Url) -> bool {
        let Ok(path) = uri.to_file_path() else {
            return false;
        };
        match self.session.index() {
            Some(index) => is_keyword_document(&path, &index.settings().file_extensions),
            None => is_keyword_document(&path, &DEFAULT_EXTENSIONS),
        }
    }

    fn document_line(&self, uri: &str, line: usize) -> Option<String> {
        let entry = self.documents.get(uri)?;
        entry.1.lines().nth(line).map(str::to_string)
    }

    /// Locate the manual page and ask the client to show it
    async fn open_documentation(&self, input: &str) {
        let Some(index) = self.session.index() else {
            self.client
                .show_message(MessageType::ERROR, "CMG Help: keyword dictionary is not loaded")
                .await;
            return;
        };

        let target = DocTarget::parse(input);
        tracing::info!(?target, "opening documentation");
        let location = match index.locate_documentation(&target) {
            Ok(location) => location,
            Err(e) => {
                self.client
                    .show_message(MessageType::ERROR, format!("CMG Help: {}", e.chain()))
                    .await;
                return;
            }
        };

        let Some(uri) = page_url(&location.path, &target) else {
            tracing::warn!(path = %location.path.display(), "page path is not absolute");
            return;
        };
        let shown = self
            .client
            .show_document(ShowDocumentParams {
                uri,
                external: Some(true),
                take_focus: Some(true),
                selection: None,
            })
            .await;
        if let Err(e) = shown {
            tracing::warn!("client could not show document: {e}");
        }
    }

    async fn set_enabled(&self, enabled: bool) {
        self.session.set_enabled(enabled);
        self.config.lock().await.disable = Some(!enabled);
        let state = if enabled { "enabled" } else { "disabled" };
        self.client
            .show_message(MessageType::INFO, format!("CMG Help has been {state}."))
            .await;
    }
}

/// `file://` URI of a manual page, keeping a link's fragment
fn page_url(path: &Path, target: &DocTarget) -> Option<Url> {
    let mut url = Url::from_file_path(path).ok()?;
    if let DocTarget::Page {
        fragment: Some(fragment),
        ..
    } = target
    {
        url.set_fragment(Some(fragment));
    }
    Some(url)
}

/// LSP character offset (UTF-16 code units) of a byte offset within `line`
fn utf16_column(line: &str, byte: usize) -> u32 {
    line[..byte].encode_utf16().count() as u32
}

pub struct Backend {
    state: Arc<State>,
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(opts) = params.initialization_options {
            match Config::from_json(&opts) {
                Ok(options) => {
                    let mut config = self.state.config.lock().await;
                    *config = config.clone().overlay(options);
                }
                Err(e) => tracing::warn!("ignoring malformed initialization options: {e}"),
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        CMD_OPEN_DOCUMENTATION.to_string(),
                        CMD_ENABLE.to_string(),
                        CMD_DISABLE.to_string(),
                        CMD_RELOAD.to_string(),
                    ],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "cmg-help".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("CMG Help language server initialized");
        self.state.reload().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        self.state
            .documents
            .insert(uri, (params.text_document.version, params.text_document.text));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();
        if let Some(change) = params.content_changes.into_iter().last() {
            self.state
                .documents
                .insert(uri, (params.text_document.version, change.text));
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state
            .documents
            .remove(&params.text_document.uri.to_string());
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        match Config::from_json(&params.settings) {
            Ok(options) => {
                {
                    let mut config = self.state.config.lock().await;
                    *config = config.clone().overlay(options);
                }
                self.state.reload().await;
            }
            Err(e) => tracing::warn!("ignoring malformed settings: {e}"),
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let doc = params.text_document_position_params.text_document.uri;
        let pos = params.text_document_position_params.position;

        if !self.state.accepts(&doc) {
            return Ok(None);
        }
        let Some(line) = self.state.document_line(doc.as_str(), pos.line as usize) else {
            return Ok(None);
        };
        let Some(lookup) = self.state.session.lookup_line(&line) else {
            return Ok(None);
        };

        let page = match (&lookup.record, self.state.session.index()) {
            (Some(_), Some(index)) => {
                let target = DocTarget::Keyword(lookup.keyword.clone());
                match index.locate_documentation(&target) {
                    Ok(location) => page_url(&location.path, &target),
                    Err(e) => {
                        tracing::debug!("no manual page for {}: {e}", lookup.keyword);
                        None
                    }
                }
            }
            _ => None,
        };

        let range = keyword_span(&line).map(|span| Range {
            start: Position {
                line: pos.line,
                character: utf16_column(&line, span.start),
            },
            end: Position {
                line: pos.line,
                character: utf16_column(&line, span.end),
            },
        });

        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: build_hover_content(&lookup, page.as_ref()),
            }),
            range,
        }))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        match params.command.as_str() {
            CMD_OPEN_DOCUMENTATION => {
                match params.arguments.first().and_then(Value::as_str) {
                    Some(input) => self.state.open_documentation(input).await,
                    None => {
                        self.state
                            .client
                            .show_message(
                                MessageType::ERROR,
                                "CMG Help: expected a keyword or page argument",
                            )
                            .await
                    }
                }
            }
            CMD_ENABLE => self.state.set_enabled(true).await,
            CMD_DISABLE => self.state.set_enabled(false).await,
            CMD_RELOAD => self.state.reload().await,
            other => tracing::warn!("unknown command {other}"),
        }
        Ok(None)
    }
}

/// Start the LSP server on stdio.
///
/// `base` comes from CLI flags and the environment; editor settings are
/// layered on top of it.
pub async fn serve_stdio(base: Config) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| Backend {
        state: Arc::new(State::new(client, base.clone())),
    });
    Server::new(stdin, stdout, socket).serve(service).await;
}
