mod api;
mod notifications;
mod requests;

use std::collections::HashMap;
use std::thread;

use anyhow::{Context as _, Result};
use crossbeam_channel::{Receiver, Sender, select};
use line_index::LineIndex;
use text_size::{TextRange, TextSize};
use verdant_analysis::{Semantics, semantic_diagnostics};
use verdant_parse::{Document, DocumentState, ReparseOutcome};
use verdant_yellow::SyntaxTree;

use crate::convert;

type Reparsed = (lsp_types::Uri, ReparseOutcome);

pub struct Server {
    connection: lsp_server::Connection,
    io_threads: Option<lsp_server::IoThreads>,
    documents: HashMap<lsp_types::Uri, Document>,
    reparse_sender: Sender<Reparsed>,
    reparse_receiver: Receiver<Reparsed>,
}

impl Server {
    fn server_capabilities() -> lsp_types::ServerCapabilities {
        lsp_types::ServerCapabilities {
            position_encoding: Some(lsp_types::PositionEncodingKind::UTF16),
            text_document_sync: Some(lsp_types::TextDocumentSyncCapability::Options(
                lsp_types::TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(lsp_types::TextDocumentSyncKind::INCREMENTAL),
                    ..Default::default()
                },
            )),
            definition_provider: Some(lsp_types::OneOf::Left(true)),
            references_provider: Some(lsp_types::OneOf::Left(true)),
            hover_provider: Some(lsp_types::HoverProviderCapability::Simple(true)),
            document_symbol_provider: Some(lsp_types::OneOf::Left(true)),
            folding_range_provider: Some(lsp_types::FoldingRangeProviderCapability::Simple(true)),
            ..lsp_types::ServerCapabilities::default()
        }
    }

    /// Performs the initialize handshake over stdio.
    pub fn new() -> Result<Self> {
        let (connection, io_threads) = lsp_server::Connection::stdio();
        Self::initialize(connection, Some(io_threads))
    }

    /// Performs the initialize handshake over an existing connection.
    pub fn initialize(
        connection: lsp_server::Connection,
        io_threads: Option<lsp_server::IoThreads>,
    ) -> Result<Self> {
        let (initialize_id, _initialize_params) = match connection.initialize_start() {
            Ok(it) => it,
            Err(protocol_error) => {
                if protocol_error.channel_is_disconnected()
                    && let Some(io_threads) = io_threads
                {
                    io_threads.join()?;
                }
                return Err(protocol_error.into());
            }
        };

        let initialize_data = serde_json::json!({
            "capabilities": Self::server_capabilities(),
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        if let Err(protocol_error) = connection.initialize_finish(initialize_id, initialize_data) {
            if protocol_error.channel_is_disconnected()
                && let Some(io_threads) = io_threads
            {
                io_threads.join()?;
            }
            return Err(protocol_error.into());
        }

        tracing::info!("language server initialized");
        let (reparse_sender, reparse_receiver) = crossbeam_channel::unbounded();
        Ok(Self {
            connection,
            io_threads,
            documents: HashMap::default(),
            reparse_sender,
            reparse_receiver,
        })
    }

    /// Serves requests until the client shuts the server down.
    pub fn run(mut self) -> Result<()> {
        self.main_loop()?;

        let Self { connection, io_threads, .. } = self;
        drop(connection);
        if let Some(io_threads) = io_threads {
            io_threads.join()?;
        }

        tracing::info!("language server stopped");
        Ok(())
    }

    fn main_loop(&mut self) -> Result<()> {
        let receiver = self.connection.receiver.clone();
        let reparsed = self.reparse_receiver.clone();

        loop {
            select! {
                recv(receiver) -> message => {
                    let Ok(message) = message else { return Ok(()) };
                    match message {
                        lsp_server::Message::Request(request) => {
                            if self.connection.handle_shutdown(&request)? {
                                return Ok(());
                            }
                            api::request(self, request);
                        }
                        lsp_server::Message::Response(_response) => {}
                        lsp_server::Message::Notification(notification) => {
                            api::notification(self, notification);
                        }
                    }
                }
                recv(reparsed) -> outcome => {
                    if let Ok((uri, outcome)) = outcome {
                        self.install(uri, outcome);
                    }
                }
            }
        }
    }

    fn send(&self, message: lsp_server::Message) {
        if let Err(error) = self.connection.sender.send(message) {
            tracing::error!(%error, "client connection closed");
        }
    }

    fn respond(&self, response: lsp_server::Response) {
        self.send(response.into());
    }

    fn document_mut(&mut self, uri: &lsp_types::Uri) -> Result<&mut Document> {
        self.documents.get_mut(uri).with_context(|| format!("document `{}` is not open", uri.as_str()))
    }

    /// The document's tree brought up to date with its text, reparsing on
    /// this thread if a background reparse has not landed yet. The background
    /// outcome is then stale, so the diagnostics are published here.
    fn snapshot(&mut self, uri: &lsp_types::Uri) -> Result<Snapshot<'_>> {
        let document = self.document_mut(uri)?;
        if document.state() != DocumentState::Clean {
            document.sync();
            self.publish_diagnostics(uri.clone());
        }

        let tree = self.document_mut(uri)?.sync();
        Ok(Snapshot { line_index: LineIndex::new(tree.text()), tree })
    }

    /// Hands the document's pending edits to a worker thread.
    fn schedule_reparse(&mut self, uri: &lsp_types::Uri) {
        let Some(task) = self.documents.get_mut(uri).and_then(Document::begin_reparse) else {
            return;
        };

        let sender = self.reparse_sender.clone();
        let uri = uri.clone();
        thread::spawn(move || {
            let generation = task.generation();
            match task.run() {
                Some(outcome) => {
                    // The server may already be gone.
                    _ = sender.send((uri, outcome));
                }
                None => tracing::debug!(generation, "reparse cancelled by a newer edit"),
            }
        });
    }

    fn install(&mut self, uri: lsp_types::Uri, outcome: ReparseOutcome) {
        let Some(document) = self.documents.get_mut(&uri) else {
            tracing::debug!(uri = uri.as_str(), "reparse finished for a closed document");
            return;
        };

        let kind = outcome.kind();
        match document.install(outcome) {
            Ok(()) => {
                tracing::debug!(uri = uri.as_str(), ?kind, "installed reparse");
                self.publish_diagnostics(uri);
            }
            Err(stale) => tracing::debug!(%stale, "dropped reparse"),
        }
    }

    /// Publishes diagnostics for the document's installed tree. Does nothing
    /// while the tree lags behind the text.
    fn publish_diagnostics(&self, uri: lsp_types::Uri) {
        let Some(document) = self.documents.get(&uri) else { return };
        if document.state() != DocumentState::Clean {
            return;
        }

        let tree = document.syntax_tree();
        let line_index = LineIndex::new(tree.text());
        let sema = Semantics::new(tree);
        let mut diagnostics: Vec<_> = document.diagnostics().to_vec();
        diagnostics.extend(semantic_diagnostics(&sema));
        diagnostics.sort_by_key(|diagnostic| diagnostic.range().start());

        let diagnostics = diagnostics
            .iter()
            .map(|diagnostic| convert::diagnostic(&line_index, diagnostic))
            .collect();
        self.publish(uri, diagnostics);
    }

    fn publish(&self, uri: lsp_types::Uri, diagnostics: Vec<lsp_types::Diagnostic>) {
        let notification = new_notification::<lsp_types::notification::PublishDiagnostics>(
            lsp_types::PublishDiagnosticsParams { uri, diagnostics, version: None },
        );
        match notification {
            Ok(notification) => self.send(notification.into()),
            Err(error) => tracing::error!(%error, "failed to encode diagnostics"),
        }
    }
}

/// An up to date tree with its line index.
struct Snapshot<'a> {
    tree: &'a SyntaxTree,
    line_index: LineIndex,
}

impl Snapshot<'_> {
    fn offset(&self, position: lsp_types::Position) -> Result<TextSize> {
        convert::offset(&self.line_index, position)
            .with_context(|| format!("position {}:{} is out of bounds", position.line, position.character))
    }

    fn range(&self, range: TextRange) -> lsp_types::Range {
        convert::range(&self.line_index, range)
    }
}

fn from_json<T: serde::de::DeserializeOwned>(
    what: &'static str,
    json: &serde_json::Value,
) -> Result<T> {
    serde_json::from_value(json.clone())
        .map_err(|e| anyhow::format_err!("Failed to deserialize {what}: {e}; {json}"))
}

fn result_to_response<R>(
    id: lsp_server::RequestId,
    result: Result<R::Result>,
) -> lsp_server::Response
where
    R: lsp_types::request::Request,
    R::Params: serde::de::DeserializeOwned,
    R::Result: serde::Serialize,
{
    match result {
        Ok(resp) => lsp_server::Response::new_ok(id, &resp),
        Err(error) => lsp_server::Response::new_err(
            id,
            lsp_server::ErrorCode::InternalError as i32,
            format!("{error:#}"),
        ),
    }
}

fn new_notification<N>(params: N::Params) -> Result<lsp_server::Notification>
where
    N: lsp_types::notification::Notification,
{
    Ok(lsp_server::Notification { method: N::METHOD.to_owned(), params: serde_json::to_value(params)? })
}
