use anyhow::{Context as _, Result};
use line_index::LineIndex;
use verdant_analysis::{
    DocumentSymbol, Semantics, document_symbols, find_references, find_usages, folding_ranges,
    goto_definition, hover, token_at_cursor,
};
use verdant_parse::Document;

use super::notifications::NotificationDispatcher;
use super::requests::RequestDispatcher;
use super::{Server, Snapshot};
use crate::convert;

pub(crate) fn request(server: &mut Server, request: lsp_server::Request) {
    RequestDispatcher::new(request, server)
        .on::<lsp_types::request::GotoDefinition>(handle_goto_definition)
        .on::<lsp_types::request::References>(handle_references)
        .on::<lsp_types::request::HoverRequest>(handle_hover)
        .on::<lsp_types::request::DocumentSymbolRequest>(handle_document_symbol)
        .on::<lsp_types::request::FoldingRangeRequest>(handle_folding_range)
        .finish();
}

fn handle_goto_definition(
    server: &mut Server,
    params: lsp_types::GotoDefinitionParams,
) -> Result<Option<lsp_types::GotoDefinitionResponse>> {
    let lsp_types::TextDocumentPositionParams { text_document, position } =
        params.text_document_position_params;
    let snapshot = server.snapshot(&text_document.uri)?;
    let offset = snapshot.offset(position)?;
    let sema = Semantics::new(snapshot.tree);

    Ok(goto_definition(&sema, offset).map(|(origin, target)| {
        lsp_types::GotoDefinitionResponse::Link(vec![lsp_types::LocationLink {
            origin_selection_range: Some(snapshot.range(origin)),
            target_uri: text_document.uri.clone(),
            target_range: snapshot.range(target),
            target_selection_range: snapshot.range(target),
        }])
    }))
}

fn handle_references(
    server: &mut Server,
    params: lsp_types::ReferenceParams,
) -> Result<Option<Vec<lsp_types::Location>>> {
    let lsp_types::TextDocumentPositionParams { text_document, position } =
        params.text_document_position;
    let snapshot = server.snapshot(&text_document.uri)?;
    let offset = snapshot.offset(position)?;
    let sema = Semantics::new(snapshot.tree);

    let Some(token) = token_at_cursor(&sema, offset) else {
        return Ok(None);
    };

    let declarations: Vec<_> =
        find_references(&sema, token).into_iter().map(|reference| reference.range).collect();
    let locations = find_usages(&sema, token)
        .into_iter()
        .filter(|range| params.context.include_declaration || !declarations.contains(range))
        .map(|range| lsp_types::Location::new(text_document.uri.clone(), snapshot.range(range)))
        .collect();

    Ok(Some(locations))
}

fn handle_hover(
    server: &mut Server,
    params: lsp_types::HoverParams,
) -> Result<Option<lsp_types::Hover>> {
    let lsp_types::TextDocumentPositionParams { text_document, position } =
        params.text_document_position_params;
    let snapshot = server.snapshot(&text_document.uri)?;
    let offset = snapshot.offset(position)?;
    let sema = Semantics::new(snapshot.tree);

    Ok(hover(&sema, offset).map(|hover| lsp_types::Hover {
        contents: lsp_types::HoverContents::Markup(lsp_types::MarkupContent {
            kind: lsp_types::MarkupKind::Markdown,
            value: format!("```verdant\n{}\n```", hover.label),
        }),
        range: Some(snapshot.range(hover.range)),
    }))
}

#[expect(clippy::needless_pass_by_value)]
fn handle_document_symbol(
    server: &mut Server,
    params: lsp_types::DocumentSymbolParams,
) -> Result<Option<lsp_types::DocumentSymbolResponse>> {
    let snapshot = server.snapshot(&params.text_document.uri)?;
    let symbols = document_symbols(snapshot.tree)
        .into_iter()
        .map(|symbol| to_lsp_symbol(&snapshot, symbol))
        .collect();

    Ok(Some(lsp_types::DocumentSymbolResponse::Nested(symbols)))
}

#[expect(deprecated)]
fn to_lsp_symbol(snapshot: &Snapshot<'_>, symbol: DocumentSymbol) -> lsp_types::DocumentSymbol {
    let children: Vec<_> =
        symbol.children.into_iter().map(|child| to_lsp_symbol(snapshot, child)).collect();

    lsp_types::DocumentSymbol {
        name: symbol.name,
        detail: None,
        kind: convert::symbol_kind(symbol.kind),
        tags: None,
        deprecated: None,
        range: snapshot.range(symbol.range),
        selection_range: snapshot.range(symbol.selection_range),
        children: (!children.is_empty()).then_some(children),
    }
}

#[expect(clippy::needless_pass_by_value)]
fn handle_folding_range(
    server: &mut Server,
    params: lsp_types::FoldingRangeParams,
) -> Result<Option<Vec<lsp_types::FoldingRange>>> {
    let snapshot = server.snapshot(&params.text_document.uri)?;
    let folds = folding_ranges(snapshot.tree)
        .into_iter()
        .map(|fold| convert::folding_range(&snapshot.line_index, fold))
        .collect();

    Ok(Some(folds))
}

pub(crate) fn notification(server: &mut Server, notification: lsp_server::Notification) {
    NotificationDispatcher::new(notification, server)
        .on::<lsp_types::notification::DidOpenTextDocument>(handle_did_open_text_document)
        .on::<lsp_types::notification::DidChangeTextDocument>(handle_did_change_text_document)
        .on::<lsp_types::notification::DidCloseTextDocument>(handle_did_close_text_document)
        .finish();
}

fn handle_did_open_text_document(
    server: &mut Server,
    params: lsp_types::DidOpenTextDocumentParams,
) -> Result<()> {
    let lsp_types::TextDocumentItem { uri, language_id: _, version: _, text } =
        params.text_document;

    tracing::debug!(uri = uri.as_str(), "opened document");
    server.documents.insert(uri.clone(), Document::new(text));
    server.publish_diagnostics(uri);
    Ok(())
}

/// Applies the changes in order, then reparses in the background. Each
/// change is relative to the text left by the previous one.
fn handle_did_change_text_document(
    server: &mut Server,
    params: lsp_types::DidChangeTextDocumentParams,
) -> Result<()> {
    let uri = params.text_document.uri;
    let document = server.document_mut(&uri)?;
    let applied = apply_changes(document, params.content_changes);

    // Earlier changes of a rejected batch are already in the text.
    server.schedule_reparse(&uri);
    applied.with_context(|| format!("invalid change to `{}`", uri.as_str()))
}

fn apply_changes(
    document: &mut Document,
    changes: Vec<lsp_types::TextDocumentContentChangeEvent>,
) -> Result<()> {
    for change in changes {
        let line_index = LineIndex::new(document.text());
        let edit = convert::text_edit(&line_index, document.text(), change)
            .context("content change is out of bounds")?;
        document.apply_edit(edit)?;
    }
    Ok(())
}

fn handle_did_close_text_document(
    server: &mut Server,
    params: lsp_types::DidCloseTextDocumentParams,
) -> Result<()> {
    let uri = params.text_document.uri;
    server.documents.remove(&uri);
    server.publish(uri, Vec::new());
    Ok(())
}
