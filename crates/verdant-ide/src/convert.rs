//! Conversions between LSP positions (UTF-16 line/column) and byte offsets.

use line_index::{LineIndex, WideEncoding, WideLineCol};
use text_size::{TextRange, TextSize};
use verdant_analysis::{DeclarationKind, Fold, FoldKind};
use verdant_errors::{Diagnostic, Severity};
use verdant_parse::TextEdit;

/// Byte offset of `position`. Columns past the end of a line are clamped to
/// it; lines past the end of the text have no offset.
pub(crate) fn offset(line_index: &LineIndex, position: lsp_types::Position) -> Option<TextSize> {
    let wide = WideLineCol { line: position.line, col: position.character };
    let line_col = line_index.to_utf8(WideEncoding::Utf16, wide)?;
    let line = line_index.line(line_col.line)?;
    Some((line.start() + TextSize::new(line_col.col)).min(line.end()))
}

pub(crate) fn position(line_index: &LineIndex, offset: TextSize) -> lsp_types::Position {
    let line_col = line_index.line_col(offset);
    let wide = line_index
        .to_wide(WideEncoding::Utf16, line_col)
        .unwrap_or(WideLineCol { line: line_col.line, col: line_col.col });
    lsp_types::Position::new(wide.line, wide.col)
}

pub(crate) fn range(line_index: &LineIndex, range: TextRange) -> lsp_types::Range {
    lsp_types::Range::new(position(line_index, range.start()), position(line_index, range.end()))
}

/// A content change against `text`. Changes without a range replace the
/// whole text.
pub(crate) fn text_edit(
    line_index: &LineIndex,
    text: &str,
    change: lsp_types::TextDocumentContentChangeEvent,
) -> Option<TextEdit> {
    let delete = match change.range {
        Some(lsp_types::Range { start, end }) => {
            TextRange::new(offset(line_index, start)?, offset(line_index, end)?)
        }
        None => TextRange::up_to(TextSize::of(text)),
    };
    Some(TextEdit::replace(delete, change.text))
}

pub(crate) fn diagnostic(line_index: &LineIndex, diagnostic: &Diagnostic) -> lsp_types::Diagnostic {
    let severity = match diagnostic.severity() {
        Severity::Error => lsp_types::DiagnosticSeverity::ERROR,
        Severity::Warning => lsp_types::DiagnosticSeverity::WARNING,
    };

    lsp_types::Diagnostic::new(
        range(line_index, diagnostic.range()),
        Some(severity),
        None,
        Some("verdant".to_owned()),
        diagnostic.message().to_owned(),
        None,
        None,
    )
}

pub(crate) fn symbol_kind(kind: DeclarationKind) -> lsp_types::SymbolKind {
    match kind {
        DeclarationKind::Variable | DeclarationKind::Parameter => lsp_types::SymbolKind::VARIABLE,
        DeclarationKind::Function => lsp_types::SymbolKind::FUNCTION,
        DeclarationKind::Property => lsp_types::SymbolKind::PROPERTY,
    }
}

pub(crate) fn folding_range(line_index: &LineIndex, fold: Fold) -> lsp_types::FoldingRange {
    let range = range(line_index, fold.range);
    let kind = match fold.kind {
        FoldKind::Comment => lsp_types::FoldingRangeKind::Comment,
        FoldKind::Block | FoldKind::Literal => lsp_types::FoldingRangeKind::Region,
    };

    lsp_types::FoldingRange {
        start_line: range.start.line,
        start_character: Some(range.start.character),
        end_line: range.end.line,
        end_character: Some(range.end.character),
        kind: Some(kind),
        collapsed_text: None,
    }
}

#[cfg(test)]
mod tests {
    use line_index::LineIndex;
    use lsp_types::Position;
    use text_size::{TextRange, TextSize};

    use super::{offset, position, text_edit};

    #[test]
    fn utf16_columns() {
        let text = "var s = 'é𝄞';\nvar t = s;";
        let line_index = LineIndex::new(text);

        // `é` is one UTF-16 unit and two bytes, `𝄞` two units and four bytes.
        assert_eq!(offset(&line_index, Position::new(0, 12)), Some(TextSize::new(15)));
        assert_eq!(position(&line_index, TextSize::new(15)), Position::new(0, 12));
        assert_eq!(position(&line_index, TextSize::new(18)), Position::new(1, 0));
    }

    #[test]
    fn columns_are_clamped() {
        let line_index = LineIndex::new("ab\ncd");
        assert_eq!(offset(&line_index, Position::new(1, 10)), Some(TextSize::new(5)));
        assert_eq!(offset(&line_index, Position::new(4, 0)), None);
    }

    #[test]
    fn content_changes() {
        let text = "var a = 1;\nvar b = a;";
        let line_index = LineIndex::new(text);

        let change = lsp_types::TextDocumentContentChangeEvent {
            range: Some(lsp_types::Range::new(Position::new(1, 8), Position::new(1, 9))),
            range_length: None,
            text: "a + 1".to_owned(),
        };
        let edit = text_edit(&line_index, text, change).unwrap();
        assert_eq!(edit.delete, TextRange::new(19.into(), 20.into()));
        assert_eq!(edit.insert, "a + 1");

        let change = lsp_types::TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: String::new(),
        };
        let edit = text_edit(&line_index, text, change).unwrap();
        assert_eq!(edit.delete, TextRange::up_to(TextSize::of(text)));
    }
}
