//! Incremental reparsing of a single edit.
//!
//! Strategies are tried from cheapest to most expensive: relexing the one
//! token the edit falls in, reparsing the innermost enclosing block, and
//! finally parsing the whole document again. Each cheap strategy either
//! produces exactly what a full parse of the new text would, or gives up.

use text_size::{TextRange, TextSize};
use verdant_errors::Diagnostic;
use verdant_tokenizer::tokenize;
use verdant_yellow::SyntaxKind::BLOCK;
use verdant_yellow::TokenKind::{self, *};
use verdant_yellow::{GreenToken, SyntaxNode, SyntaxTree, TokenSet};

use crate::{Parse, TextEdit};

/// Tokens whose text can change without the parser noticing, as long as the
/// kind stays the same.
const RELEXABLE: TokenSet =
    TokenSet::new([WHITESPACE, LINE_COMMENT, BLOCK_COMMENT, IDENT, INT_NUMBER, FLOAT_NUMBER, STRING]);

/// Which strategy produced a reparse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReparseKind {
    Token,
    Block,
    Full,
}

/// Result of applying one edit to a parsed document.
#[derive(Debug, Clone)]
pub struct Reparsed {
    pub text: String,
    pub parse: Parse,
    pub kind: ReparseKind,
}

/// Reparses `old` after `edit`, reusing as much of the old green tree as
/// possible. `diagnostics` are the diagnostics of `old`. The edit must be
/// valid for `old.text()`.
pub fn reparse(old: &SyntaxTree, diagnostics: &[Diagnostic], edit: &TextEdit) -> Reparsed {
    debug_assert_eq!(edit.validate(old.text()), Ok(()));

    let mut text = old.text().to_owned();
    edit.apply(&mut text);

    let (parse, kind) = if let Some(parse) = relex_token(old, diagnostics, edit, &text) {
        (parse, ReparseKind::Token)
    } else if let Some(parse) = reparse_block(old, diagnostics, edit, &text) {
        (parse, ReparseKind::Block)
    } else {
        (crate::parse(&text), ReparseKind::Full)
    };

    tracing::debug!(?kind, range = ?edit.delete, inserted = edit.insert.len(), "reparsed");
    Reparsed { text, parse, kind }
}

fn relex_token(
    old: &SyntaxTree,
    diagnostics: &[Diagnostic],
    edit: &TextEdit,
    new_text: &str,
) -> Option<Parse> {
    let token = old.covering_element(edit.delete);
    let kind = token.token_kind().filter(|&kind| RELEXABLE.contains(kind))?;
    let range = token.range();

    if diagnostics.iter().any(|diagnostic| range.contains(diagnostic.range().start())) {
        tracing::trace!("token relex: the token carries a diagnostic");
        return None;
    }

    let prev = (range.start() > TextSize::new(0))
        .then(|| old.node_at_offset(range.start() - TextSize::new(1)));
    let next = (range.end() < TextSize::of(old.text())).then(|| old.node_at_offset(range.end()));

    let window_start = prev.map_or(range.start(), |prev| prev.range().start());
    let window_end = next.map_or(range.end(), |next| next.range().end());
    let window = TextRange::new(window_start, edit.shift(window_end));

    let (tokens, errors) = tokenize(&new_text[window]);
    if !errors.is_empty() {
        tracing::trace!("token relex: the new text does not lex cleanly");
        return None;
    }

    let expected: Vec<(TokenKind, Option<TextSize>)> = prev
        .into_iter()
        .map(same_len)
        .chain([(kind, None)])
        .chain(next.map(same_len))
        .collect();
    let relexed = &tokens[..tokens.len() - 1];

    let unchanged = relexed.len() == expected.len()
        && relexed.iter().zip(&expected).all(|(token, &(kind, len))| {
            token.kind == kind && len.is_none_or(|len| token.range.len() == len)
        });
    if !unchanged {
        tracing::trace!("token relex: the token boundaries moved");
        return None;
    }

    let new_len = edit.shift(range.end()) - range.start();
    let green = old.green().splice(&token.path_from_root(), GreenToken::new(kind, new_len).into());
    let diagnostics = diagnostics
        .iter()
        .map(|diagnostic| relocate(diagnostic, range.end(), edit))
        .collect();

    Some(Parse::new(green, diagnostics))
}

fn same_len(token: SyntaxNode<'_>) -> (TokenKind, Option<TextSize>) {
    (token.token_kind().unwrap_or(EOF), Some(token.range().len()))
}

fn reparse_block(
    old: &SyntaxTree,
    diagnostics: &[Diagnostic],
    edit: &TextEdit,
    new_text: &str,
) -> Option<Parse> {
    let block = old.covering_element(edit.delete).ancestors().find(|node| {
        let range = node.range();
        node.is(BLOCK) && range.start() < edit.delete.start() && edit.delete.end() < range.end()
    })?;

    // An unclosed block reports its missing `}` at its end, where it cannot
    // be told apart from diagnostics of whatever follows.
    if !block.last_child().is_some_and(|last| last.is(RIGHT_BRACE)) {
        tracing::trace!(range = ?block.range(), "block reparse: the enclosing block is unclosed");
        return None;
    }

    let old_range = block.range();
    let new_range = TextRange::new(old_range.start(), edit.shift(old_range.end()));
    let Some(reparsed) = crate::parse_block(&new_text[new_range]) else {
        tracing::trace!(range = ?old_range, "block reparse: the edited text is no longer one block");
        return None;
    };

    let green = old.green().splice(&block.path_from_root(), reparsed.green().clone().into());

    let inside = |diagnostic: &Diagnostic| {
        let start = diagnostic.range().start();
        old_range.start() < start && start < old_range.end()
    };
    let diagnostics = diagnostics
        .iter()
        .filter(|diagnostic| !inside(diagnostic))
        .map(|diagnostic| relocate(diagnostic, old_range.end(), edit))
        .chain(
            reparsed
                .diagnostics()
                .iter()
                .map(|diagnostic| diagnostic.clone().shifted_forward(old_range.start())),
        )
        .collect();

    Some(Parse::new(green, diagnostics))
}

/// Moves a diagnostic that starts at or after `boundary` (an offset at or
/// after the deleted range) by the edit's length change.
fn relocate(diagnostic: &Diagnostic, boundary: TextSize, edit: &TextEdit) -> Diagnostic {
    let diagnostic = diagnostic.clone();
    if diagnostic.range().start() < boundary {
        return diagnostic;
    }

    let (inserted, deleted) = (edit.insert_len(), edit.delete.len());
    if inserted >= deleted {
        diagnostic.shifted_forward(inserted - deleted)
    } else {
        diagnostic.shifted_back(deleted - inserted)
    }
}
