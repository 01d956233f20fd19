//! Parser, incremental reparser and edit coordinator.

mod document;
mod edit;
mod grammar;
mod parser;
mod reparsing;
#[cfg(test)]
mod tests;

pub use document::{Document, DocumentState, ReparseOutcome, ReparseTask, StaleReparse};
pub use edit::{EditError, TextEdit};
pub use reparsing::{ReparseKind, Reparsed, reparse};
use salsa::Database;
use verdant_errors::Diagnostic;
use verdant_inputs::File;
use verdant_tokenizer::LexError;
use verdant_yellow::{Green, GreenBuilder, GreenNode, SyntaxError, SyntaxKind, SyntaxTree, TokenKind};

/// A green tree together with the diagnostics found while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    green: GreenNode,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    pub(crate) fn new(green: GreenNode, mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by_key(|diagnostic| (diagnostic.range().start(), diagnostic.range().end()));
        Self { green, diagnostics }
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Lexer and parser diagnostics, ordered by position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Lays the green tree out over `text`, which must be the parsed text.
    pub fn syntax_tree(&self, text: &str) -> SyntaxTree {
        SyntaxTree::new(text, self.green.clone())
    }
}

/// Parses a whole document. Never fails: malformed input ends up in `ERROR`
/// nodes and diagnostics.
pub fn parse(text: &str) -> Parse {
    let (tokens, lex_errors) = verdant_tokenizer::tokenize(text);
    let mut parser = parser::Parser::new(&tokens);
    grammar::items::source(&mut parser);
    let Green { root, errors } = GreenBuilder::build(parser.finish());
    Parse::new(root, collect_diagnostics(lex_errors, errors))
}

/// Parses `text` as exactly one block.
///
/// Returns `None` unless the text starts with `{`, and the block production
/// consumes all of it and ends on the final `}`.
pub(crate) fn parse_block(text: &str) -> Option<Parse> {
    let (tokens, lex_errors) = verdant_tokenizer::tokenize(text);
    if tokens.first().map(|token| token.kind) != Some(TokenKind::LEFT_BRACE)
        || !braces_close_at_end(&tokens)
    {
        return None;
    }

    let mut parser = parser::Parser::new(&tokens);
    grammar::block(&mut parser);
    if !parser.at(TokenKind::EOF) {
        return None;
    }

    let Green { root, errors } = GreenBuilder::build(parser.finish());
    let closed = root.kind() == SyntaxKind::BLOCK
        && root.text_len() == text_size::TextSize::of(text)
        && root
            .children()
            .last()
            .and_then(|child| child.as_token())
            .is_some_and(|token| token.kind() == TokenKind::RIGHT_BRACE);
    closed.then(|| Parse::new(root, collect_diagnostics(lex_errors, errors)))
}

/// The first `{` is closed by the last token and by nothing before it.
fn braces_close_at_end(tokens: &[verdant_tokenizer::Token]) -> bool {
    let significant = tokens.iter().filter(|token| !token.kind.is_trivia() && token.kind != TokenKind::EOF);
    let count = significant.clone().count();
    let mut depth = 0usize;

    for (index, token) in significant.enumerate() {
        match token.kind {
            TokenKind::LEFT_BRACE => depth += 1,
            TokenKind::RIGHT_BRACE => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return index + 1 == count;
                }
            }
            _ => {}
        }
    }

    false
}

fn collect_diagnostics(lex_errors: Vec<LexError>, errors: Vec<SyntaxError>) -> Vec<Diagnostic> {
    lex_errors
        .into_iter()
        .map(|error| Diagnostic::error(error.message, error.range))
        .chain(errors.into_iter().map(|error| Diagnostic::error(error.message, error.range)))
        .collect()
}

pub trait FileParse {
    fn parse(self, db: &dyn Database) -> &Parse;
    fn syntax_tree(self, db: &dyn Database) -> &SyntaxTree;
}

#[salsa::tracked]
impl FileParse for File {
    #[salsa::tracked(returns(ref))]
    fn parse(self, db: &dyn Database) -> Parse {
        crate::parse(self.text(db))
    }

    #[salsa::tracked(returns(ref), no_eq)]
    fn syntax_tree(self, db: &dyn Database) -> SyntaxTree {
        self.parse(db).syntax_tree(self.text(db))
    }
}
