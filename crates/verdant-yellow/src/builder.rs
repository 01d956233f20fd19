//! Assembles green trees from parser events.

use text_size::{TextRange, TextSize};

use crate::green::{GreenElement, GreenNode, GreenToken};
use crate::{SyntaxKind, TokenKind};

/// A parse event emitted by the grammar layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Opens a node. `forward_parent` is the distance to the `Start` of a node
    /// that must be opened before this one (see `precede` in the parser).
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token { kind: TokenKind, len: TextSize },
    Finish,
    Error { message: String, range: TextRange },
}

impl Event {
    /// An abandoned or not yet completed `Start`.
    pub const TOMBSTONE: Self = Self::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None };
}

/// A syntax error recorded while building, kept out of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

/// Result of a green build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Green {
    pub root: GreenNode,
    pub errors: Vec<SyntaxError>,
}

/// Builds a green tree bottom-up.
///
/// Children of open nodes live on a single stack; finishing a node drains its
/// children into a new `GreenNode`. Trivia at either edge of a finished node
/// is left on the stack so it ends up in the parent, except for the outermost
/// node which keeps everything.
#[derive(Default)]
pub struct GreenBuilder {
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
    errors: Vec<SyntaxError>,
}

impl Drop for GreenBuilder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.parents.is_empty() {
            panic!("you should finish every node before dropping `GreenBuilder`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_TREE_SIZE: usize = 1024;

impl GreenBuilder {
    pub fn new() -> Self {
        Self {
            parents: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            children: Vec::with_capacity(DEFAULT_TREE_SIZE),
            errors: Vec::new(),
        }
    }

    /// Replays `events` into a finished tree, resolving forward parents.
    pub fn build(mut events: Vec<Event>) -> Green {
        let mut builder = Self::new();
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == SyntaxKind::TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != SyntaxKind::TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!("forward parent must point at a `Start` event"),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => builder.finish_node(),
                Event::Token { kind, len } => builder.token(kind, len),
                Event::Error { message, range } => builder.error(message, range),
            }
        }

        builder.finish()
    }

    /// Opens a node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    /// Appends a token to the innermost open node.
    pub fn token(&mut self, kind: TokenKind, len: TextSize) {
        self.children.push(GreenToken::new(kind, len).into());
    }

    /// Closes the innermost open node.
    #[track_caller]
    pub fn finish_node(&mut self) {
        let (kind, first_child) = self.parents.pop().expect("no open node to finish");

        let mut start = first_child;
        let mut end = self.children.len();
        if !self.parents.is_empty() {
            while start < end && self.children[start].raw_kind().is_trivia() {
                start += 1;
            }
            while end > start && self.children[end - 1].raw_kind().is_trivia() {
                end -= 1;
            }
        }

        let node = GreenNode::new(kind, self.children.drain(start..end));
        self.children.insert(start, node.into());
    }

    /// Records an error without touching the tree.
    pub fn error(&mut self, message: impl Into<String>, range: TextRange) {
        self.errors.push(SyntaxError { message: message.into(), range });
    }

    /// Returns the finished tree. Exactly one node must have been built at
    /// the outermost level.
    #[track_caller]
    pub fn finish(mut self) -> Green {
        assert!(self.parents.is_empty(), "unfinished nodes left in the builder");
        assert_eq!(self.children.len(), 1, "expected exactly one root element");

        let root = match self.children.pop() {
            Some(GreenElement::Node(root)) => root,
            _ => panic!("the root element must be a node"),
        };
        Green { root, errors: std::mem::take(&mut self.errors) }
    }
}

#[cfg(test)]
mod tests {
    use text_size::{TextRange, TextSize};

    use super::{Event, GreenBuilder};
    use crate::SyntaxKind::{self, *};
    use crate::TokenKind::{self, *};
    use crate::RawKind;

    fn start(kind: SyntaxKind) -> Event {
        Event::Start { kind, forward_parent: None }
    }

    fn token(kind: TokenKind, len: u32) -> Event {
        Event::Token { kind, len: TextSize::new(len) }
    }

    fn kinds(node: &crate::GreenNode) -> Vec<RawKind> {
        node.children().iter().map(|child| child.raw_kind()).collect()
    }

    fn n(kind: SyntaxKind) -> RawKind {
        RawKind::from(kind)
    }

    fn t(kind: TokenKind) -> RawKind {
        RawKind::from(kind)
    }

    #[test]
    fn trivia_floats_out_of_inner_nodes() {
        // `var x `
        let green = GreenBuilder::build(vec![
            start(SOURCE),
            start(VAR_DECL),
            token(VAR_KW, 3),
            start(NAME),
            token(WHITESPACE, 1),
            token(IDENT, 1),
            token(WHITESPACE, 1),
            Event::Finish,
            Event::Finish,
            Event::Finish,
        ]);

        let root = green.root;
        assert_eq!(root.text_len(), TextSize::new(6));
        assert_eq!(kinds(&root), vec![n(VAR_DECL), t(WHITESPACE)]);

        let decl = root.children()[0].as_node().unwrap();
        assert_eq!(kinds(decl), vec![t(VAR_KW), t(WHITESPACE), n(NAME)]);
        assert_eq!(decl.text_len(), TextSize::new(5));
    }

    #[test]
    fn root_keeps_leading_and_trailing_trivia() {
        let green = GreenBuilder::build(vec![
            start(SOURCE),
            token(LINE_COMMENT, 4),
            token(WHITESPACE, 1),
            Event::Finish,
        ]);

        assert_eq!(kinds(&green.root), vec![t(LINE_COMMENT), t(WHITESPACE)]);
    }

    #[test]
    fn forward_parent_wraps_completed_node() {
        // `a+b`: the BINARY_EXPR start is emitted after the lhs.
        let green = GreenBuilder::build(vec![
            start(SOURCE),
            Event::Start { kind: NAME_REF, forward_parent: Some(3) },
            token(IDENT, 1),
            Event::Finish,
            start(BINARY_EXPR),
            token(PLUS, 1),
            start(NAME_REF),
            token(IDENT, 1),
            Event::Finish,
            Event::Finish,
            Event::Finish,
        ]);

        let root = green.root;
        assert_eq!(kinds(&root), vec![n(BINARY_EXPR)]);
        let binary = root.children()[0].as_node().unwrap();
        assert_eq!(kinds(binary), vec![n(NAME_REF), t(PLUS), n(NAME_REF)]);
    }

    #[test]
    fn tombstones_and_errors() {
        let range = TextRange::new(TextSize::new(0), TextSize::new(1));
        let green = GreenBuilder::build(vec![
            start(SOURCE),
            Event::TOMBSTONE,
            Event::Error { message: "expected expression".to_owned(), range },
            start(ERROR),
            token(UNKNOWN, 1),
            Event::Finish,
            Event::Finish,
        ]);

        assert_eq!(kinds(&green.root), vec![n(ERROR)]);
        assert_eq!(green.errors.len(), 1);
        assert_eq!(green.errors[0].range, range);
    }

    #[test]
    #[should_panic(expected = "unfinished nodes")]
    fn unbalanced_events_panic() {
        GreenBuilder::build(vec![start(SOURCE), start(BLOCK), Event::Finish]);
    }
}
