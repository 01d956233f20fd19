//! Immutable, position-independent tree storing only kinds and lengths.

use std::fmt;

use text_size::TextSize;
use triomphe::Arc;

use crate::{NodeOrToken, RawKind, SyntaxKind, TokenKind};

/// A child of a green node.
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

impl GreenElement {
    /// Length of the source text spanned by this element.
    #[inline]
    pub fn text_len(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.text_len(),
            NodeOrToken::Token(token) => token.text_len(),
        }
    }

    #[inline]
    pub fn raw_kind(&self) -> RawKind {
        match self {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.kind()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.kind()),
        }
    }

    /// Number of elements in this subtree, the element itself included.
    #[inline]
    pub fn element_count(&self) -> usize {
        match self {
            NodeOrToken::Node(node) => node.element_count(),
            NodeOrToken::Token(_) => 1,
        }
    }
}

impl From<GreenNode> for GreenElement {
    #[inline]
    fn from(node: GreenNode) -> Self {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    #[inline]
    fn from(token: GreenToken) -> Self {
        NodeOrToken::Token(token)
    }
}

/// Leaf of the green tree. Tokens do not own their text; the text is recovered
/// from the source snapshot the tree is materialized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GreenToken {
    kind: TokenKind,
    text_len: TextSize,
}

impl GreenToken {
    #[inline]
    pub const fn new(kind: TokenKind, text_len: TextSize) -> Self {
        Self { kind, text_len }
    }

    #[inline]
    pub const fn kind(self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub const fn text_len(self) -> TextSize {
        self.text_len
    }
}

/// Composite green node. Cloning is a reference-count bump, so unchanged
/// subtrees are shared between successive revisions of a document.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

#[derive(PartialEq, Eq, Hash)]
struct GreenNodeData {
    kind: SyntaxKind,
    text_len: TextSize,
    element_count: u32,
    children: Box<[GreenElement]>,
}

impl GreenNode {
    /// Creates a node, summing the lengths of `children`.
    pub fn new(kind: SyntaxKind, children: impl IntoIterator<Item = GreenElement>) -> Self {
        let children: Box<[GreenElement]> = children.into_iter().collect();
        let text_len = children.iter().map(GreenElement::text_len).sum();
        let element_count = 1 + children.iter().map(GreenElement::element_count).sum::<usize>();
        let element_count = u32::try_from(element_count).expect("green tree is too large");

        Self { data: Arc::new(GreenNodeData { kind, text_len, element_count, children }) }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.data.text_len
    }

    #[inline]
    pub fn children(&self) -> &[GreenElement] {
        &self.data.children
    }

    /// Number of nodes and tokens in this subtree, this node included.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.data.element_count as usize
    }

    /// Returns `true` if both handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Returns a copy of this node with the child at `index` replaced.
    /// Every other child is shared with `self`.
    #[track_caller]
    pub fn replace_child(&self, index: usize, new_child: GreenElement) -> Self {
        assert!(index < self.children().len(), "child index {index} out of bounds");
        let children = self
            .children()
            .iter()
            .enumerate()
            .map(|(i, child)| if i == index { new_child.clone() } else { child.clone() });
        Self::new(self.kind(), children)
    }

    /// Replaces the descendant reached by following `path` (child positions
    /// from this node downwards), rebuilding only the nodes along the path.
    #[track_caller]
    pub fn splice(&self, path: &[usize], replacement: GreenElement) -> Self {
        match path {
            [] => match replacement {
                NodeOrToken::Node(node) => node,
                NodeOrToken::Token(_) => panic!("cannot replace a node with a token"),
            },
            [index] => self.replace_child(*index, replacement),
            [index, rest @ ..] => {
                let NodeOrToken::Node(child) = &self.children()[*index] else {
                    panic!("splice path goes through a token");
                };
                self.replace_child(*index, child.splice(rest, replacement).into())
            }
        }
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("text_len", &self.text_len())
            .field("children", &self.children())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::{GreenElement, GreenNode, GreenToken};
    use crate::SyntaxKind::*;
    use crate::TokenKind::*;

    fn token(kind: crate::TokenKind, len: u32) -> GreenElement {
        GreenToken::new(kind, TextSize::new(len)).into()
    }

    #[test]
    fn length_is_sum_of_children() {
        let name = GreenNode::new(NAME, [token(IDENT, 3)]);
        let decl = GreenNode::new(
            VAR_DECL,
            [token(VAR_KW, 3), token(WHITESPACE, 1), GreenElement::from(name), token(SEMICOLON, 1)],
        );

        assert_eq!(decl.text_len(), TextSize::new(8));
        assert_eq!(decl.element_count(), 6);
    }

    #[test]
    fn replace_child_shares_siblings() {
        let lhs = GreenNode::new(NAME_REF, [token(IDENT, 1)]);
        let rhs = GreenNode::new(LITERAL, [token(INT_NUMBER, 1)]);
        let expr =
            GreenNode::new(BINARY_EXPR, [GreenElement::from(lhs.clone()), token(PLUS, 1), rhs.into()]);

        let new_rhs = GreenNode::new(LITERAL, [token(INT_NUMBER, 4)]);
        let edited = expr.replace_child(2, new_rhs.into());

        assert_eq!(edited.text_len(), TextSize::new(6));
        let shared = edited.children()[0].as_node().unwrap();
        assert!(shared.ptr_eq(&lhs));
        assert_ne!(edited, expr);
    }

    #[test]
    fn splice_rebuilds_only_the_path() {
        let inner = GreenNode::new(NAME, [token(IDENT, 1)]);
        let sibling = GreenNode::new(LITERAL, [token(INT_NUMBER, 2)]);
        let decl = GreenNode::new(
            VAR_DECL,
            [GreenElement::from(inner), GreenElement::from(sibling.clone())],
        );
        let root = GreenNode::new(SOURCE, [GreenElement::from(decl), token(WHITESPACE, 1)]);

        let spliced = root.splice(&[0, 0, 0], token(IDENT, 5));

        assert_eq!(spliced.text_len(), TextSize::new(8));
        let decl = spliced.children()[0].as_node().unwrap();
        assert!(decl.children()[1].as_node().unwrap().ptr_eq(&sibling));
    }
}
