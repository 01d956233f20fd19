//! Public tree API: an owned [`SyntaxTree`] and borrowed element handles.

use std::fmt;
use std::hash::{Hash, Hasher};

use text_size::{TextRange, TextSize};

use crate::ast::AstNode;
use crate::green::GreenNode;
use crate::red::{Arena, RedNode, Revision};
use crate::{RawKind, SyntaxKind, TokenKind};

/// A source snapshot together with its green tree and materialized arena.
pub struct SyntaxTree {
    text: Box<str>,
    green: GreenNode,
    arena: Arena,
}

impl SyntaxTree {
    /// Materializes `green` against `text`. The green tree must span exactly
    /// the given text.
    #[track_caller]
    pub fn new(text: impl Into<Box<str>>, green: GreenNode) -> Self {
        let text = text.into();
        assert_eq!(
            usize::from(green.text_len()),
            text.len(),
            "green tree length does not match the source text"
        );
        let arena = Arena::build(&green, green.element_count());
        Self { text, green, arena }
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the immutable green root, for structural sharing and diffing.
    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[inline]
    pub fn revision(&self) -> Revision {
        self.arena.revision()
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, index: 0 }
    }

    /// Resolves a detached id, or `None` if it belongs to another revision.
    #[inline]
    pub fn try_node(&self, id: NodeId) -> Option<SyntaxNode<'_>> {
        if id.revision != self.revision() || id.index as usize >= self.arena.len() {
            return None;
        }
        Some(SyntaxNode { tree: self, index: id.index })
    }

    /// Resolves a detached id, panicking if it belongs to another revision.
    #[track_caller]
    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        self.try_node(id).unwrap_or_else(|| {
            panic!(
                "stale node id {id:?}: the tree is at revision {}",
                self.revision().get()
            )
        })
    }

    /// Innermost element whose range contains `offset`. Offsets at or past the
    /// end of the text resolve to the root.
    pub fn node_at_offset(&self, offset: TextSize) -> SyntaxNode<'_> {
        let mut node = self.root();
        while let Some(child) = node.child_containing(offset) {
            node = child;
        }
        node
    }

    /// Tokens touching `offset`: one inside a token, two on a boundary.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxNode<'_>> {
        let len = TextSize::of(self.text());
        let right = (offset < len).then(|| self.node_at_offset(offset));
        let left = (offset > TextSize::new(0) && offset <= len)
            .then(|| self.node_at_offset(offset - TextSize::new(1)));

        match (left, right) {
            (Some(left), Some(right)) if left != right => TokenAtOffset::Between(left, right),
            (Some(token), _) | (None, Some(token)) => TokenAtOffset::Single(token),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// Smallest element whose range fully covers `range`.
    pub fn covering_element(&self, range: TextRange) -> SyntaxNode<'_> {
        let mut node = self.root();
        'descend: loop {
            for child in node.children() {
                let child_range = child.range();
                if child_range.contains_range(range)
                    && (range.is_empty() || !child_range.is_empty())
                {
                    node = child;
                    continue 'descend;
                }
            }
            return node;
        }
    }

    /// The `n`-th node of type `N` in document order.
    pub fn get_element<'a, N: AstNode<'a>>(&'a self, n: usize) -> Option<N> {
        self.elements::<N>().nth(n)
    }

    /// All nodes of type `N` in document order.
    pub fn elements<'a, N: AstNode<'a>>(&'a self) -> impl Iterator<Item = N> {
        self.root().descendants().filter_map(N::cast)
    }

    /// Indented dump of the whole tree, one element per line.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            let line = match node.raw_kind() {
                RawKind::Node(kind) => format!("{kind:?}@{:?}", node.range()),
                RawKind::Token(kind) => format!("{kind:?}@{:?} {:?}", node.range(), node.text()),
            };
            out.push_str(&" ".repeat(depth * 2));
            out.push_str(&line);
            out.push('\n');
            stack.extend(node.children().rev().map(|child| (child, depth + 1)));
        }
        out
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text_len", &self.text.len())
            .field("revision", &self.revision().get())
            .finish_non_exhaustive()
    }
}

/// Trees are equal when they lay out the same green tree over the same text,
/// whatever their revisions.
impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.green == other.green
    }
}

impl Eq for SyntaxTree {}

/// Arena position tagged with the revision that produced it. Unlike
/// [`SyntaxNode`] it does not borrow the tree, so it may be stored; resolving it
/// against a rebuilt tree is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    revision: Revision,
}

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn revision(self) -> Revision {
        self.revision
    }
}

/// Handle to one arena element, a composite node or a token, tied to the
/// lifetime of its tree. Identity is the pair of arena revision and index.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a SyntaxTree,
    index: u32,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    fn at(self, index: usize) -> Self {
        Self { tree: self.tree, index: index as u32 }
    }

    #[inline]
    fn red(self) -> &'a RedNode {
        &self.tree.arena[self.index as usize]
    }

    #[inline]
    pub fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    #[inline]
    pub fn id(self) -> NodeId {
        NodeId { index: self.index, revision: self.tree.revision() }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn raw_kind(self) -> RawKind {
        self.red().kind()
    }

    /// Node kind, `None` for tokens.
    #[inline]
    pub fn kind(self) -> Option<SyntaxKind> {
        self.raw_kind().into_node()
    }

    /// Token kind, `None` for composite nodes.
    #[inline]
    pub fn token_kind(self) -> Option<TokenKind> {
        self.raw_kind().into_token()
    }

    #[inline]
    pub fn is(self, kind: impl Into<RawKind>) -> bool {
        self.raw_kind() == kind.into()
    }

    #[inline]
    pub fn is_node(self) -> bool {
        self.raw_kind().is_node()
    }

    #[inline]
    pub fn is_token(self) -> bool {
        self.raw_kind().is_token()
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        self.raw_kind().is_trivia()
    }

    /// Absolute range in the tree's source text.
    #[inline]
    pub fn range(self) -> TextRange {
        self.red().range()
    }

    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.range()]
    }

    #[inline]
    pub fn parent(self) -> Option<Self> {
        self.red().parent().map(|parent| self.at(parent))
    }

    /// This element followed by its parents up to the root.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |it| it.parent())
    }

    /// Direct children, tokens included.
    #[inline]
    pub fn children(self) -> Children<'a> {
        let (next, end) = match self.red().children() {
            Some(range) => (range.first() as u32, range.last() as u32 + 1),
            None => (0, 0),
        };
        Children { tree: self.tree, next, end }
    }

    /// Direct children that are composite nodes.
    #[inline]
    pub fn child_nodes(self) -> impl DoubleEndedIterator<Item = SyntaxNode<'a>> + Clone {
        self.children().filter(|child| child.is_node())
    }

    /// Direct children that are tokens.
    #[inline]
    pub fn child_tokens(self) -> impl DoubleEndedIterator<Item = SyntaxNode<'a>> + Clone {
        self.children().filter(|child| child.is_token())
    }

    #[inline]
    pub fn first_child(self) -> Option<Self> {
        self.children().next()
    }

    #[inline]
    pub fn last_child(self) -> Option<Self> {
        self.children().next_back()
    }

    /// Position of this element among its parent's children.
    #[inline]
    pub fn position_in_parent(self) -> Option<usize> {
        let parent = self.parent()?;
        let siblings = parent.red().children()?;
        Some(self.index() - siblings.first())
    }

    #[inline]
    pub fn next_sibling(self) -> Option<Self> {
        let siblings = self.parent()?.red().children()?;
        (self.index() < siblings.last()).then(|| self.at(self.index() + 1))
    }

    #[inline]
    pub fn prev_sibling(self) -> Option<Self> {
        let siblings = self.parent()?.red().children()?;
        (self.index() > siblings.first()).then(|| self.at(self.index() - 1))
    }

    /// Child positions leading from the root down to this element.
    pub fn path_from_root(self) -> Vec<usize> {
        let mut path: Vec<usize> = self.ancestors().filter_map(Self::position_in_parent).collect();
        path.reverse();
        path
    }

    /// This element and everything below it, in document order.
    #[inline]
    pub fn descendants(self) -> Descendants<'a> {
        Descendants { tree: self.tree, stack: vec![self.index] }
    }

    /// Leaf tokens of this subtree, in document order.
    #[inline]
    pub fn tokens(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.descendants().filter(|node| node.is_token())
    }

    /// First leaf token, skipping nothing.
    pub fn first_token(self) -> Option<Self> {
        let mut node = self;
        while node.is_node() {
            node = node.first_child()?;
        }
        Some(node)
    }

    /// Last leaf token, skipping nothing.
    pub fn last_token(self) -> Option<Self> {
        let mut node = self;
        while node.is_node() {
            node = node.last_child()?;
        }
        Some(node)
    }

    /// Direct child whose range contains `offset`.
    fn child_containing(self, offset: TextSize) -> Option<Self> {
        let range = self.red().children()?;
        let children = &self.tree.arena.as_slice()[range.indices()];
        let pos = children.partition_point(|child| child.range().end() <= offset);
        let child = children.get(pos)?;
        child.range().contains(offset).then(|| self.at(range.first() + pos))
    }

    /// One-line description: index, kind, range, child index range and parent.
    pub fn debug_dump(self) -> String {
        let red = self.red();
        let kind = match red.kind() {
            RawKind::Node(kind) => format!("Node({kind:?})"),
            RawKind::Token(kind) => format!("Token({kind:?})"),
        };
        let children = match red.children() {
            Some(range) => format!("{}..={}", range.first(), range.last()),
            None => "-".to_owned(),
        };
        let parent = match red.parent() {
            Some(parent) => format!("#{parent}"),
            None => "-".to_owned(),
        };
        format!("#{} {kind} {:?} children={children} parent={parent}", self.index, red.range())
    }
}

impl PartialEq for SyntaxNode<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.tree.revision() == other.tree.revision()
    }
}

impl Eq for SyntaxNode<'_> {}

impl Hash for SyntaxNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.revision().hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_dump())
    }
}

/// Iterator over the contiguous children of a node.
#[derive(Clone)]
pub struct Children<'a> {
    tree: &'a SyntaxTree,
    next: u32,
    end: u32,
}

impl<'a> Iterator for Children<'a> {
    type Item = SyntaxNode<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        (self.next < self.end).then(|| {
            let node = SyntaxNode { tree: self.tree, index: self.next };
            self.next += 1;
            node
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.end - self.next) as usize;
        (len, Some(len))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n as u32).min(self.end);
        self.next()
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        (self.next < self.end).then(|| {
            self.end -= 1;
            SyntaxNode { tree: self.tree, index: self.end }
        })
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Preorder traversal in document order.
#[derive(Clone)]
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<u32>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = SyntaxNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = SyntaxNode { tree: self.tree, index };
        if let Some(children) = node.red().children() {
            self.stack.extend((children.first() as u32..=children.last() as u32).rev());
        }
        Some(node)
    }
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, _) => Some(left),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::None) {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, right) => {
                *self = Self::Single(right);
                Some(left)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::None => (0, Some(0)),
            Self::Single(_) => (1, Some(1)),
            Self::Between(_, _) => (2, Some(2)),
        }
    }
}

impl<T> ExactSizeIterator for TokenAtOffset<T> {}
