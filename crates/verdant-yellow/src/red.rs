//! Flat, index-addressed materialization of a green tree.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::ops::Index;
use std::sync::atomic::{AtomicU32, Ordering};

use text_size::TextRange;

use crate::green::GreenNode;
use crate::{NodeOrToken, RawKind};

/// Identifies one arena build. Every call to [`Arena::build`] gets a fresh
/// revision, so handles from different builds never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(NonZeroU32);

impl Revision {
    fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        let raw = NEXT.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU32::new(raw).expect("arena revision counter overflowed"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Inclusive range of arena indices holding the direct children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildRange {
    first: u32,
    last: u32,
}

impl ChildRange {
    #[inline]
    pub fn first(self) -> usize {
        self.first as usize
    }

    #[inline]
    pub fn last(self) -> usize {
        self.last as usize
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> usize {
        (self.last - self.first) as usize + 1
    }

    #[inline]
    pub fn contains(self, index: usize) -> bool {
        self.first() <= index && index <= self.last()
    }

    #[inline]
    pub fn indices(self) -> std::ops::RangeInclusive<usize> {
        self.first()..=self.last()
    }
}

/// A materialized node or token: kind, absolute range and index links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RedNode {
    kind: RawKind,
    range: TextRange,
    parent: Option<u32>,
    children: Option<ChildRange>,
}

impl RedNode {
    #[inline]
    pub fn kind(&self) -> RawKind {
        self.kind
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Arena index of the parent, `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent.map(|parent| parent as usize)
    }

    /// Arena indices of the direct children, `None` for tokens and empty nodes.
    #[inline]
    pub fn children(&self) -> Option<ChildRange> {
        self.children
    }
}

/// Every element of one green tree laid out breadth-first.
///
/// Index 0 is the root, and the children of any node occupy a contiguous
/// index range ordered left to right.
#[derive(Debug, Clone)]
pub struct Arena {
    nodes: Vec<RedNode>,
    revision: Revision,
}

impl Arena {
    /// Expands `root` breadth-first. `estimated_len` is the expected number of
    /// elements, normally `root.element_count()`.
    pub fn build(root: &GreenNode, estimated_len: usize) -> Self {
        let mut nodes = Vec::with_capacity(estimated_len);
        nodes.push(RedNode {
            kind: NodeOrToken::Node(root.kind()),
            range: TextRange::up_to(root.text_len()),
            parent: None,
            children: None,
        });

        let mut queue = VecDeque::with_capacity(64);
        queue.push_back((0u32, root));

        while let Some((parent, green)) = queue.pop_front() {
            let parent_range = nodes[parent as usize].range;
            let first = nodes.len();
            let mut offset = parent_range.start();

            for child in green.children() {
                let range = TextRange::at(offset, child.text_len());
                offset = range.end();

                let index = arena_index(nodes.len());
                nodes.push(RedNode {
                    kind: child.raw_kind(),
                    range,
                    parent: Some(parent),
                    children: None,
                });

                if let NodeOrToken::Node(node) = child {
                    queue.push_back((index, node));
                }
            }

            assert_eq!(
                offset,
                parent_range.end(),
                "children of #{parent} do not exactly span {parent_range:?}",
            );

            if nodes.len() > first {
                nodes[parent as usize].children =
                    Some(ChildRange { first: arena_index(first), last: arena_index(nodes.len() - 1) });
            }
        }

        Self { nodes, revision: Revision::next() }
    }

    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&RedNode> {
        self.nodes.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[RedNode] {
        &self.nodes
    }
}

impl Index<usize> for Arena {
    type Output = RedNode;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &RedNode {
        &self.nodes[index]
    }
}

#[inline]
#[track_caller]
fn arena_index(index: usize) -> u32 {
    u32::try_from(index).expect("arena index does not fit in u32")
}

#[cfg(test)]
mod tests {
    use text_size::{TextRange, TextSize};

    use super::Arena;
    use crate::SyntaxKind::*;
    use crate::TokenKind::*;
    use crate::{GreenElement, GreenNode, GreenToken, NodeOrToken};

    fn token(kind: crate::TokenKind, len: u32) -> GreenElement {
        GreenToken::new(kind, TextSize::new(len)).into()
    }

    // var x = 1;
    fn var_decl() -> GreenNode {
        let name = GreenNode::new(NAME, [token(IDENT, 1)]);
        let literal = GreenNode::new(LITERAL, [token(INT_NUMBER, 1)]);
        let decl = GreenNode::new(
            VAR_DECL,
            [
                token(VAR_KW, 3),
                token(WHITESPACE, 1),
                GreenElement::from(name),
                token(WHITESPACE, 1),
                token(EQ, 1),
                token(WHITESPACE, 1),
                GreenElement::from(literal),
                token(SEMICOLON, 1),
            ],
        );
        GreenNode::new(SOURCE, [GreenElement::from(decl)])
    }

    #[test]
    fn breadth_first_layout() {
        let green = var_decl();
        let arena = Arena::build(&green, green.element_count());

        assert_eq!(arena.len(), green.element_count());
        assert_eq!(arena[0].parent(), None);
        assert_eq!(arena[0].range(), TextRange::up_to(TextSize::new(10)));

        let decl = arena[0].children().unwrap();
        assert_eq!((decl.first(), decl.last()), (1, 1));

        let decl_children = arena[1].children().unwrap();
        assert_eq!(decl_children.indices(), 2..=9);
        assert_eq!(arena[4].kind(), NodeOrToken::Node(NAME));
        assert_eq!(arena[4].range(), TextRange::new(TextSize::new(4), TextSize::new(5)));

        // The children of NAME and LITERAL are appended after the whole level.
        assert_eq!(arena[4].children().unwrap().first(), 10);
        assert_eq!(arena[8].children().unwrap().first(), 11);
        assert_eq!(arena[11].range(), TextRange::new(TextSize::new(8), TextSize::new(9)));
    }

    #[test]
    fn every_child_lies_within_its_parent_range() {
        let green = var_decl();
        let arena = Arena::build(&green, 0);

        for (index, node) in arena.as_slice().iter().enumerate().skip(1) {
            let parent = &arena[node.parent().unwrap()];
            assert!(parent.children().unwrap().contains(index));
            assert!(parent.range().contains_range(node.range()));
        }
    }

    #[test]
    fn rebuilding_is_idempotent_but_gets_a_new_revision() {
        let green = var_decl();
        let first = Arena::build(&green, green.element_count());
        let second = Arena::build(&green, green.element_count());

        assert_eq!(first.as_slice(), second.as_slice());
        assert_ne!(first.revision(), second.revision());
    }
}
