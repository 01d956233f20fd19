//! Lossless syntax trees in two layers.
//!
//! The green tree is immutable and position independent: nodes store only
//! kinds, lengths and children, so unchanged subtrees are shared between
//! revisions of a document. A [`SyntaxTree`] pairs a green root with its
//! source text and lays every element out in a flat, breadth-first
//! [`Arena`] carrying absolute ranges and parent/child indices.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod builder;
mod green;
mod red;
mod syntax;
mod syntax_kind;
mod token_set;

/// Event-driven construction of green trees.
pub use builder::{Event, Green, GreenBuilder, SyntaxError};
/// Immutable, shareable tree storage.
pub use green::{GreenElement, GreenNode, GreenToken};
/// Breadth-first arena materialization.
pub use red::{Arena, ChildRange, RedNode, Revision};
/// Primary syntax tree API types and adapters.
pub use syntax::{
    Children, Descendants, NodeId, NodeOrToken, SyntaxNode, SyntaxTree, TokenAtOffset,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::{RawKind, SyntaxKind, TokenKind};
/// Compact set for grouping `TokenKind` values.
pub use token_set::TokenSet;
