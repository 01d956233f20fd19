use text_size::TextRange;
use verdant_yellow::{SyntaxKind, SyntaxTree, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldKind {
    Block,
    /// Object and array literals.
    Literal,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold {
    pub range: TextRange,
    pub kind: FoldKind,
}

/// Regions that span more than one line, in document order.
pub fn folding_ranges(tree: &SyntaxTree) -> Vec<Fold> {
    tree.root()
        .descendants()
        .filter_map(|element| {
            let kind = if element.is(SyntaxKind::BLOCK) {
                FoldKind::Block
            } else if element.is(SyntaxKind::OBJECT_EXPR) || element.is(SyntaxKind::ARRAY_EXPR) {
                FoldKind::Literal
            } else if element.is(TokenKind::BLOCK_COMMENT) {
                FoldKind::Comment
            } else {
                return None;
            };
            element.text().contains('\n').then(|| Fold { range: element.range(), kind })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use text_size::TextRange;

    use super::{Fold, FoldKind, folding_ranges};

    fn fold(start: u32, end: u32, kind: FoldKind) -> Fold {
        Fold { range: TextRange::new(start.into(), end.into()), kind }
    }

    #[test]
    fn multiline_regions() {
        let text = "/* a\n b */\nfunction f() {\n  var o = {\n    a: [1,\n 2]};\n}\nvar x = { y: 1 };";
        let tree = verdant_parse::parse(text).syntax_tree(text);

        assert_eq!(
            folding_ranges(&tree),
            [
                fold(0, 10, FoldKind::Comment),
                fold(24, 56, FoldKind::Block),
                fold(36, 53, FoldKind::Literal),
                fold(45, 52, FoldKind::Literal),
            ]
        );
    }
}
