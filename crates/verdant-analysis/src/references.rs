use text_size::TextRange;
use verdant_yellow::SyntaxKind::{MEMBER_EXPR, NAME, NAME_REF};
use verdant_yellow::SyntaxNode;
use verdant_yellow::ast::{AstNode as _, MemberExpr, Name, NameRef};

use crate::Semantics;
use crate::scope::{Declaration, DeclarationKind, is_member_name};

/// A declaration site a node refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    pub declaration: Declaration,
    /// Range of the declaration's name.
    pub range: TextRange,
}

/// The declaration sites `node` resolves to.
///
/// `node` may be a name reference, a member access, a declaration name, or a
/// token inside one of them. Anything else has no references.
pub fn find_references<'a>(sema: &Semantics<'a>, node: SyntaxNode<'a>) -> Vec<Reference> {
    referenced_declaration(sema, node)
        .and_then(|declaration| {
            let name = sema.declaration_name(declaration)?;
            Some(Reference { declaration, range: name.range() })
        })
        .into_iter()
        .collect()
}

/// Every site bound to the declaration `node` refers to: the declaration
/// name itself and all its uses, in document order.
pub fn find_usages<'a>(sema: &Semantics<'a>, node: SyntaxNode<'a>) -> Vec<TextRange> {
    let Some(declaration) = referenced_declaration(sema, node) else {
        return Vec::new();
    };

    let mut ranges: Vec<_> = sema.declaration_name(declaration).map(|name| name.range()).into_iter().collect();

    if declaration.kind() == DeclarationKind::Property {
        let members = sema.tree().elements::<MemberExpr<'_>>().filter(|&member| {
            sema.resolve_member(member).and_then(|member| member.declaration) == Some(declaration)
        });
        ranges.extend(members.filter_map(MemberExpr::member).map(|name| name.range()));
    } else {
        let uses = sema.name_refs().filter(|&name_ref| sema.resolve_name(name_ref) == Some(declaration));
        ranges.extend(uses.map(|name_ref| name_ref.range()));
    }

    ranges.sort_by_key(|range| range.start());
    ranges
}

pub(crate) fn referenced_declaration<'a>(
    sema: &Semantics<'a>,
    node: SyntaxNode<'a>,
) -> Option<Declaration> {
    let node = if node.is_token() { node.parent()? } else { node };

    match node.kind()? {
        NAME_REF => {
            let name_ref = NameRef::cast(node)?;
            if is_member_name(name_ref) {
                let member = node.parent().and_then(MemberExpr::cast)?;
                sema.resolve_member(member)?.declaration
            } else {
                sema.resolve_name(name_ref)
            }
        }
        MEMBER_EXPR => sema.resolve_member(MemberExpr::cast(node)?)?.declaration,
        NAME => sema.declaration(Name::cast(node)?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use text_size::{TextRange, TextSize};
    use verdant_yellow::SyntaxTree;

    use super::{find_references, find_usages};
    use crate::Semantics;

    fn tree(text: &str) -> SyntaxTree {
        verdant_parse::parse(text).syntax_tree(text)
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn reference_to_member_receiver() {
        let text = "var obj = {a: 'true'}; var val = obj.a;";
        let tree = tree(text);
        let sema = Semantics::new(&tree);

        let obj = tree.node_at_offset(TextSize::new(34)).parent().unwrap();
        assert_eq!(obj.text(), "obj");

        let references = find_references(&sema, obj);
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].range, range(4, 7));
    }

    #[test]
    fn member_name_resolves_to_the_key() {
        let text = "var obj = {a: 'true'}; var val = obj.a;";
        let tree = tree(text);
        let sema = Semantics::new(&tree);

        let member = tree.node_at_offset(TextSize::new(37));
        let references = find_references(&sema, member);
        assert_eq!(references.iter().map(|r| r.range).collect::<Vec<_>>(), [range(11, 12)]);
        assert_eq!(find_usages(&sema, member), [range(11, 12), range(37, 38)]);
    }

    #[test]
    fn usages_of_a_variable() {
        let text = "var n = 1; n = n + 1; { var n = 2; n; }";
        let tree = tree(text);
        let sema = Semantics::new(&tree);

        let declaration = tree.node_at_offset(TextSize::new(4));
        assert_eq!(find_usages(&sema, declaration), [range(4, 5), range(11, 12), range(15, 16)]);

        let inner = tree.node_at_offset(TextSize::new(35));
        assert_eq!(find_usages(&sema, inner), [range(28, 29), range(35, 36)]);
    }

    #[test]
    fn nothing_to_reference() {
        let text = "1 + unknown;";
        let tree = tree(text);
        let sema = Semantics::new(&tree);

        assert!(find_references(&sema, tree.node_at_offset(TextSize::new(0))).is_empty());
        assert!(find_references(&sema, tree.node_at_offset(TextSize::new(5))).is_empty());
        assert!(find_usages(&sema, tree.root()).is_empty());
    }
}
