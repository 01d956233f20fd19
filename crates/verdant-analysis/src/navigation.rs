use text_size::{TextRange, TextSize};
use verdant_yellow::ast::{AstNode as _, Expr, Literal};
use verdant_yellow::{SyntaxNode, TokenAtOffset, TokenKind};

use crate::Semantics;
use crate::references::{find_references, referenced_declaration};
use crate::scope::{Declaration, DeclarationKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    /// The token the cursor is on.
    pub range: TextRange,
    pub label: String,
}

/// Picks the token under the cursor, preferring the highest ranked kind when
/// the offset sits between two tokens.
pub fn pick_best_token<'a>(
    tokens: TokenAtOffset<SyntaxNode<'a>>,
    f: impl Fn(TokenKind) -> usize,
) -> Option<SyntaxNode<'a>> {
    tokens.max_by_key(|token| token.token_kind().map_or(0, &f))
}

/// The token a cursor at `offset` is on, preferring names and literals.
pub fn token_at_cursor<'a>(sema: &Semantics<'a>, offset: TextSize) -> Option<SyntaxNode<'a>> {
    let tokens = sema.tree().token_at_offset(offset);
    pick_best_token(tokens, |kind| match kind {
        TokenKind::IDENT => 3,
        TokenKind::INT_NUMBER
        | TokenKind::FLOAT_NUMBER
        | TokenKind::STRING
        | TokenKind::TRUE_KW
        | TokenKind::FALSE_KW
        | TokenKind::NULL_KW => 2,
        kind if kind.is_trivia() => 0,
        _ => 1,
    })
}

/// The range under the cursor and the name of the declaration it refers to.
pub fn goto_definition(sema: &Semantics<'_>, offset: TextSize) -> Option<(TextRange, TextRange)> {
    let token = token_at_cursor(sema, offset)?;
    let reference = find_references(sema, token).into_iter().next()?;
    Some((token.range(), reference.range))
}

pub fn hover(sema: &Semantics<'_>, offset: TextSize) -> Option<HoverResult> {
    let token = token_at_cursor(sema, offset)?;

    let label = match referenced_declaration(sema, token) {
        Some(declaration) => declaration_label(sema, declaration)?,
        None => {
            let literal = token.parent().and_then(Literal::cast)?;
            sema.type_of_expr(Expr::Literal(literal)).to_string()
        }
    };

    Some(HoverResult { range: token.range(), label })
}

fn declaration_label(sema: &Semantics<'_>, declaration: Declaration) -> Option<String> {
    let name = sema.declaration_name(declaration)?.text();
    let ty = sema.type_of_declaration(declaration);

    Some(match declaration.kind() {
        DeclarationKind::Variable => format!("var {name}: {ty}"),
        DeclarationKind::Function => ty.to_string(),
        DeclarationKind::Parameter => format!("param {name}: {ty}"),
        DeclarationKind::Property => format!("property {name}: {ty}"),
    })
}

#[cfg(test)]
mod tests {
    use text_size::{TextRange, TextSize};
    use verdant_yellow::SyntaxTree;

    use super::{goto_definition, hover};
    use crate::Semantics;

    const CURSOR_MARKER: &str = "$0";

    fn with_cursor(fixture: &str) -> (SyntaxTree, TextSize) {
        let offset = fixture.find(CURSOR_MARKER).expect("no cursor marker in fixture");
        let text = fixture.replacen(CURSOR_MARKER, "", 1);
        let tree = verdant_parse::parse(&text).syntax_tree(&text);
        (tree, TextSize::try_from(offset).unwrap())
    }

    #[track_caller]
    fn check_definition(fixture: &str, expected: &str) {
        let (tree, offset) = with_cursor(fixture);
        let sema = Semantics::new(&tree);

        let (origin, target) = goto_definition(&sema, offset).expect("no definition found");
        assert!(origin.contains_inclusive(offset));
        assert_eq!(&tree.text()[target], expected);
        assert!(target.end() < origin.start());
    }

    #[track_caller]
    fn check_hover(fixture: &str, expected: &str) {
        let (tree, offset) = with_cursor(fixture);
        let sema = Semantics::new(&tree);
        assert_eq!(hover(&sema, offset).map(|hover| hover.label).as_deref(), Some(expected));
    }

    #[test]
    fn definition_of_a_hoisted_function() {
        let (tree, offset) = with_cursor("var x = 42;\nfunction add(a) { return a + x; }\nadd$0(x);");
        let sema = Semantics::new(&tree);

        assert_eq!(
            goto_definition(&sema, offset),
            Some((TextRange::new(46.into(), 49.into()), TextRange::new(21.into(), 24.into())))
        );
    }

    #[test]
    fn definition_of_a_captured_variable() {
        check_definition("var x = 42;\nfunction add(a) { return a + $0x; }", "x");
        check_definition("function add(count) { return co$0unt; }", "count");
    }

    #[test]
    fn no_definition() {
        let (tree, offset) = with_cursor("var x = missing$0;");
        let sema = Semantics::new(&tree);
        assert_eq!(goto_definition(&sema, offset), None);

        let (tree, offset) = with_cursor("va$0r x = 1;");
        let sema = Semantics::new(&tree);
        assert_eq!(goto_definition(&sema, offset), None);
    }

    #[test]
    fn hover_shows_inferred_types() {
        check_hover("var obj = {a: 'true'}; var v$0al = obj.a;", "var val: string");
        check_hover("var obj = {a: 'true'}; var val = obj.$0a;", "property a: string");
        check_hover("var obj = {a: 'true'}; var val = o$0bj.a;", "var obj: { a: string }");
        check_hover("function f(p) { return $0p; }", "param p: unknown");
        check_hover("function f(p) {} f$0(1);", "function f(p)");
        check_hover("var n = 1$0.5;", "number");
    }

    #[test]
    fn hover_on_punctuation() {
        let (tree, offset) = with_cursor("var n = 1 $0+ 2;");
        let sema = Semantics::new(&tree);
        assert_eq!(hover(&sema, offset), None);
    }
}
