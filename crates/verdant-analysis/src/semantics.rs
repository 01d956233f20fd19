use rustc_hash::FxHashMap;
use verdant_yellow::SyntaxTree;
use verdant_yellow::ast::{AstNode as _, Expr, MemberExpr, Name, NameRef, VarDecl};

use crate::infer::InferenceContext;
use crate::scope::{Declaration, DeclarationKind, Scopes, is_member_name};
use crate::ty::{Member, Ty};

/// Name resolution and types for one syntax tree.
pub struct Semantics<'a> {
    tree: &'a SyntaxTree,
    scopes: Scopes,
    types: FxHashMap<Declaration, Ty>,
}

impl<'a> Semantics<'a> {
    pub fn new(tree: &'a SyntaxTree) -> Self {
        let scopes = Scopes::build(tree);
        let mut types = FxHashMap::default();

        let variables: Vec<_> = scopes
            .declarations()
            .filter(|declaration| declaration.kind() == DeclarationKind::Variable)
            .collect();
        for declaration in variables {
            let var = declaration
                .name(tree)
                .and_then(|name| name.syntax().parent())
                .and_then(VarDecl::cast);
            let ty = match var {
                Some(var) => InferenceContext { scopes: &scopes, types: &types }.infer_var(var),
                None => Ty::Unknown,
            };
            types.insert(declaration, ty);
        }

        tracing::trace!(declarations = types.len(), "built semantic model");
        Self { tree, scopes, types }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    fn ctx(&self) -> InferenceContext<'_> {
        InferenceContext { scopes: &self.scopes, types: &self.types }
    }

    /// The declaration a name reference binds to. Member names never resolve
    /// here; see [`Semantics::resolve_member`].
    pub fn resolve_name(&self, name_ref: NameRef<'a>) -> Option<Declaration> {
        self.scopes.resolve(name_ref)
    }

    /// The member a `receiver.member` expression selects, when the receiver's
    /// type is known.
    pub fn resolve_member(&self, member: MemberExpr<'a>) -> Option<Member> {
        self.ctx().infer_member(member)
    }

    /// The declaration `name` introduces.
    pub fn declaration(&self, name: Name<'a>) -> Option<Declaration> {
        Declaration::of(name)
    }

    pub fn declaration_name(&self, declaration: Declaration) -> Option<Name<'a>> {
        declaration.name(self.tree)
    }

    pub fn type_of_expr(&self, expr: Expr<'a>) -> Ty {
        self.ctx().infer_expr(expr)
    }

    pub fn type_of_declaration(&self, declaration: Declaration) -> Ty {
        self.ctx().declaration_ty(declaration, self.tree)
    }

    /// Every scoped declaration: variables, functions and parameters.
    pub fn declarations(&self) -> impl Iterator<Item = Declaration> + '_ {
        self.scopes.declarations()
    }

    /// Name references outside member position that bind to nothing, in
    /// document order.
    pub fn unresolved_names(&self) -> impl Iterator<Item = NameRef<'a>> + '_ {
        self.name_refs().filter(|&name_ref| self.resolve_name(name_ref).is_none())
    }

    /// Name references outside member position, in document order.
    pub fn name_refs(&self) -> impl Iterator<Item = NameRef<'a>> + '_ {
        let tree = self.tree;
        self.scopes
            .references()
            .filter_map(move |id| tree.try_node(id))
            .filter_map(NameRef::cast)
            .filter(|&name_ref| !is_member_name(name_ref))
    }
}

#[cfg(test)]
mod tests {
    use verdant_yellow::SyntaxTree;
    use verdant_yellow::ast::{AstNode as _, Expr, MemberExpr, NameRef, VarDecl};

    use super::Semantics;
    use crate::scope::DeclarationKind;

    fn tree(text: &str) -> SyntaxTree {
        verdant_parse::parse(text).syntax_tree(text)
    }

    fn resolve_all(text: &str) -> Vec<(String, Option<u32>)> {
        let tree = tree(text);
        let sema = Semantics::new(&tree);
        tree.elements::<NameRef<'_>>()
            .filter(|name_ref| !crate::scope::is_member_name(*name_ref))
            .map(|name_ref| {
                let target = sema
                    .resolve_name(name_ref)
                    .and_then(|declaration| sema.declaration_name(declaration))
                    .map(|name| name.range().start().into());
                (format!("{}@{:?}", name_ref.text(), name_ref.range()), target)
            })
            .collect()
    }

    #[test]
    fn variables_shadow_in_sequence() {
        let text = "var x = 1; var y = x; var x = x; x;";
        assert_eq!(
            resolve_all(text),
            [
                ("x@19..20".to_owned(), Some(4)),
                ("x@30..31".to_owned(), Some(4)),
                ("x@33..34".to_owned(), Some(26)),
            ]
        );
    }

    #[test]
    fn functions_are_hoisted_and_params_scoped() {
        let text = "f(a); function f(a) { return a; } a;";
        assert_eq!(
            resolve_all(text),
            [
                ("f@0..1".to_owned(), Some(15)),
                ("a@2..3".to_owned(), None),
                ("a@29..30".to_owned(), Some(17)),
                ("a@34..35".to_owned(), None),
            ]
        );
    }

    #[test]
    fn block_bindings_do_not_escape() {
        let text = "{ var inner = 1; } inner; if (1) var other = 2; other;";
        let tree = tree(text);
        let sema = Semantics::new(&tree);
        let unresolved: Vec<_> = sema.unresolved_names().map(|name_ref| name_ref.text()).collect();
        assert_eq!(unresolved, ["inner", "other"]);
    }

    #[test]
    fn member_type_comes_from_the_object_literal() {
        let text = "var obj = {a: 'true'}; var val = obj.a;";
        let tree = tree(text);
        let sema = Semantics::new(&tree);

        let val = tree.get_element::<VarDecl<'_>>(1).unwrap();
        let declaration = sema.declaration(val.name().unwrap()).unwrap();
        assert_eq!(declaration.kind(), DeclarationKind::Variable);
        assert_eq!(sema.type_of_declaration(declaration).to_string(), "string");

        let member = tree.get_element::<MemberExpr<'_>>(0).unwrap();
        let resolved = sema.resolve_member(member).unwrap();
        let key = sema.declaration_name(resolved.declaration.unwrap()).unwrap();
        assert_eq!((key.text(), key.range()), ("a", text_size::TextRange::new(11.into(), 12.into())));
    }

    #[test]
    fn inferred_types() {
        let text = "function f(p) {} var o = {n: 1, s: 'x' + 1, l: [1, 2], m: [1, 'a'], c: f(1)};\
                    o; o.l[0]; o.l.length; -o.s; !o; o.n < 2; f; p;";
        let tree = tree(text);
        let sema = Semantics::new(&tree);

        let types: Vec<String> = tree
            .elements::<verdant_yellow::ast::ExprStmt<'_>>()
            .filter_map(|stmt| stmt.expr())
            .map(|expr: Expr<'_>| sema.type_of_expr(expr).to_string())
            .collect();
        assert_eq!(
            types,
            [
                "{ n: number, s: string, l: number[], m: unknown[], c: unknown }",
                "number",
                "number",
                "number",
                "boolean",
                "boolean",
                "function f(p)",
                "unknown",
            ]
        );
    }
}
