use rustc_hash::FxHashMap;
use verdant_yellow::TokenKind::*;
use verdant_yellow::ast::{
    AstNode as _, BinaryExpr, Expr, FunctionDecl, LiteralKind, MemberExpr, ObjectExpr, VarDecl,
};

use crate::scope::{Declaration, DeclarationKind, Scopes};
use crate::ty::{FunctionTy, Member, ObjectTy, Ty};

/// Bottom-up inference over one expression. Variables are looked up in
/// `types`, which holds every variable bound before the expression.
pub(crate) struct InferenceContext<'s> {
    pub(crate) scopes: &'s Scopes,
    pub(crate) types: &'s FxHashMap<Declaration, Ty>,
}

impl InferenceContext<'_> {
    pub(crate) fn infer_expr(&self, expr: Expr<'_>) -> Ty {
        match expr {
            Expr::Literal(literal) => match literal.kind() {
                Some(LiteralKind::Int | LiteralKind::Float) => Ty::Number,
                Some(LiteralKind::String) => Ty::String,
                Some(LiteralKind::Bool(_)) => Ty::Bool,
                Some(LiteralKind::Null) => Ty::Null,
                None => Ty::Unknown,
            },
            Expr::NameRef(name_ref) => match self.scopes.resolve(name_ref) {
                Some(declaration) => self.declaration_ty(declaration, name_ref.syntax().tree()),
                None => Ty::Unknown,
            },
            Expr::Paren(paren) => self.infer_opt(paren.expr()),
            Expr::Prefix(prefix) => match prefix.op_kind() {
                Some(BANG) => Ty::Bool,
                Some(MINUS) => Ty::Number,
                _ => Ty::Unknown,
            },
            Expr::Binary(binary) => self.infer_binary(binary),
            Expr::Call(_) => Ty::Unknown,
            Expr::Member(member) => self.infer_member(member).map_or(Ty::Unknown, |member| member.ty),
            Expr::Index(index) => match self.infer_opt(index.base()) {
                Ty::Array(element) => *element,
                _ => Ty::Unknown,
            },
            Expr::Object(object) => Ty::Object(self.infer_object(object)),
            Expr::Array(array) => {
                let mut elements = array.elements().map(|element| self.infer_expr(element));
                let element = match elements.next() {
                    Some(first) => {
                        if elements.all(|ty| ty == first) { first } else { Ty::Unknown }
                    }
                    None => Ty::Unknown,
                };
                Ty::Array(Box::new(element))
            }
        }
    }

    fn infer_opt(&self, expr: Option<Expr<'_>>) -> Ty {
        expr.map_or(Ty::Unknown, |expr| self.infer_expr(expr))
    }

    fn infer_binary(&self, binary: BinaryExpr<'_>) -> Ty {
        let lhs = self.infer_opt(binary.lhs());
        let rhs = self.infer_opt(binary.rhs());

        match binary.op_kind() {
            Some(EQ) => rhs,
            Some(PLUS) => match (lhs, rhs) {
                (Ty::String, _) | (_, Ty::String) => Ty::String,
                (Ty::Number, Ty::Number) => Ty::Number,
                _ => Ty::Unknown,
            },
            Some(MINUS | STAR | SLASH | PERCENT) => Ty::Number,
            Some(EQ_EQ | BANG_EQ | LT | LT_EQ | GT | GT_EQ) => Ty::Bool,
            Some(AMP_AMP | PIPE_PIPE) if lhs == rhs => lhs,
            _ => Ty::Unknown,
        }
    }

    pub(crate) fn infer_member(&self, member: MemberExpr<'_>) -> Option<Member> {
        let name = member.member()?.text();
        match self.infer_opt(member.receiver()) {
            Ty::Object(object) => object.member(name).cloned(),
            Ty::Array(_) | Ty::String if name == "length" => {
                Some(Member { ty: Ty::Number, declaration: None })
            }
            _ => None,
        }
    }

    fn infer_object(&self, object: ObjectExpr<'_>) -> ObjectTy {
        let mut ty = ObjectTy::default();
        for property in object.properties() {
            let Some(key) = property.key() else { continue };
            let member =
                Member { ty: self.infer_opt(property.value()), declaration: Declaration::of(key) };
            ty.insert(key.text(), member);
        }
        ty
    }

    pub(crate) fn declaration_ty(
        &self,
        declaration: Declaration,
        tree: &verdant_yellow::SyntaxTree,
    ) -> Ty {
        match declaration.kind() {
            DeclarationKind::Variable => self.types.get(&declaration).cloned().unwrap_or(Ty::Unknown),
            DeclarationKind::Function => declaration
                .name(tree)
                .and_then(|name| name.syntax().parent())
                .and_then(FunctionDecl::cast)
                .map_or(Ty::Unknown, function_ty),
            DeclarationKind::Parameter => Ty::Unknown,
            DeclarationKind::Property => {
                let property = declaration.name(tree).and_then(|name| name.syntax().parent());
                let value = property.and_then(|property| property.child_nodes().find_map(Expr::cast));
                self.infer_opt(value)
            }
        }
    }

    /// Type of a variable from its initializer.
    pub(crate) fn infer_var(&self, var: VarDecl<'_>) -> Ty {
        self.infer_opt(var.initializer())
    }
}

fn function_ty(function: FunctionDecl<'_>) -> Ty {
    let name = function.name().map_or("", |name| name.text());
    let params = function
        .param_list()
        .into_iter()
        .flat_map(|list| list.params())
        .filter_map(|param| param.name())
        .map(|name| name.text().into())
        .collect();
    Ty::Function(FunctionTy { name: name.into(), params })
}
