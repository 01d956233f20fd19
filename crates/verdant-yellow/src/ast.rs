//! Typed wrappers around [`SyntaxNode`].

use text_size::TextRange;

use crate::SyntaxKind::{self, *};
use crate::TokenKind::{self, *};
use crate::syntax::SyntaxNode;

/// A typed view of a syntax node of a known kind.
pub trait AstNode<'a>: Copy {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self>;

    fn syntax(self) -> SyntaxNode<'a>;

    #[inline]
    fn range(self) -> TextRange {
        self.syntax().range()
    }
}

macro_rules! ast_node {
    ($($(#[$meta:meta])* $name:ident => $kind:ident,)*) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name<'a>(SyntaxNode<'a>);

        impl<'a> AstNode<'a> for $name<'a> {
            #[inline]
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            #[inline]
            fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                syntax.kind().is_some_and(Self::can_cast).then_some(Self(syntax))
            }

            #[inline]
            fn syntax(self) -> SyntaxNode<'a> {
                self.0
            }
        }
    )*};
}

ast_node! {
    /// The root of a file.
    SourceFile => SOURCE,
    VarDecl => VAR_DECL,
    FunctionDecl => FUNCTION_DECL,
    ParamList => PARAM_LIST,
    Param => PARAM,
    Block => BLOCK,
    ReturnStmt => RETURN_STMT,
    IfStmt => IF_STMT,
    ElseBranch => ELSE_BRANCH,
    WhileStmt => WHILE_STMT,
    BreakStmt => BREAK_STMT,
    ContinueStmt => CONTINUE_STMT,
    ExprStmt => EXPR_STMT,
    EmptyStmt => EMPTY_STMT,
    /// The binding site of a name: variables, functions, parameters and
    /// object keys.
    Name => NAME,
    /// A use of a name.
    NameRef => NAME_REF,
    Literal => LITERAL,
    ParenExpr => PAREN_EXPR,
    PrefixExpr => PREFIX_EXPR,
    BinaryExpr => BINARY_EXPR,
    CallExpr => CALL_EXPR,
    ArgList => ARG_LIST,
    MemberExpr => MEMBER_EXPR,
    IndexExpr => INDEX_EXPR,
    ObjectExpr => OBJECT_EXPR,
    ObjectProperty => OBJECT_PROPERTY,
    ArrayExpr => ARRAY_EXPR,
}

fn child<'a, N: AstNode<'a>>(parent: SyntaxNode<'a>) -> Option<N> {
    parent.child_nodes().find_map(N::cast)
}

fn children<'a, N: AstNode<'a>>(parent: SyntaxNode<'a>) -> impl Iterator<Item = N> {
    parent.child_nodes().filter_map(N::cast)
}

fn token(parent: SyntaxNode<'_>, kind: TokenKind) -> Option<SyntaxNode<'_>> {
    parent.child_tokens().find(|token| token.is(kind))
}

fn first_significant_token(parent: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    parent.child_tokens().find(|token| !token.is_trivia())
}

impl<'a> SourceFile<'a> {
    pub fn stmts(self) -> impl Iterator<Item = Stmt<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> VarDecl<'a> {
    pub fn name(self) -> Option<Name<'a>> {
        child(self.0)
    }

    pub fn initializer(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> FunctionDecl<'a> {
    pub fn name(self) -> Option<Name<'a>> {
        child(self.0)
    }

    pub fn param_list(self) -> Option<ParamList<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> ParamList<'a> {
    pub fn params(self) -> impl Iterator<Item = Param<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> Param<'a> {
    pub fn name(self) -> Option<Name<'a>> {
        child(self.0)
    }
}

impl<'a> Block<'a> {
    pub fn stmts(self) -> impl Iterator<Item = Stmt<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> ReturnStmt<'a> {
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> IfStmt<'a> {
    pub fn condition(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    pub fn then_branch(self) -> Option<Stmt<'a>> {
        child(self.0)
    }

    pub fn else_branch(self) -> Option<ElseBranch<'a>> {
        child(self.0)
    }
}

impl<'a> ElseBranch<'a> {
    pub fn stmt(self) -> Option<Stmt<'a>> {
        child(self.0)
    }
}

impl<'a> WhileStmt<'a> {
    pub fn condition(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Stmt<'a>> {
        child(self.0)
    }
}

impl<'a> ExprStmt<'a> {
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> Name<'a> {
    /// The identifier or string token carrying the name.
    pub fn token(self) -> Option<SyntaxNode<'a>> {
        token(self.0, IDENT).or_else(|| token(self.0, STRING))
    }

    /// The bound name, with quotes stripped from string keys.
    pub fn text(self) -> &'a str {
        match self.token() {
            Some(token) if token.is(STRING) => unquote(token.text()),
            Some(token) => token.text(),
            None => "",
        }
    }
}

impl<'a> NameRef<'a> {
    pub fn token(self) -> Option<SyntaxNode<'a>> {
        token(self.0, IDENT)
    }

    pub fn text(self) -> &'a str {
        self.token().map_or("", SyntaxNode::text)
    }
}

/// Classification of a literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    String,
    Bool(bool),
    Null,
}

impl<'a> Literal<'a> {
    pub fn token(self) -> Option<SyntaxNode<'a>> {
        first_significant_token(self.0)
    }

    pub fn kind(self) -> Option<LiteralKind> {
        let kind = match self.token()?.token_kind()? {
            INT_NUMBER => LiteralKind::Int,
            FLOAT_NUMBER => LiteralKind::Float,
            STRING => LiteralKind::String,
            TRUE_KW => LiteralKind::Bool(true),
            FALSE_KW => LiteralKind::Bool(false),
            NULL_KW => LiteralKind::Null,
            _ => return None,
        };
        Some(kind)
    }
}

impl<'a> ParenExpr<'a> {
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> PrefixExpr<'a> {
    pub fn op_kind(self) -> Option<TokenKind> {
        first_significant_token(self.0)?.token_kind()
    }

    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> BinaryExpr<'a> {
    pub fn lhs(self) -> Option<Expr<'a>> {
        self.0.child_nodes().next().and_then(Expr::cast)
    }

    pub fn op(self) -> Option<SyntaxNode<'a>> {
        first_significant_token(self.0)
    }

    pub fn op_kind(self) -> Option<TokenKind> {
        self.op()?.token_kind()
    }

    pub fn rhs(self) -> Option<Expr<'a>> {
        self.0.child_nodes().nth(1).and_then(Expr::cast)
    }
}

impl<'a> CallExpr<'a> {
    pub fn callee(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    pub fn arg_list(self) -> Option<ArgList<'a>> {
        child(self.0)
    }
}

impl<'a> ArgList<'a> {
    pub fn args(self) -> impl Iterator<Item = Expr<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> MemberExpr<'a> {
    pub fn receiver(self) -> Option<Expr<'a>> {
        self.0.child_nodes().next().and_then(Expr::cast)
    }

    /// The member name after the `.`.
    pub fn member(self) -> Option<NameRef<'a>> {
        self.0.children().skip_while(|child| !child.is(DOT)).skip(1).find_map(NameRef::cast)
    }
}

impl<'a> IndexExpr<'a> {
    pub fn base(self) -> Option<Expr<'a>> {
        self.0.child_nodes().next().and_then(Expr::cast)
    }

    pub fn index(self) -> Option<Expr<'a>> {
        self.0.children().skip_while(|child| !child.is(LEFT_BRACKET)).find_map(Expr::cast)
    }
}

impl<'a> ObjectExpr<'a> {
    pub fn properties(self) -> impl Iterator<Item = ObjectProperty<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> ObjectProperty<'a> {
    pub fn key(self) -> Option<Name<'a>> {
        child(self.0)
    }

    pub fn value(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> ArrayExpr<'a> {
    pub fn elements(self) -> impl Iterator<Item = Expr<'a>> + 'a {
        children(self.0)
    }
}

/// Any expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expr<'a> {
    Literal(Literal<'a>),
    NameRef(NameRef<'a>),
    Paren(ParenExpr<'a>),
    Prefix(PrefixExpr<'a>),
    Binary(BinaryExpr<'a>),
    Call(CallExpr<'a>),
    Member(MemberExpr<'a>),
    Index(IndexExpr<'a>),
    Object(ObjectExpr<'a>),
    Array(ArrayExpr<'a>),
}

impl<'a> AstNode<'a> for Expr<'a> {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            LITERAL
                | NAME_REF
                | PAREN_EXPR
                | PREFIX_EXPR
                | BINARY_EXPR
                | CALL_EXPR
                | MEMBER_EXPR
                | INDEX_EXPR
                | OBJECT_EXPR
                | ARRAY_EXPR
        )
    }

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        let expr = match syntax.kind()? {
            LITERAL => Self::Literal(Literal(syntax)),
            NAME_REF => Self::NameRef(NameRef(syntax)),
            PAREN_EXPR => Self::Paren(ParenExpr(syntax)),
            PREFIX_EXPR => Self::Prefix(PrefixExpr(syntax)),
            BINARY_EXPR => Self::Binary(BinaryExpr(syntax)),
            CALL_EXPR => Self::Call(CallExpr(syntax)),
            MEMBER_EXPR => Self::Member(MemberExpr(syntax)),
            INDEX_EXPR => Self::Index(IndexExpr(syntax)),
            OBJECT_EXPR => Self::Object(ObjectExpr(syntax)),
            ARRAY_EXPR => Self::Array(ArrayExpr(syntax)),
            _ => return None,
        };
        Some(expr)
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            Self::Literal(it) => it.0,
            Self::NameRef(it) => it.0,
            Self::Paren(it) => it.0,
            Self::Prefix(it) => it.0,
            Self::Binary(it) => it.0,
            Self::Call(it) => it.0,
            Self::Member(it) => it.0,
            Self::Index(it) => it.0,
            Self::Object(it) => it.0,
            Self::Array(it) => it.0,
        }
    }
}

/// Any statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stmt<'a> {
    Var(VarDecl<'a>),
    Function(FunctionDecl<'a>),
    Block(Block<'a>),
    Return(ReturnStmt<'a>),
    If(IfStmt<'a>),
    While(WhileStmt<'a>),
    Break(BreakStmt<'a>),
    Continue(ContinueStmt<'a>),
    Expr(ExprStmt<'a>),
    Empty(EmptyStmt<'a>),
}

impl<'a> AstNode<'a> for Stmt<'a> {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_stmt()
    }

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        let stmt = match syntax.kind()? {
            VAR_DECL => Self::Var(VarDecl(syntax)),
            FUNCTION_DECL => Self::Function(FunctionDecl(syntax)),
            BLOCK => Self::Block(Block(syntax)),
            RETURN_STMT => Self::Return(ReturnStmt(syntax)),
            IF_STMT => Self::If(IfStmt(syntax)),
            WHILE_STMT => Self::While(WhileStmt(syntax)),
            BREAK_STMT => Self::Break(BreakStmt(syntax)),
            CONTINUE_STMT => Self::Continue(ContinueStmt(syntax)),
            EXPR_STMT => Self::Expr(ExprStmt(syntax)),
            EMPTY_STMT => Self::Empty(EmptyStmt(syntax)),
            _ => return None,
        };
        Some(stmt)
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            Self::Var(it) => it.0,
            Self::Function(it) => it.0,
            Self::Block(it) => it.0,
            Self::Return(it) => it.0,
            Self::If(it) => it.0,
            Self::While(it) => it.0,
            Self::Break(it) => it.0,
            Self::Continue(it) => it.0,
            Self::Expr(it) => it.0,
            Self::Empty(it) => it.0,
        }
    }
}

fn unquote(text: &str) -> &str {
    let inner = text.strip_prefix(['\'', '"']).unwrap_or(text);
    inner.strip_suffix(['\'', '"']).unwrap_or(inner)
}
