use indexmap::IndexMap;
use la_arena::{Arena, Idx, IdxRange, RawIdx};
use rustc_hash::FxBuildHasher;
use verdant_yellow::ast::{AstNode as _, MemberExpr, Name, NameRef, SourceFile, Stmt};
use verdant_yellow::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Variable,
    Function,
    Parameter,
    /// An object literal key.
    Property,
}

/// A binding site, identified by its `NAME` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Declaration {
    name: NodeId,
    kind: DeclarationKind,
}

impl Declaration {
    /// Classifies `name` by the node that owns it.
    pub(crate) fn of(name: Name<'_>) -> Option<Self> {
        let kind = match name.syntax().parent()?.kind()? {
            SyntaxKind::VAR_DECL => DeclarationKind::Variable,
            SyntaxKind::FUNCTION_DECL => DeclarationKind::Function,
            SyntaxKind::PARAM => DeclarationKind::Parameter,
            SyntaxKind::OBJECT_PROPERTY => DeclarationKind::Property,
            _ => return None,
        };
        Some(Self { name: name.syntax().id(), kind })
    }

    pub fn kind(self) -> DeclarationKind {
        self.kind
    }

    pub fn name_id(self) -> NodeId {
        self.name
    }

    /// The `NAME` node in `tree`, or `None` if `tree` is another revision.
    pub fn name(self, tree: &SyntaxTree) -> Option<Name<'_>> {
        tree.try_node(self.name).and_then(Name::cast)
    }
}

pub(crate) type Scope = Idx<ScopeData>;

#[derive(Debug)]
pub(crate) struct ScopeData {
    parent: Option<Scope>,
    entries: IdxRange<ScopeEntry>,
}

#[derive(Debug)]
pub(crate) struct ScopeEntry {
    name: Box<str>,
    declaration: Declaration,
}

/// Lexical scopes of one tree.
///
/// Every statement list opens a scope holding its function declarations, so
/// functions are visible throughout. Each `var` then opens a child scope for
/// the statements after it; its own initializer still sees the outer scope.
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    scopes: Arena<ScopeData>,
    entries: Arena<ScopeEntry>,
    scope_by_ref: IndexMap<NodeId, Scope, FxBuildHasher>,
}

impl Scopes {
    pub(crate) fn build(tree: &SyntaxTree) -> Self {
        let mut builder = ScopesBuilder { scopes: Self::default() };
        if let Some(source) = SourceFile::cast(tree.root()) {
            builder.stmt_list(source.stmts(), None, &[]);
        }
        builder.scopes
    }

    fn chain(&self, scope: Option<Scope>) -> impl Iterator<Item = Scope> + '_ {
        std::iter::successors(scope, move |&scope| self.scopes[scope].parent)
    }

    fn entries(&self, scope: Scope) -> &[ScopeEntry] {
        &self.entries[self.scopes[scope].entries.clone()]
    }

    pub(crate) fn resolve(&self, name_ref: NameRef<'_>) -> Option<Declaration> {
        let scope = self.scope_by_ref.get(&name_ref.syntax().id()).copied()?;
        let name = name_ref.text();

        self.chain(Some(scope)).find_map(|scope| {
            let entry = self.entries(scope).iter().rev().find(|entry| &*entry.name == name)?;
            Some(entry.declaration)
        })
    }

    /// Declarations in the order they were bound. A variable comes after
    /// everything its initializer can see.
    pub(crate) fn declarations(&self) -> impl Iterator<Item = Declaration> + '_ {
        self.entries.iter().map(|(_, entry)| entry.declaration)
    }

    /// Every name reference outside member position, in document order.
    pub(crate) fn references(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.scope_by_ref.keys().copied()
    }
}

struct ScopesBuilder {
    scopes: Scopes,
}

fn empty_entries(idx: usize) -> IdxRange<ScopeEntry> {
    let idx = Idx::from_raw(RawIdx::from(idx as u32));
    IdxRange::new(idx..idx)
}

impl ScopesBuilder {
    fn scope(&mut self, parent: impl Into<Option<Scope>>) -> Scope {
        self.scopes.scopes.alloc(ScopeData {
            parent: parent.into(),
            entries: empty_entries(self.scopes.entries.len()),
        })
    }

    fn add_binding(&mut self, name: Name<'_>, scope: Scope) {
        let Some(declaration) = Declaration::of(name) else { return };
        let entry = self.scopes.entries.alloc(ScopeEntry { name: name.text().into(), declaration });
        let start = self.scopes.scopes[scope].entries.start();
        self.scopes.scopes[scope].entries = IdxRange::new_inclusive(start..=entry);
    }

    fn stmt_list<'a>(
        &mut self,
        stmts: impl Iterator<Item = Stmt<'a>>,
        parent: Option<Scope>,
        params: &[Name<'a>],
    ) {
        let stmts: Vec<_> = stmts.collect();
        let mut scope = self.scope(parent);

        for &param in params {
            self.add_binding(param, scope);
        }
        let functions = stmts.iter().filter_map(|stmt| match stmt {
            Stmt::Function(function) => function.name(),
            _ => None,
        });
        for name in functions {
            self.add_binding(name, scope);
        }

        for stmt in stmts {
            self.stmt(stmt, &mut scope);
        }
    }

    /// A statement in a position that is not a list, like an `if` branch.
    fn nested_stmt(&mut self, stmt: Option<Stmt<'_>>, scope: Scope) {
        if let Some(stmt) = stmt {
            self.stmt_list(std::iter::once(stmt), Some(scope), &[]);
        }
    }

    fn stmt(&mut self, stmt: Stmt<'_>, scope: &mut Scope) {
        match stmt {
            Stmt::Var(var) => {
                if let Some(initializer) = var.initializer() {
                    self.expr(initializer.syntax(), *scope);
                }
                if let Some(name) = var.name() {
                    *scope = self.scope(*scope);
                    self.add_binding(name, *scope);
                }
            }
            Stmt::Function(function) => {
                let params: Vec<_> = function
                    .param_list()
                    .into_iter()
                    .flat_map(|list| list.params())
                    .filter_map(|param| param.name())
                    .collect();
                if let Some(body) = function.body() {
                    self.stmt_list(body.stmts(), Some(*scope), &params);
                }
            }
            Stmt::Block(block) => self.stmt_list(block.stmts(), Some(*scope), &[]),
            Stmt::Return(ret) => {
                if let Some(expr) = ret.expr() {
                    self.expr(expr.syntax(), *scope);
                }
            }
            Stmt::If(if_stmt) => {
                if let Some(condition) = if_stmt.condition() {
                    self.expr(condition.syntax(), *scope);
                }
                self.nested_stmt(if_stmt.then_branch(), *scope);
                self.nested_stmt(if_stmt.else_branch().and_then(|branch| branch.stmt()), *scope);
            }
            Stmt::While(while_stmt) => {
                if let Some(condition) = while_stmt.condition() {
                    self.expr(condition.syntax(), *scope);
                }
                self.nested_stmt(while_stmt.body(), *scope);
            }
            Stmt::Expr(expr_stmt) => {
                if let Some(expr) = expr_stmt.expr() {
                    self.expr(expr.syntax(), *scope);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
        }
    }

    /// Expressions cannot introduce bindings, so every name inside shares
    /// `scope`.
    fn expr(&mut self, expr: SyntaxNode<'_>, scope: Scope) {
        for name_ref in expr.descendants().filter_map(NameRef::cast) {
            if !is_member_name(name_ref) {
                self.scopes.scope_by_ref.insert(name_ref.syntax().id(), scope);
            }
        }
    }
}

pub(crate) fn is_member_name(name_ref: NameRef<'_>) -> bool {
    name_ref
        .syntax()
        .parent()
        .and_then(MemberExpr::cast)
        .and_then(MemberExpr::member)
        .is_some_and(|member| member == name_ref)
}
