use text_size::TextRange;
use verdant_yellow::SyntaxTree;
use verdant_yellow::ast::{AstNode as _, Expr, Name, ObjectExpr, SourceFile, Stmt};

use crate::scope::DeclarationKind;

/// One entry of a document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: DeclarationKind,
    /// The whole declaration.
    pub range: TextRange,
    /// The declared name.
    pub selection_range: TextRange,
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    fn new(name: Name<'_>, kind: DeclarationKind, range: TextRange) -> Self {
        Self {
            name: name.text().to_owned(),
            kind,
            range,
            selection_range: name.range(),
            children: Vec::new(),
        }
    }
}

/// Outline of the variables and functions declared in `tree`.
///
/// Declarations inside blocks and branches are listed with the closest
/// enclosing function, or at the top level. Object literal keys nest under
/// the variable they initialize.
pub fn document_symbols(tree: &SyntaxTree) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();
    if let Some(source) = SourceFile::cast(tree.root()) {
        for stmt in source.stmts() {
            stmt_symbols(stmt, &mut symbols);
        }
    }
    symbols
}

fn stmt_symbols(stmt: Stmt<'_>, acc: &mut Vec<DocumentSymbol>) {
    match stmt {
        Stmt::Var(var) => {
            let Some(name) = var.name() else { return };
            let mut symbol = DocumentSymbol::new(name, DeclarationKind::Variable, var.range());
            if let Some(Expr::Object(object)) = var.initializer() {
                symbol.children = property_symbols(object);
            }
            acc.push(symbol);
        }
        Stmt::Function(function) => {
            let Some(name) = function.name() else { return };
            let mut symbol = DocumentSymbol::new(name, DeclarationKind::Function, function.range());
            for stmt in function.body().into_iter().flat_map(|body| body.stmts()) {
                stmt_symbols(stmt, &mut symbol.children);
            }
            acc.push(symbol);
        }
        Stmt::Block(block) => {
            for stmt in block.stmts() {
                stmt_symbols(stmt, acc);
            }
        }
        Stmt::If(if_stmt) => {
            if let Some(stmt) = if_stmt.then_branch() {
                stmt_symbols(stmt, acc);
            }
            if let Some(stmt) = if_stmt.else_branch().and_then(|branch| branch.stmt()) {
                stmt_symbols(stmt, acc);
            }
        }
        Stmt::While(while_stmt) => {
            if let Some(stmt) = while_stmt.body() {
                stmt_symbols(stmt, acc);
            }
        }
        Stmt::Return(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Expr(_)
        | Stmt::Empty(_) => {}
    }
}

fn property_symbols(object: ObjectExpr<'_>) -> Vec<DocumentSymbol> {
    object
        .properties()
        .filter_map(|property| {
            let mut symbol =
                DocumentSymbol::new(property.key()?, DeclarationKind::Property, property.range());
            if let Some(Expr::Object(object)) = property.value() {
                symbol.children = property_symbols(object);
            }
            Some(symbol)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use expect_test::expect;

    use super::{DocumentSymbol, document_symbols};

    fn outline(text: &str) -> String {
        fn go(symbols: &[DocumentSymbol], depth: usize, buf: &mut String) {
            for symbol in symbols {
                let indent = "  ".repeat(depth);
                writeln!(
                    buf,
                    "{indent}{:?} {} {:?} {:?}",
                    symbol.kind, symbol.name, symbol.range, symbol.selection_range
                )
                .unwrap();
                go(&symbol.children, depth + 1, buf);
            }
        }

        let tree = verdant_parse::parse(text).syntax_tree(text);
        let mut buf = String::new();
        go(&document_symbols(&tree), 0, &mut buf);
        buf
    }

    #[test]
    fn nested_outline() {
        let text = "var config = {name: 'x', 'deep': {on: true}};\n\
                    function run(a) { var local = 1; if (a) { var branch = 2; } }\n\
                    while (1) var tick = 0;";
        expect![[r#"
            Variable config 0..45 4..10
              Property name 14..23 14..18
              Property deep 25..43 25..31
                Property on 34..42 34..36
            Function run 46..107 55..58
              Variable local 64..78 68..73
              Variable branch 88..103 92..98
            Variable tick 118..131 122..126
        "#]]
        .assert_eq(&outline(text));
    }

    #[test]
    fn incomplete_declarations_are_skipped() {
        expect![[r#"
            Variable b 9..19 13..14
        "#]]
        .assert_eq(&outline("var = 1; var b = 2;"));
    }
}
