use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use expect_test::{expect, expect_file};
use text_size::TextSize;
use verdant_yellow::ast::{AstNode as _, VarDecl};
use verdant_yellow::{SyntaxKind, SyntaxNode, SyntaxTree};

use crate::{ReparseKind, TextEdit, reparse};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "vd" {
                    let expected = path.with_extension("tree");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

fn dump(text: &str) -> String {
    let parse = crate::parse(text);
    let mut actual = parse.syntax_tree(text).debug_tree();
    for diagnostic in parse.diagnostics() {
        writeln!(actual, "error {:?}: {}", diagnostic.range(), diagnostic.message()).unwrap();
    }
    actual
}

#[test]
fn parse() {
    let cases = TestCase::list();
    assert!(!cases.is_empty());

    for case in cases {
        expect_file![&case.expected].assert_eq(&dump(&case.text));
    }
}

/// Structural checks every tree must pass, whatever the input.
fn check_tree(tree: &SyntaxTree) {
    let root = tree.root();
    assert_eq!(root.kind(), Some(SyntaxKind::SOURCE));
    assert_eq!(root.parent(), None);
    assert_eq!(root.range().end(), TextSize::of(tree.text()));

    let leaves: String = root.tokens().map(SyntaxNode::text).collect();
    assert_eq!(leaves, tree.text());

    for node in root.descendants() {
        let mut cursor = node.range().start();
        for child in node.children() {
            assert_eq!(child.parent(), Some(node));
            assert_eq!(child.range().start(), cursor, "gap before {child:?}");
            cursor = child.range().end();
        }
        if node.is_node() {
            assert_eq!(cursor, node.range().end(), "children of {node:?} fall short");
        }
    }

    assert_eq!(root.descendants().count(), tree.arena().len());
}

#[test]
fn trees_are_lossless_and_consistent() {
    let mut texts: Vec<String> = TestCase::list().into_iter().map(|case| case.text).collect();
    texts.extend(
        [
            "",
            "   ",
            "// only a comment",
            "}}}",
            "var",
            "function (",
            "if (x { y } else",
            "a.b.c(1)[2] = -!x;",
            "var s = 'unterminated\nvar t = 1;",
            "/* open comment",
            "x & y | z @ w",
            "{ { { } }",
            "var o = {a 1, , 'b': }",
        ]
        .map(String::from),
    );

    for text in texts {
        let parse = crate::parse(&text);
        let tree = parse.syntax_tree(&text);
        check_tree(&tree);

        let again = crate::parse(&text);
        assert_eq!(parse, again, "parsing is not deterministic for {text:?}");
        assert!(!parse.green().ptr_eq(again.green()));
    }
}

#[test]
fn single_declaration() {
    let text = "var x = 1;";
    let tree = crate::parse(text).syntax_tree(text);
    let decls: Vec<_> = tree.root().child_nodes().collect();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].kind(), Some(SyntaxKind::VAR_DECL));
    assert_eq!(decls[0].range(), tree.root().range());

    let decl = tree.get_element::<VarDecl<'_>>(0).unwrap();
    assert_eq!(decl.syntax(), decls[0]);
    assert_eq!(decl.name().map(|name| name.text()), Some("x"));
    assert!(tree.get_element::<VarDecl<'_>>(1).is_none());
}

#[test]
fn typing_in_a_comment_only_resizes_the_comment() {
    let text = "var x = 1; // note\nvar y = 2;";
    let parse = crate::parse(text);
    let old = parse.syntax_tree(text);

    let comment_end = TextSize::new(18);
    let reparsed = reparse(&old, parse.diagnostics(), &TextEdit::insert(comment_end, "s"));
    assert_eq!(reparsed.kind, ReparseKind::Token);
    assert_eq!(reparsed.text, "var x = 1; // notes\nvar y = 2;");

    let new = reparsed.parse.syntax_tree(&reparsed.text);
    assert_eq!(old.arena().len(), new.arena().len());

    let comment = old.node_at_offset(TextSize::new(12)).range();
    for index in 0..old.arena().len() {
        let (before, after) = (&old.arena()[index], &new.arena()[index]);
        assert_eq!(before.kind(), after.kind());
        assert_eq!(before.parent(), after.parent());

        let expected = if before.range().end() <= comment.start() {
            before.range()
        } else if before.range().start() >= comment.end() {
            before.range() + TextSize::new(1)
        } else {
            before.range().cover_offset(before.range().end() + TextSize::new(1))
        };
        assert_eq!(after.range(), expected, "element #{index}");
    }

    let unchanged = |tree: &SyntaxTree, n: usize| {
        tree.green().children()[n].as_node().cloned().unwrap()
    };
    assert!(unchanged(&old, 0).ptr_eq(&unchanged(&new, 0)));
    assert!(unchanged(&old, 4).ptr_eq(&unchanged(&new, 4)));
}

#[test]
fn error_nodes_keep_their_text() {
    expect![[r#"
        SOURCE@0..7
          EXPR_STMT@0..2
            BINARY_EXPR@0..2
              NAME_REF@0..1
                IDENT@0..1 "a"
              PLUS@1..2 "+"
          ERROR@2..3
            RIGHT_PAREN@2..3 ")"
          ERROR@3..7
            ELSE_KW@3..7 "else"
        error 2..3: expected an expression
        error 2..3: expected a statement
        error 3..7: expected a statement
    "#]]
    .assert_eq(&dump("a+)else"));
}
