use rstest::rstest;
use text_size::{TextRange, TextSize};
use verdant_parse::{Document, ReparseKind, TextEdit, parse, reparse};

fn edit_at(text: &str, needle: &str, insert: &str) -> TextEdit {
    let start = text.find(needle).unwrap_or_else(|| panic!("{needle:?} not in {text:?}"));
    TextEdit::replace(TextRange::at(TextSize::new(start as u32), TextSize::of(needle)), insert)
}

#[rstest]
#[case("var count = 1;", "count", "total", ReparseKind::Token)]
#[case("var s = 'hello';", "hello", "world", ReparseKind::Token)]
#[case("f(1);  // comment", "comment", "remark", ReparseKind::Token)]
#[case("var x = 1;\nvar y = x;", "\n", "\n\n", ReparseKind::Token)]
#[case("var n = 12;", "12", "3.5", ReparseKind::Full)]
#[case("x; // y", "// y", "y", ReparseKind::Full)]
#[case("function f() { return 1; }", "return 1;", "return 1 + 2;", ReparseKind::Block)]
#[case("if (a) { b(); } else { c(); }", "c()", "c(d)", ReparseKind::Block)]
#[case("function f() { var o = {a: 1}; }", "a: 1", "a: 1, b: 2", ReparseKind::Block)]
#[case("while (x) { y = 1; }", "1", "", ReparseKind::Block)]
#[case("{ a; }\n{ b; }", "a", "a + b", ReparseKind::Block)]
#[case("function f() { g(); }", "g();", "g(); }", ReparseKind::Full)]
#[case("0\n{'}", "'", "", ReparseKind::Full)]
#[case("function f() { 'x }", "'x", "x", ReparseKind::Full)]
fn matches_a_full_parse(
    #[case] text: &str,
    #[case] needle: &str,
    #[case] insert: &str,
    #[case] kind: ReparseKind,
) {
    let old = parse(text);
    let tree = old.syntax_tree(text);
    let reparsed = reparse(&tree, old.diagnostics(), &edit_at(text, needle, insert));

    assert_eq!(reparsed.parse, parse(&reparsed.text));
    assert_eq!(reparsed.kind, kind);
}

#[rstest]
#[case("0\n{'}", 3, 4)]
#[case("{={1}", 2, 3)]
#[case("if (a) { b('); }", 11, 12)]
fn closing_a_block_drops_its_missing_brace(#[case] text: &str, #[case] start: u32, #[case] end: u32) {
    let old = parse(text);
    let tree = old.syntax_tree(text);
    let edit = TextEdit::delete(TextRange::new(TextSize::new(start), TextSize::new(end)));
    let reparsed = reparse(&tree, old.diagnostics(), &edit);

    let expected = parse(&reparsed.text);
    assert_eq!(reparsed.parse.diagnostics(), expected.diagnostics());
    assert_eq!(reparsed.parse, expected);
}

#[test]
fn block_reparse_shares_untouched_subtrees() {
    let text = "function a() { 1; }\nfunction b() { 2; }";
    let old = parse(text);
    let tree = old.syntax_tree(text);
    let reparsed = reparse(&tree, old.diagnostics(), &edit_at(text, "2", "2 + 3"));
    assert_eq!(reparsed.kind, ReparseKind::Block);

    let first = |green: &verdant_yellow::GreenNode| green.children()[0].as_node().cloned().unwrap();
    assert!(first(old.green()).ptr_eq(&first(reparsed.parse.green())));
    assert!(!old.green().ptr_eq(reparsed.parse.green()));
}

#[test]
fn typing_character_by_character() {
    let mut document = Document::new("function f() {\n}\n");
    let typed = "var total = [1, 2].length; if (total) { total = total - 1; }";

    let mut offset = TextSize::new(15);
    for c in typed.chars() {
        document.apply_edit(TextEdit::insert(offset, c.to_string())).unwrap();
        offset += TextSize::of(c);

        let tree = document.sync();
        let expected = parse(tree.text());
        assert_eq!(tree.green(), expected.green(), "after typing up to {offset:?}");
        assert_eq!(document.diagnostics(), expected.diagnostics());
    }

    while offset > TextSize::new(15) {
        let start = offset - TextSize::new(1);
        document.apply_edit(TextEdit::delete(TextRange::new(start, offset))).unwrap();
        offset = start;

        let tree = document.sync();
        let expected = parse(tree.text());
        assert_eq!(tree.green(), expected.green(), "after deleting back to {offset:?}");
        assert_eq!(document.diagnostics(), expected.diagnostics());
    }

    assert_eq!(document.text(), "function f() {\n}\n");
}
