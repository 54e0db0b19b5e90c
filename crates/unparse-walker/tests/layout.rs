use super::*;
use crate::grammar::Grammar;
use crate::rules::{attr, resolve, text};
use crate::test_node::*;
use unparse_common::Position;

fn dispatcher() -> Dispatcher<TestNode> {
    Dispatcher::new(Rc::new(Grammar::new()))
}

fn ctx<'c>(
    before: Option<&'c str>,
    after: Option<&'c str>,
    prev: Option<&'c str>,
) -> LayoutContext<'c> {
    LayoutContext { before, after, prev }
}

fn texts(chunks: Vec<Chunk>) -> String {
    chunks.into_iter().map(|chunk| chunk.text).collect()
}

fn token(rule: crate::rules::Rule) -> Token {
    match rule {
        crate::rules::Rule::Token(token) => token,
        crate::rules::Rule::Layout(layout) => panic!("not a token: {layout:?}"),
    }
}

#[test]
fn test_space_imply() {
    let d = dispatcher();
    let n = number("1");
    assert_eq!(texts(layout_handler_space_imply(&d, &n, &ctx(Some("a"), Some("b"), None))), " ");
    assert_eq!(texts(layout_handler_space_imply(&d, &n, &ctx(None, None, None))), " ");
    assert_eq!(
        texts(layout_handler_space_imply(&d, &n, &ctx(Some("a"), Some("b"), Some(" ")))),
        ""
    );
}

#[test]
fn test_space_optional_pretty() {
    let d = dispatcher();
    let n = number("1");
    let run = |before, after, prev| {
        texts(layout_handler_space_optional_pretty(&d, &n, &ctx(before, after, prev)))
    };
    assert_eq!(run(Some("a"), Some("b"), None), " ");
    assert_eq!(run(None, Some("b"), None), "");
    assert_eq!(run(Some("a"), None, None), "");
    assert_eq!(run(Some("a "), Some("b"), None), "");
    assert_eq!(run(Some("a"), Some("\nb"), None), "");
    assert_eq!(run(Some("a"), Some("b"), Some("  ")), "");
}

#[test]
fn test_space_minimum() {
    let d = dispatcher();
    let n = number("1");
    let run = |before, after| {
        texts(layout_handler_space_minimum(&d, &n, &ctx(before, after, None)))
    };
    assert_eq!(run(Some("var"), Some("a")), " ");
    assert_eq!(run(Some("return"), Some("$")), " ");
    assert_eq!(run(Some("a"), Some("=")), "");
    assert_eq!(run(Some("="), Some("1")), "");
    assert_eq!(run(Some("+"), Some("+")), " ");
    assert_eq!(run(Some("-"), Some("--")), " ");
    assert_eq!(run(Some("+"), Some("-")), "");
    assert_eq!(run(None, Some("a")), "");
    assert_eq!(run(Some("a"), Some("")), "");
}

#[test]
fn test_newline_handlers() {
    let d = Dispatcher::<TestNode>::builder(Rc::new(Grammar::new()))
        .newline_str("\r\n")
        .build();
    let n = number("1");
    assert_eq!(texts(layout_handler_newline_simple(&d, &n, &ctx(None, None, None))), "\r\n");

    let optional = |before, after, prev| {
        texts(layout_handler_newline_optional_pretty(&d, &n, &ctx(before, after, prev)))
    };
    assert_eq!(optional(Some(";"), Some("var"), None), "\r\n");
    assert_eq!(optional(None, Some("var"), None), "");
    assert_eq!(optional(Some(";"), None, None), "");
    assert_eq!(optional(Some(";\n"), Some("var"), None), "");
    assert_eq!(optional(Some(";"), Some("var"), Some("\r\n  ")), "");
}

#[test]
fn test_indentator() {
    let d = dispatcher();
    let indentator = Indentator::new(None);
    let context = ctx(Some("{"), Some("a"), None);
    assert_eq!(texts(indentator.newline(&d, &context)), "\n");

    indentator.indent();
    indentator.indent();
    assert_eq!(indentator.level(), 2);
    assert_eq!(texts(indentator.newline(&d, &context)), "\n    ");
    // no trailing indentation on an empty line
    assert_eq!(texts(indentator.newline(&d, &ctx(Some("{"), Some("\n"), None))), "\n");

    indentator.dedent();
    indentator.dedent();
    indentator.dedent();
    assert_eq!(indentator.level(), 0);

    let tabs = Indentator::new(Some("\t".to_string()));
    tabs.indent();
    assert_eq!(texts(tabs.newline(&d, &context)), "\n\t");
}

#[test]
fn test_indentation_factory_is_fresh_per_call() {
    let factory = indentation::<TestNode>(None);
    let first = factory();
    let second = factory();
    let grammar = Rc::new(Grammar::new());
    let d1 = first.apply(Dispatcher::builder(Rc::clone(&grammar))).build();
    let d2 = second.apply(Dispatcher::builder(grammar)).build();
    let n = number("1");

    let indent = d1.layout_handler(Layout::Indent).unwrap();
    indent(&d1, &n, &LayoutContext::default());

    let context = ctx(Some("{"), Some("x"), None);
    let newline_one = d1.layout_handler(Layout::Newline).unwrap();
    let newline_two = d2.layout_handler(Layout::Newline).unwrap();
    assert_eq!(texts(newline_one(&d1, &n, &context)), "\n  ");
    assert_eq!(texts(newline_two(&d2, &n, &context)), "\n");
}

#[test]
fn test_default_token_handler_positions() {
    let d = dispatcher();
    let node = ident("value").at(3, 7);

    let chunks = token_handler_str_default(&token(text("(")), &d, &node, "(");
    assert_eq!(chunks, vec![Chunk::new("(")]);

    let chunks = token_handler_str_default(&token(attr("value")), &d, &node, "value");
    assert_eq!(chunks, vec![Chunk::at("value", Some(Position::new(3, 7)))]);

    let chunks = token_handler_str_default(&token(attr(resolve())), &d, &node, "a");
    assert_eq!(
        chunks,
        vec![Chunk::at("a", Some(Position::new(3, 7))).with_original(Some("value".to_string()))]
    );
}

#[test]
fn test_unobfuscate_restores_names() {
    let d = dispatcher();
    let node = ident("value").at(1, 1);
    let chunks = token_handler_unobfuscate(&token(attr(resolve())), &d, &node, "a");
    assert_eq!(texts(chunks), "value");

    let chunks = token_handler_unobfuscate(&token(text(";")), &d, &node, ";");
    assert_eq!(texts(chunks), ";");
}

#[test]
fn test_rule_set_factories() {
    let defaults = default_layout_handlers::<TestNode>();
    assert_eq!(defaults.layout_handlers.len(), 5);
    assert!(
        defaults
            .layout_handlers
            .iter()
            .any(|(key, _)| key.as_slice() == [Layout::Indent, Layout::Newline, Layout::Dedent])
    );

    let minimum = minimum_layout_handlers::<TestNode>();
    let d = minimum.apply(Dispatcher::builder(Rc::new(Grammar::new()))).build();
    let n = number("1");
    let newline = d.layout_handler(Layout::Newline).unwrap();
    assert!(newline(&d, &n, &ctx(Some(";"), Some("a"), None)).is_empty());
}
