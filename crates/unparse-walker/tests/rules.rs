use super::*;
use crate::grammar::Grammar;
use crate::test_node::*;
use std::cell::RefCell;
use std::rc::Rc;

fn plain_dispatcher() -> Dispatcher<TestNode> {
    Dispatcher::new(Rc::new(Grammar::new()))
}

#[test]
fn test_helpers_build_expected_rules() {
    assert_eq!(text(";"), Rule::Token(Token::Text(Cow::Borrowed(";"))));
    assert_eq!(
        attr("value"),
        Rule::Token(Token::Attr(AttrSource::Name("value")))
    );
    assert_eq!(
        attr(resolve()),
        Rule::Token(Token::Attr(AttrSource::Deferred(Deferred::Resolve)))
    );
    assert_eq!(
        operator_attr("op"),
        Rule::Token(Token::Operator {
            attr: Some("op"),
            value: Cow::Borrowed(""),
        })
    );
    assert_eq!(
        children_comma(),
        join_attr(iter(), vec![text(","), SPACE])
    );
    assert_eq!(SPACE, Rule::Layout(Layout::Space));
    assert_eq!(Rule::from(Layout::PopScope), POP_SCOPE);
}

#[test]
fn test_deferred_kinds() {
    assert_eq!(Deferred::Iter.kind(), DeferredKind::Iter);
    assert_eq!(Deferred::Declare("identifier").kind(), DeferredKind::Declare);
    assert_eq!(Deferred::Resolve.kind(), DeferredKind::Resolve);
}

#[test]
fn test_iter_yields_children_in_order() {
    let dispatcher = plain_dispatcher();
    let node = var_statement(vec![var_decl("a", None), var_decl("b", None)]);
    let Value::Nodes(children) = Deferred::Iter.evaluate(&dispatcher, &node).unwrap() else {
        panic!("Iter must produce a node sequence");
    };
    let names: Vec<_> = children
        .iter()
        .map(|decl| decl.attr("identifier").as_node().and_then(|id| id.identifier_name()))
        .collect();
    assert_eq!(names, vec![Some("a"), Some("b")]);
}

#[test]
fn test_declare_passes_empty_values_through() {
    let dispatcher = plain_dispatcher();
    let node = TestNode::new("FuncExpr");
    let value = Deferred::Declare("identifier")
        .evaluate(&dispatcher, &node)
        .unwrap();
    assert!(value.is_empty());
}

#[test]
fn test_declare_returns_target_and_calls_handler_per_item() {
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let log = Rc::clone(&seen);
    let dispatcher = Dispatcher::builder(Rc::new(Grammar::new()))
        .declare(move |_, node: &TestNode| {
            log.borrow_mut()
                .push(node.identifier_name().unwrap_or_default().to_string());
        })
        .build();
    let node = TestNode::new("Params").nodes("items", vec![ident("x"), ident("y")]);
    let value = Deferred::Declare("items").evaluate(&dispatcher, &node).unwrap();
    assert!(matches!(value, Value::Nodes(ref items) if items.len() == 2));
    assert_eq!(*seen.borrow(), vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn test_declare_validates_without_handler() {
    let dispatcher = plain_dispatcher();
    let node = TestNode::new("VarDecl").with("identifier", TestAttr::Str("a"));
    let err = Deferred::Declare("identifier")
        .evaluate(&dispatcher, &node)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "in \"VarDecl\", the resolved attribute 'identifier' is not an Identifier"
    );
}

#[test]
fn test_resolve_without_handler_returns_name() {
    let dispatcher = plain_dispatcher();
    let node = ident("foo");
    let value = Deferred::Resolve.evaluate(&dispatcher, &node).unwrap();
    assert_eq!(value.as_text().as_deref(), Some("foo"));
}

#[test]
fn test_resolve_with_handler_returns_handler_value() {
    let dispatcher = Dispatcher::builder(Rc::new(Grammar::new()))
        .resolve(|_, node: &TestNode| format!("_{}", node.identifier_name().unwrap_or_default()))
        .build();
    let node = ident("foo");
    let value = Deferred::Resolve.evaluate(&dispatcher, &node).unwrap();
    assert_eq!(value.as_text().as_deref(), Some("_foo"));
}

#[test]
fn test_attr_source_reads_named_attribute() {
    let dispatcher = plain_dispatcher();
    let node = elision(3);
    let value = AttrSource::from("value").fetch(&dispatcher, &node).unwrap();
    assert!(matches!(value, Value::Int(3)));
    let missing = AttrSource::from("nope").fetch(&dispatcher, &node).unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_declare_helper_drives_the_declare_handler() {
    assert_eq!(
        attr(declare("identifier")),
        Rule::Token(Token::Attr(AttrSource::Deferred(Deferred::Declare(
            "identifier"
        ))))
    );

    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let log = Rc::clone(&seen);
    let dispatcher = Dispatcher::builder(Rc::new(Grammar::new()))
        .declare(move |_, node: &TestNode| {
            log.borrow_mut()
                .push(node.identifier_name().unwrap_or_default().to_string());
        })
        .build();
    let node = var_decl("total", None);
    let value = declare("identifier").fetch(&dispatcher, &node).unwrap();
    assert_eq!(
        value.as_node().and_then(|id| id.identifier_name()),
        Some("total")
    );
    assert_eq!(*seen.borrow(), vec!["total".to_string()]);
}
