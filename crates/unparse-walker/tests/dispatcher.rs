use super::*;
use crate::rules::{attr, text};
use crate::test_node::*;

fn grammar() -> Rc<Grammar<&'static str>> {
    Rc::new(
        Grammar::new()
            .with("Number", vec![attr("value")])
            .with("Semi", vec![text(";")]),
    )
}

fn marker(
    label: &'static str,
) -> impl Fn(&Dispatcher<TestNode>, &TestNode, &LayoutContext<'_>) -> Vec<Chunk> {
    move |_, _, _| vec![Chunk::new(label)]
}

fn call(handler: &LayoutHandler<TestNode>, dispatcher: &Dispatcher<TestNode>) -> String {
    let node = number("0");
    handler(dispatcher, &node, &LayoutContext::default())
        .into_iter()
        .map(|chunk| chunk.text)
        .collect()
}

#[test]
fn test_definition_lookup() {
    let dispatcher = Dispatcher::<TestNode>::new(grammar());
    assert_eq!(
        dispatcher.definition_for(&number("1")).unwrap(),
        &[attr("value")]
    );

    let err = dispatcher
        .definition_for(&TestNode::new("Unknown"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no definition registered for node kind \"Unknown\""
    );
}

#[test]
fn test_handler_lookup() {
    let dispatcher = Dispatcher::<TestNode>::builder(grammar())
        .layout(&[Layout::Space], marker(" "))
        .declare(|_, _| {})
        .build();

    assert!(matches!(dispatcher.handler_for(HandlerKey::Token), Handler::Token(_)));
    assert!(matches!(
        dispatcher.handler_for(HandlerKey::Layout(&[Layout::Space])),
        Handler::Layout(_)
    ));
    assert!(
        dispatcher
            .handler_for(HandlerKey::Layout(&[Layout::Newline]))
            .is_unimplemented()
    );
    assert!(matches!(
        dispatcher.handler_for(HandlerKey::Deferred(DeferredKind::Declare)),
        Handler::Declare(_)
    ));
    assert!(
        dispatcher
            .handler_for(HandlerKey::Deferred(DeferredKind::Resolve))
            .is_unimplemented()
    );
    assert!(
        dispatcher
            .handler_for(HandlerKey::Deferred(DeferredKind::Iter))
            .is_unimplemented()
    );
}

#[test]
fn test_combination_lookup_is_exact() {
    let dispatcher = Dispatcher::<TestNode>::builder(grammar())
        .layout(&[Layout::Indent, Layout::Newline, Layout::Dedent], marker("collapsed"))
        .build();
    // a prefix of a registered combination is not itself registered
    assert!(
        dispatcher
            .handler_for(HandlerKey::Layout(&[Layout::Indent, Layout::Newline]))
            .is_unimplemented()
    );
    let collapsed = [Layout::Indent, Layout::Newline, Layout::Dedent];
    let Handler::Layout(handler) = dispatcher.handler_for(HandlerKey::Layout(&collapsed)) else {
        panic!("combination should be registered");
    };
    assert_eq!(call(handler, &dispatcher), "collapsed");
}

#[test]
fn test_longest_combination_wins() {
    let dispatcher = Dispatcher::<TestNode>::builder(grammar())
        .layout(&[Layout::Indent, Layout::Newline], marker("pair"))
        .layout(&[Layout::Indent, Layout::Newline, Layout::Dedent], marker("triple"))
        .build();

    let run = [Layout::Indent, Layout::Newline, Layout::Dedent, Layout::Newline];
    let (len, handler) = dispatcher.layout_combination(&run).unwrap();
    assert_eq!(len, 3);
    assert_eq!(call(handler, &dispatcher), "triple");

    let (len, handler) = dispatcher
        .layout_combination(&[Layout::Indent, Layout::Newline, Layout::Space])
        .unwrap();
    assert_eq!(len, 2);
    assert_eq!(call(handler, &dispatcher), "pair");

    // single markers never count as a combination
    assert!(dispatcher.layout_combination(&[Layout::Indent]).is_none());
    assert!(dispatcher.layout_combination(&[Layout::Newline, Layout::Indent]).is_none());
}

#[test]
fn test_later_registration_overrides() {
    let dispatcher = Dispatcher::<TestNode>::builder(grammar())
        .layout(&[Layout::Space], marker("first"))
        .layout(&[Layout::Space], marker("second"))
        .build();
    let handler = dispatcher.layout_handler(Layout::Space).unwrap();
    assert_eq!(call(handler, &dispatcher), "second");
}

#[test]
fn test_default_strings_and_overrides() {
    let dispatcher = Dispatcher::<TestNode>::new(grammar());
    assert_eq!(dispatcher.indent_str(), "  ");
    assert_eq!(dispatcher.newline_str(), "\n");

    let dispatcher = Dispatcher::<TestNode>::builder(grammar())
        .indent_str("\t")
        .newline_str("\r\n")
        .build();
    assert_eq!(dispatcher.indent_str(), "\t");
    assert_eq!(dispatcher.newline_str(), "\r\n");
}

#[test]
fn test_default_token_handler_renders_value() {
    let dispatcher = Dispatcher::<TestNode>::new(grammar());
    let node = number("42").at(2, 3);
    let Rule::Token(token) = attr("value") else {
        unreachable!()
    };
    let chunks = (dispatcher.token_handler())(&token, &dispatcher, &node, "42");
    assert_eq!(chunks, vec![Chunk::at("42", Some(unparse_common::Position::new(2, 3)))]);
}
