use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;
use unparse::es5::{Node, definitions};
use unparse::{
    RenderOptions, Style, Unparser, es5_unparser, render, token_handler_unobfuscate,
};

fn sample() -> Node {
    Node::program(vec![
        Node::var(vec![Node::var_decl("total", Some(Node::number("0")))]),
        Node::func_decl(
            "accumulate",
            &["items", "scale"],
            vec![
                Node::var(vec![Node::var_decl(
                    "step",
                    Some(Node::func_expr(
                        None,
                        &["item"],
                        vec![Node::expr(Node::assign(
                            Node::id("total"),
                            "+=",
                            Node::binary(Node::id("item"), "*", Node::id("scale")),
                        ))],
                    )),
                )]),
                Node::expr(Node::call(
                    Node::dot(Node::id("items"), "forEach"),
                    vec![Node::id("step")],
                )),
                Node::ret(Some(Node::id("total"))),
            ],
        ),
    ])
}

#[test]
fn test_pretty_print() -> Result<()> {
    let output = render(&es5_unparser(&RenderOptions::default()), &sample())?;
    assert_eq!(
        output,
        "var total = 0;\n\
         function accumulate(items, scale) {\n  \
           var step = function(item) {\n    \
             total += item * scale;\n  \
           };\n  \
           items.forEach(step);\n  \
           return total;\n\
         }"
    );
    Ok(())
}

#[test]
fn test_minify_print() -> Result<()> {
    let options = RenderOptions {
        style: Style::Minify,
        ..RenderOptions::default()
    };
    let output = render(&es5_unparser(&options), &sample())?;
    assert_eq!(
        output,
        "var total=0;function accumulate(items,scale){var step=function(item){total+=item*scale;};items.forEach(step);return total;}"
    );
    Ok(())
}

#[test]
fn test_minify_and_obfuscate() -> Result<()> {
    let options = RenderOptions {
        style: Style::Minify,
        obfuscate: true,
        ..RenderOptions::default()
    };
    let output = render(&es5_unparser(&options), &sample())?;
    // `total` and `accumulate` are globals and keep their names
    assert_eq!(
        output,
        "var total=0;function accumulate(a,b){var c=function(d){total+=d*b;};a.forEach(c);return total;}"
    );
    Ok(())
}

#[test]
fn test_options_from_json() -> Result<()> {
    let options: RenderOptions = serde_json::from_str(
        r#"{"style": "pretty", "obfuscate": true, "indent_str": "\t", "shortener": {"reserved": ["a", "b"]}}"#,
    )?;
    assert_eq!(options.style, Style::Pretty);
    assert_eq!(options.unparser.indent_str, "\t");
    assert_eq!(options.unparser.newline_str, "\n");

    let program = Node::func_decl("f", &["value"], vec![Node::ret(Some(Node::id("value")))]);
    let output = render(&es5_unparser(&options), &program)?;
    assert_eq!(output, "function f(c) {\n\treturn c;\n}");
    Ok(())
}

#[test]
fn test_unobfuscate_token_handler() -> Result<()> {
    let unparser = unparse::es5::minifier()
        .rule(unparse::obfuscate::<Node>(Default::default()))
        .token_handler(token_handler_unobfuscate::<Node>);
    let program = Node::func_decl("f", &["value"], vec![Node::ret(Some(Node::id("value")))]);
    assert_eq!(render(&unparser, &program)?, "function f(value){return value;}");
    Ok(())
}

#[test]
fn test_custom_rule_set_sees_every_layout() -> Result<()> {
    let seen = Rc::new(RefCell::new(0usize));
    let counter = Rc::clone(&seen);
    let unparser = Unparser::bare(definitions()).rule(move || {
        let counter = Rc::clone(&counter);
        unparse::RuleSet::new().layout(&[unparse::Layout::Newline], move |_, _: &Node, _| {
            *counter.borrow_mut() += 1;
            Vec::new()
        })
    });
    let output = render(&unparser, &sample())?;
    assert!(!output.contains('\n'));
    // one between the statements, four in the function body, two in the
    // function expression
    assert_eq!(*seen.borrow(), 7);
    Ok(())
}

#[test]
fn test_errors_propagate_out_of_render() {
    let unparser = Unparser::bare(definitions());
    let broken = Node::program(vec![Node::var(vec![Node::VarDecl {
        identifier: Box::new(Node::string("'a'")),
        initializer: None,
    }])]);
    let err = render(&unparser, &broken).unwrap_err();
    assert_eq!(
        err.to_string(),
        "in VarDecl, the resolved attribute 'identifier' is not an Identifier"
    );
}

#[test]
fn test_obfuscated_closure_keeps_outer_bindings() -> Result<()> {
    // function f(a) { var x = a; return function(b) { return x + b + a; }; }
    let program = Node::func_decl(
        "f",
        &["a"],
        vec![
            Node::var(vec![Node::var_decl("x", Some(Node::id("a")))]),
            Node::ret(Some(Node::func_expr(
                None,
                &["b"],
                vec![Node::ret(Some(Node::binary(
                    Node::binary(Node::id("x"), "+", Node::id("b")),
                    "+",
                    Node::id("a"),
                )))],
            ))),
        ],
    );
    let options = RenderOptions {
        style: Style::Minify,
        obfuscate: true,
        ..RenderOptions::default()
    };
    assert_eq!(
        render(&es5_unparser(&options), &program)?,
        "function f(c){var d=c;return function(e){return d+e+c;};}"
    );
    Ok(())
}
