//! Definitions for every ES5 node kind.
//!
//! One grammar serves both output styles. The rule sets decide what the
//! layout markers turn into: the default handlers plus indentation give
//! pretty output, the minimum handlers give minified output.

use crate::ast::NodeKind;
use unparse_walker::Grammar;
use unparse_walker::rules::{
    DEDENT, INDENT, NEWLINE, OPTIONAL_SPACE, POP_SCOPE, PUSH_SCOPE, Rule, SPACE, attr,
    children_comma, children_newline, declare, elision_join_attr, elision_token, join_attr,
    operator_attr, optional, resolve, text,
};

/// `{`, then the elements on their own indented lines, then `}`. An empty
/// body renders as `{}`.
fn braced_body(attr_name: &'static str, closing: Vec<Rule>) -> Vec<Rule> {
    let mut rules = vec![
        text("{"),
        optional(
            attr_name,
            vec![INDENT, NEWLINE, join_attr(attr_name, vec![NEWLINE]), DEDENT, NEWLINE],
        ),
    ];
    rules.extend(closing);
    rules.push(text("}"));
    rules
}

/// The parenthesised parameter list; each parameter is a declaration in
/// the function's own scope.
fn parameters() -> Vec<Rule> {
    vec![
        text("("),
        join_attr(declare("parameters"), vec![text(","), SPACE]),
        text(")"),
    ]
}

pub fn definitions() -> Grammar<NodeKind> {
    let mut grammar = Grammar::new();
    grammar
        .define(NodeKind::Program, vec![children_newline()])
        .define(
            NodeKind::VarStatement,
            vec![text("var"), SPACE, children_comma(), text(";")],
        )
        .define(
            NodeKind::VarDecl,
            vec![
                attr(declare("identifier")),
                optional(
                    "initializer",
                    vec![SPACE, text("="), SPACE, attr("initializer")],
                ),
            ],
        )
        .define(NodeKind::Identifier, vec![attr(resolve())])
        .define(NodeKind::PropIdentifier, vec![attr("value")])
        .define(NodeKind::Number, vec![attr("value")])
        .define(NodeKind::String, vec![attr("value")])
        .define(NodeKind::Boolean, vec![attr("value")])
        .define(NodeKind::Null, vec![attr("value")])
        .define(
            NodeKind::Array,
            vec![text("["), elision_join_attr("items", vec![SPACE]), text("]")],
        )
        .define(NodeKind::Elision, vec![elision_token("value", ",")])
        .define(
            NodeKind::Object,
            vec![
                text("{"),
                optional(
                    "properties",
                    vec![
                        INDENT,
                        NEWLINE,
                        join_attr("properties", vec![text(","), NEWLINE]),
                        DEDENT,
                        NEWLINE,
                    ],
                ),
                text("}"),
            ],
        )
        .define(
            NodeKind::Property,
            vec![attr("key"), text(":"), SPACE, attr("value")],
        )
        .define(
            NodeKind::Assign,
            vec![
                attr("left"),
                OPTIONAL_SPACE,
                operator_attr("op"),
                SPACE,
                attr("right"),
            ],
        )
        .define(
            NodeKind::BinOp,
            vec![attr("left"), SPACE, operator_attr("op"), SPACE, attr("right")],
        )
        .define(NodeKind::UnaryOp, vec![operator_attr("op"), attr("value")])
        .define(
            NodeKind::FunctionCall,
            vec![
                attr("identifier"),
                text("("),
                join_attr("args", vec![text(","), SPACE]),
                text(")"),
            ],
        )
        .define(
            NodeKind::DotAccessor,
            vec![attr("node"), text("."), attr("identifier")],
        )
        .define(
            NodeKind::BracketAccessor,
            vec![attr("node"), text("["), attr("expr"), text("]")],
        )
        .define(NodeKind::ExprStatement, vec![attr("expr"), text(";")])
        .define(
            NodeKind::Return,
            vec![text("return"), optional("expr", vec![SPACE, attr("expr")]), text(";")],
        )
        .define(NodeKind::Block, braced_body("elements", Vec::new()))
        .define(
            NodeKind::If,
            vec![
                text("if"),
                SPACE,
                text("("),
                attr("predicate"),
                text(")"),
                SPACE,
                attr("consequent"),
                optional(
                    "alternative",
                    vec![SPACE, text("else"), SPACE, attr("alternative")],
                ),
            ],
        );

    // the function name belongs to the enclosing scope, so the scope opens
    // after it
    let mut func_decl = vec![
        text("function"),
        SPACE,
        attr(declare("identifier")),
        PUSH_SCOPE,
    ];
    func_decl.extend(parameters());
    func_decl.push(SPACE);
    func_decl.extend(braced_body("elements", vec![POP_SCOPE]));
    grammar.define(NodeKind::FuncDecl, func_decl);

    // a function expression's own name is only visible inside it
    let mut func_expr = vec![
        PUSH_SCOPE,
        text("function"),
        optional("identifier", vec![SPACE, attr(declare("identifier"))]),
    ];
    func_expr.extend(parameters());
    func_expr.push(SPACE);
    func_expr.extend(braced_body("elements", vec![POP_SCOPE]));
    grammar.define(NodeKind::FuncExpr, func_expr);

    grammar
}

#[cfg(test)]
#[path = "../tests/grammar.rs"]
mod tests;
