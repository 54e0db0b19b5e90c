//! Rule types.
//!
//! A definition is an ordered list of [`Rule`]s describing how one node
//! kind is rendered. There are three disjoint kinds of rule:
//!
//! - [`Token`]: produces output chunks when invoked against a node.
//! - [`Layout`]: an inert marker (space, newline, indent, scope push/pop)
//!   whose effect comes entirely from the handler registered for it.
//! - [`Deferred`]: computes the value a token renders, optionally running a
//!   registered handler first (declare/resolve identifier bookkeeping).
//!
//! Rules are plain data; the traversal that interprets them lives in
//! [`crate::walk`].

use crate::dispatcher::Dispatcher;
use crate::error::WalkError;
use crate::node::{Node, Value};
use crate::walk::Walk;
use std::borrow::Cow;

/// One step of a definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Token(Token),
    Layout(Layout),
}

impl From<Token> for Rule {
    fn from(token: Token) -> Self {
        Rule::Token(token)
    }
}

impl From<Layout> for Rule {
    fn from(layout: Layout) -> Self {
        Rule::Layout(layout)
    }
}

/// Inert layout markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layout {
    Space,
    OptionalSpace,
    Newline,
    OptionalNewline,
    /// Increment the indentation level.
    Indent,
    /// Decrement the indentation level.
    Dedent,
    PushScope,
    PopScope,
}

pub const SPACE: Rule = Rule::Layout(Layout::Space);
pub const OPTIONAL_SPACE: Rule = Rule::Layout(Layout::OptionalSpace);
pub const NEWLINE: Rule = Rule::Layout(Layout::Newline);
pub const OPTIONAL_NEWLINE: Rule = Rule::Layout(Layout::OptionalNewline);
pub const INDENT: Rule = Rule::Layout(Layout::Indent);
pub const DEDENT: Rule = Rule::Layout(Layout::Dedent);
pub const PUSH_SCOPE: Rule = Rule::Layout(Layout::PushScope);
pub const POP_SCOPE: Rule = Rule::Layout(Layout::PopScope);

/// Where a token gets its value from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrSource {
    /// A named attribute of the node.
    Name(&'static str),
    /// A value computed by a deferred rule.
    Deferred(Deferred),
}

impl AttrSource {
    pub fn fetch<'a, N: Node>(
        &self,
        dispatcher: &Dispatcher<N>,
        node: &'a N,
    ) -> Result<Value<'a, N>, WalkError> {
        match self {
            AttrSource::Name(name) => Ok(node.attr(name)),
            AttrSource::Deferred(deferred) => deferred.evaluate(dispatcher, node),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            AttrSource::Name(name) => name,
            AttrSource::Deferred(Deferred::Declare(name)) => name,
            AttrSource::Deferred(Deferred::Iter) => "<iter>",
            AttrSource::Deferred(Deferred::Resolve) => "<resolve>",
        }
    }
}

impl From<&'static str> for AttrSource {
    fn from(name: &'static str) -> Self {
        AttrSource::Name(name)
    }
}

impl From<Deferred> for AttrSource {
    fn from(deferred: Deferred) -> Self {
        AttrSource::Deferred(deferred)
    }
}

/// Content-producing rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Render the attribute; nothing when it is empty.
    Attr(AttrSource),
    /// Render a fixed literal.
    Text(Cow<'static, str>),
    /// Render each element of a sequence, walking `value` between elements.
    JoinAttr { attr: AttrSource, value: Vec<Rule> },
    /// Render `value` repeated by the integer held in `attr`.
    ElisionToken {
        attr: AttrSource,
        value: Cow<'static, str>,
    },
    /// Array-literal join: elisions already imply their commas, so the
    /// comma and the join segment are suppressed next to them.
    ElisionJoinAttr { attr: AttrSource, value: Vec<Rule> },
    /// Walk `value` only when `attr` is non-empty.
    Optional { attr: &'static str, value: Vec<Rule> },
    /// An operator symbol, read from `attr` when configured.
    Operator {
        attr: Option<&'static str>,
        value: Cow<'static, str>,
    },
}

static ELISION_COMMA: [Rule; 1] = [Rule::Token(Token::Text(Cow::Borrowed(",")))];

impl Token {
    /// Expand this token against `node`, feeding the walk.
    pub(crate) fn invoke<'a, N: Node>(
        &'a self,
        walk: &mut Walk<'a, N>,
        node: &'a N,
    ) -> Result<(), WalkError> {
        let dispatcher = walk.dispatcher();
        match self {
            Token::Attr(source) => {
                let value = source.fetch(dispatcher, node)?;
                if !value.is_empty() {
                    walk.resolve(self, node, value)?;
                }
            }
            Token::Text(text) => walk.resolve(self, node, Value::str(text))?,
            Token::Operator { attr, value } => {
                let value = match attr {
                    Some(name) => node.attr(name),
                    None => Value::str(value),
                };
                if !value.is_empty() {
                    walk.resolve(self, node, value)?;
                }
            }
            Token::ElisionToken { attr, value } => {
                let count = match attr.fetch(dispatcher, node)? {
                    Value::Int(count) => usize::try_from(count).unwrap_or(0),
                    Value::Empty => 0,
                    _ => return Err(invalid(node, attr.describe(), "an integer")),
                };
                walk.resolve(self, node, Value::Str(Cow::Owned(value.repeat(count))))?;
            }
            Token::JoinAttr { attr, value } => {
                let items = sequence(node, attr, attr.fetch(dispatcher, node)?)?;
                walk.push_join(node, items, value, false);
            }
            Token::ElisionJoinAttr { attr, value } => {
                let items = sequence(node, attr, attr.fetch(dispatcher, node)?)?;
                walk.push_join(node, items, value, true);
            }
            Token::Optional { attr, value } => {
                if !node.attr(attr).is_empty() {
                    walk.push_rules(node, value);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn elision_comma() -> &'static [Rule] {
        &ELISION_COMMA
    }
}

fn sequence<'a, N: Node>(
    node: &N,
    attr: &AttrSource,
    value: Value<'a, N>,
) -> Result<Vec<&'a N>, WalkError> {
    match value {
        Value::Nodes(nodes) => Ok(nodes),
        Value::Node(single) => Ok(vec![single]),
        Value::Empty => Ok(Vec::new()),
        Value::Str(_) | Value::Int(_) => Err(invalid(node, attr.describe(), "a node sequence")),
    }
}

fn invalid<N: Node>(node: &N, attr: &str, expected: &'static str) -> WalkError {
    WalkError::InvalidAttribute {
        node: format!("{:?}", node.kind()),
        attr: attr.to_string(),
        expected,
    }
}

/// Value-computation rules used as a token's attribute source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Deferred {
    /// The node's children, in order.
    Iter,
    /// Record the identifier(s) held in the attribute as declarations.
    Declare(&'static str),
    /// Resolve an identifier node to the name to render.
    Resolve,
}

/// Handler-table key for deferred rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeferredKind {
    Iter,
    Declare,
    Resolve,
}

impl Deferred {
    pub const fn kind(&self) -> DeferredKind {
        match self {
            Deferred::Iter => DeferredKind::Iter,
            Deferred::Declare(_) => DeferredKind::Declare,
            Deferred::Resolve => DeferredKind::Resolve,
        }
    }

    pub fn evaluate<'a, N: Node>(
        &self,
        dispatcher: &Dispatcher<N>,
        node: &'a N,
    ) -> Result<Value<'a, N>, WalkError> {
        match self {
            Deferred::Iter => Ok(Value::Nodes(node.children())),
            Deferred::Declare(attr) => declare_items(dispatcher, node, attr),
            Deferred::Resolve => {
                let Some(name) = node.identifier_name() else {
                    return Err(WalkError::ResolveOnNonIdentifier {
                        node: format!("{:?}", node.kind()),
                    });
                };
                match dispatcher.resolve_handler() {
                    Some(handler) => Ok(Value::Str(Cow::Owned(handler(dispatcher, node)))),
                    None => Ok(Value::str(name)),
                }
            }
        }
    }
}

fn declare_items<'a, N: Node>(
    dispatcher: &Dispatcher<N>,
    node: &'a N,
    attr: &str,
) -> Result<Value<'a, N>, WalkError> {
    let target = node.attr(attr);
    let not_identifier = |path: String| WalkError::NotAnIdentifier {
        node: format!("{:?}", node.kind()),
        path,
    };

    let items: Vec<&N> = match &target {
        // can't record nothing
        Value::Empty => return Ok(target),
        Value::Node(item) => {
            if item.identifier_name().is_none() {
                return Err(not_identifier(attr.to_string()));
            }
            vec![*item]
        }
        Value::Nodes(items) => {
            if let Some(idx) = items.iter().position(|item| item.identifier_name().is_none()) {
                return Err(not_identifier(format!("{attr}[{idx}]")));
            }
            items.clone()
        }
        Value::Str(_) | Value::Int(_) => return Err(not_identifier(attr.to_string())),
    };

    if let Some(handler) = dispatcher.declare_handler() {
        for item in items {
            handler(dispatcher, item);
        }
    }
    Ok(target)
}

// =============================================================================
// Definition-building helpers
// =============================================================================

pub fn text(value: impl Into<Cow<'static, str>>) -> Rule {
    Rule::Token(Token::Text(value.into()))
}

pub fn attr(source: impl Into<AttrSource>) -> Rule {
    Rule::Token(Token::Attr(source.into()))
}

pub fn join_attr(source: impl Into<AttrSource>, value: Vec<Rule>) -> Rule {
    Rule::Token(Token::JoinAttr {
        attr: source.into(),
        value,
    })
}

pub fn elision_token(source: impl Into<AttrSource>, value: impl Into<Cow<'static, str>>) -> Rule {
    Rule::Token(Token::ElisionToken {
        attr: source.into(),
        value: value.into(),
    })
}

pub fn elision_join_attr(source: impl Into<AttrSource>, value: Vec<Rule>) -> Rule {
    Rule::Token(Token::ElisionJoinAttr {
        attr: source.into(),
        value,
    })
}

pub fn optional(attr: &'static str, value: Vec<Rule>) -> Rule {
    Rule::Token(Token::Optional { attr, value })
}

/// A literal operator symbol.
pub fn operator(value: impl Into<Cow<'static, str>>) -> Rule {
    Rule::Token(Token::Operator {
        attr: None,
        value: value.into(),
    })
}

/// An operator symbol read from the node.
pub fn operator_attr(attr: &'static str) -> Rule {
    Rule::Token(Token::Operator {
        attr: Some(attr),
        value: Cow::Borrowed(""),
    })
}

pub const fn iter() -> AttrSource {
    AttrSource::Deferred(Deferred::Iter)
}

pub const fn declare(attr: &'static str) -> AttrSource {
    AttrSource::Deferred(Deferred::Declare(attr))
}

pub const fn resolve() -> AttrSource {
    AttrSource::Deferred(Deferred::Resolve)
}

/// Children joined by newlines.
pub fn children_newline() -> Rule {
    join_attr(iter(), vec![NEWLINE])
}

/// Children joined by `, `.
pub fn children_comma() -> Rule {
    join_attr(iter(), vec![text(","), SPACE])
}

#[cfg(test)]
#[path = "../tests/rules.rs"]
mod tests;
