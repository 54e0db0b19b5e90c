//! The node contract consumed by the walker.
//!
//! The renderer never owns or mutates the tree; it only needs to know each
//! node's kind (to find its definition) and to read named attributes.

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use unparse_common::Position;

/// A typed tree element with named attributes.
pub trait Node: fmt::Debug + Sized + 'static {
    /// Closed set of node kinds; the grammar is keyed by it.
    type Kind: Copy + Eq + Hash + fmt::Debug + 'static;

    fn kind(&self) -> Self::Kind;

    /// Look up a named attribute. Unknown names read as [`Value::Empty`].
    fn attr(&self, name: &str) -> Value<'_, Self>;

    /// Direct children in source order (what the `Iter` deferred yields).
    fn children(&self) -> Vec<&Self>;

    /// The name this node stands for if it is an identifier-kind node.
    fn identifier_name(&self) -> Option<&str>;

    /// Whether this node is an elision placeholder in an array literal.
    fn is_elision(&self) -> bool {
        false
    }

    /// Where this node starts in the original source, if known.
    fn position(&self) -> Option<Position> {
        None
    }
}

/// An attribute value as seen by the rules.
#[derive(Debug)]
pub enum Value<'a, N> {
    /// Absent or `None`.
    Empty,
    Str(Cow<'a, str>),
    Int(i64),
    Node(&'a N),
    Nodes(Vec<&'a N>),
}

impl<'a, N> Value<'a, N> {
    /// Empty means absent, `None`, or an empty sequence. An empty string
    /// is still a value.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Nodes(nodes) => nodes.is_empty(),
            _ => false,
        }
    }

    pub fn from_option(node: Option<&'a N>) -> Self {
        node.map_or(Value::Empty, Value::Node)
    }

    pub fn str(text: &'a str) -> Self {
        Value::Str(Cow::Borrowed(text))
    }

    pub fn as_node(&self) -> Option<&'a N> {
        match self {
            Value::Node(node) => Some(*node),
            _ => None,
        }
    }

    /// Render a scalar value as text. Node values have no text of their own.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Str(text) => Some(Cow::Borrowed(text.as_ref())),
            Value::Int(n) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }
}
