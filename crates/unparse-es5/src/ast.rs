//! ES5 syntax tree.
//!
//! A deliberately small subset of ES5: enough statements and expressions to
//! exercise every rule kind, scoping and source positions. Leaf nodes carry
//! the position they were parsed from.

use std::fmt;
use unparse_common::Position;
use unparse_walker::Value;

/// Discriminant of [`Node`]; the grammar is keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Program,
    VarStatement,
    VarDecl,
    Identifier,
    PropIdentifier,
    Number,
    String,
    Boolean,
    Null,
    Array,
    Elision,
    Object,
    Property,
    Assign,
    BinOp,
    UnaryOp,
    FunctionCall,
    DotAccessor,
    BracketAccessor,
    ExprStatement,
    Return,
    Block,
    If,
    FuncDecl,
    FuncExpr,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// ES5 syntax tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    // =========================================================================
    // Program and statements
    // =========================================================================
    Program(Vec<Self>),

    /// `var a = 1, b;`
    VarStatement(Vec<Self>),

    /// One declarator of a `var` statement.
    VarDecl {
        identifier: Box<Self>,
        initializer: Option<Box<Self>>,
    },

    ExprStatement(Box<Self>),

    Return(Option<Box<Self>>),

    Block(Vec<Self>),

    If {
        predicate: Box<Self>,
        consequent: Box<Self>,
        alternative: Option<Box<Self>>,
    },

    FuncDecl {
        identifier: Box<Self>,
        parameters: Vec<Self>,
        elements: Vec<Self>,
    },

    // =========================================================================
    // Leaves
    // =========================================================================
    /// A name subject to scoping: `foo`.
    Identifier {
        value: String,
        pos: Option<Position>,
    },

    /// A property name after `.` or as an object key; never renamed.
    PropIdentifier {
        value: String,
        pos: Option<Position>,
    },

    /// Numeric literal, as written.
    Number {
        value: String,
        pos: Option<Position>,
    },

    /// String literal, as written (quotes included).
    String {
        value: String,
        pos: Option<Position>,
    },

    Boolean {
        value: bool,
        pos: Option<Position>,
    },

    Null {
        pos: Option<Position>,
    },

    /// A run of holes in an array literal; `value` is the number of commas.
    Elision {
        value: usize,
        pos: Option<Position>,
    },

    // =========================================================================
    // Expressions
    // =========================================================================
    Array(Vec<Self>),

    Object(Vec<Self>),

    /// `key: value` inside an object literal.
    Property {
        key: Box<Self>,
        value: Box<Self>,
    },

    /// `left op right` with an assignment operator.
    Assign {
        left: Box<Self>,
        op: String,
        right: Box<Self>,
    },

    BinOp {
        left: Box<Self>,
        op: String,
        right: Box<Self>,
    },

    /// Prefix operator. Keyword operators carry their trailing space.
    UnaryOp {
        op: String,
        value: Box<Self>,
    },

    FunctionCall {
        identifier: Box<Self>,
        args: Vec<Self>,
    },

    DotAccessor {
        node: Box<Self>,
        identifier: Box<Self>,
    },

    BracketAccessor {
        node: Box<Self>,
        expr: Box<Self>,
    },

    FuncExpr {
        identifier: Option<Box<Self>>,
        parameters: Vec<Self>,
        elements: Vec<Self>,
    },
}

// =========================================================================
// Builder helpers
// =========================================================================

impl Node {
    pub const fn program(statements: Vec<Self>) -> Self {
        Self::Program(statements)
    }

    /// `var` statement with the given declarators.
    pub const fn var(declarations: Vec<Self>) -> Self {
        Self::VarStatement(declarations)
    }

    pub fn var_decl(name: impl Into<String>, init: Option<Self>) -> Self {
        Self::VarDecl {
            identifier: Box::new(Self::id(name)),
            initializer: init.map(Box::new),
        }
    }

    pub fn expr(expr: Self) -> Self {
        Self::ExprStatement(Box::new(expr))
    }

    pub fn ret(expr: Option<Self>) -> Self {
        Self::Return(expr.map(Box::new))
    }

    pub const fn block(statements: Vec<Self>) -> Self {
        Self::Block(statements)
    }

    pub fn if_stmt(predicate: Self, consequent: Self, alternative: Option<Self>) -> Self {
        Self::If {
            predicate: Box::new(predicate),
            consequent: Box::new(consequent),
            alternative: alternative.map(Box::new),
        }
    }

    pub fn func_decl(name: impl Into<String>, params: &[&str], body: Vec<Self>) -> Self {
        Self::FuncDecl {
            identifier: Box::new(Self::id(name)),
            parameters: params.iter().map(|param| Self::id(*param)).collect(),
            elements: body,
        }
    }

    pub fn func_expr(name: Option<&str>, params: &[&str], body: Vec<Self>) -> Self {
        Self::FuncExpr {
            identifier: name.map(|name| Box::new(Self::id(name))),
            parameters: params.iter().map(|param| Self::id(*param)).collect(),
            elements: body,
        }
    }

    pub fn id(name: impl Into<String>) -> Self {
        Self::Identifier {
            value: name.into(),
            pos: None,
        }
    }

    pub fn prop_id(name: impl Into<String>) -> Self {
        Self::PropIdentifier {
            value: name.into(),
            pos: None,
        }
    }

    pub fn number(n: impl Into<String>) -> Self {
        Self::Number {
            value: n.into(),
            pos: None,
        }
    }

    /// A string literal; `literal` is the source text including quotes.
    pub fn string(literal: impl Into<String>) -> Self {
        Self::String {
            value: literal.into(),
            pos: None,
        }
    }

    pub const fn boolean(value: bool) -> Self {
        Self::Boolean { value, pos: None }
    }

    pub const fn null() -> Self {
        Self::Null { pos: None }
    }

    pub const fn elision(count: usize) -> Self {
        Self::Elision {
            value: count,
            pos: None,
        }
    }

    pub const fn array(items: Vec<Self>) -> Self {
        Self::Array(items)
    }

    pub const fn object(properties: Vec<Self>) -> Self {
        Self::Object(properties)
    }

    pub fn property(key: Self, value: Self) -> Self {
        Self::Property {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn assign(target: Self, op: impl Into<String>, value: Self) -> Self {
        Self::Assign {
            left: Box::new(target),
            op: op.into(),
            right: Box::new(value),
        }
    }

    pub fn binary(left: Self, op: impl Into<String>, right: Self) -> Self {
        Self::BinOp {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
    }

    /// Prefix operator; `typeof`, `void` and `delete` get their separating
    /// space here since the grammar puts no layout after the operator.
    pub fn unary(op: &str, operand: Self) -> Self {
        let op = if op.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            format!("{op} ")
        } else {
            op.to_string()
        };
        Self::UnaryOp {
            op,
            value: Box::new(operand),
        }
    }

    pub fn call(callee: Self, args: Vec<Self>) -> Self {
        Self::FunctionCall {
            identifier: Box::new(callee),
            args,
        }
    }

    /// `object.property`
    pub fn dot(object: Self, property: impl Into<String>) -> Self {
        Self::DotAccessor {
            node: Box::new(object),
            identifier: Box::new(Self::prop_id(property)),
        }
    }

    /// `object[index]`
    pub fn bracket(object: Self, index: Self) -> Self {
        Self::BracketAccessor {
            node: Box::new(object),
            expr: Box::new(index),
        }
    }

    /// Attach a source position. Only leaves record one.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        match &mut self {
            Self::Identifier { pos, .. }
            | Self::PropIdentifier { pos, .. }
            | Self::Number { pos, .. }
            | Self::String { pos, .. }
            | Self::Boolean { pos, .. }
            | Self::Null { pos }
            | Self::Elision { pos, .. } => *pos = Some(Position::new(line, column)),
            _ => {}
        }
        self
    }

    pub const fn node_kind(&self) -> NodeKind {
        match self {
            Self::Program(_) => NodeKind::Program,
            Self::VarStatement(_) => NodeKind::VarStatement,
            Self::VarDecl { .. } => NodeKind::VarDecl,
            Self::ExprStatement(_) => NodeKind::ExprStatement,
            Self::Return(_) => NodeKind::Return,
            Self::Block(_) => NodeKind::Block,
            Self::If { .. } => NodeKind::If,
            Self::FuncDecl { .. } => NodeKind::FuncDecl,
            Self::Identifier { .. } => NodeKind::Identifier,
            Self::PropIdentifier { .. } => NodeKind::PropIdentifier,
            Self::Number { .. } => NodeKind::Number,
            Self::String { .. } => NodeKind::String,
            Self::Boolean { .. } => NodeKind::Boolean,
            Self::Null { .. } => NodeKind::Null,
            Self::Elision { .. } => NodeKind::Elision,
            Self::Array(_) => NodeKind::Array,
            Self::Object(_) => NodeKind::Object,
            Self::Property { .. } => NodeKind::Property,
            Self::Assign { .. } => NodeKind::Assign,
            Self::BinOp { .. } => NodeKind::BinOp,
            Self::UnaryOp { .. } => NodeKind::UnaryOp,
            Self::FunctionCall { .. } => NodeKind::FunctionCall,
            Self::DotAccessor { .. } => NodeKind::DotAccessor,
            Self::BracketAccessor { .. } => NodeKind::BracketAccessor,
            Self::FuncExpr { .. } => NodeKind::FuncExpr,
        }
    }
}

fn one(node: &Node) -> Value<'_, Node> {
    Value::Node(node)
}

fn maybe(node: Option<&Node>) -> Value<'_, Node> {
    Value::from_option(node)
}

fn many(nodes: &[Node]) -> Value<'_, Node> {
    Value::Nodes(nodes.iter().collect())
}

impl unparse_walker::Node for Node {
    type Kind = NodeKind;

    fn kind(&self) -> NodeKind {
        self.node_kind()
    }

    fn attr(&self, name: &str) -> Value<'_, Self> {
        match (self, name) {
            (Self::Program(body) | Self::VarStatement(body), "children") => many(body),
            (Self::VarDecl { identifier, .. }, "identifier") => one(identifier),
            (Self::VarDecl { initializer, .. }, "initializer") => maybe(initializer.as_deref()),
            (Self::ExprStatement(expr), "expr") => one(expr),
            (Self::Return(expr), "expr") => maybe(expr.as_deref()),
            (Self::Block(elements), "elements") => many(elements),
            (Self::If { predicate, .. }, "predicate") => one(predicate),
            (Self::If { consequent, .. }, "consequent") => one(consequent),
            (Self::If { alternative, .. }, "alternative") => maybe(alternative.as_deref()),
            (Self::FuncDecl { identifier, .. }, "identifier") => one(identifier),
            (Self::FuncExpr { identifier, .. }, "identifier") => maybe(identifier.as_deref()),
            (
                Self::FuncDecl { parameters, .. } | Self::FuncExpr { parameters, .. },
                "parameters",
            ) => many(parameters),
            (Self::FuncDecl { elements, .. } | Self::FuncExpr { elements, .. }, "elements") => {
                many(elements)
            }
            (
                Self::Identifier { value, .. }
                | Self::PropIdentifier { value, .. }
                | Self::Number { value, .. }
                | Self::String { value, .. },
                "value",
            ) => Value::str(value),
            (Self::Boolean { value, .. }, "value") => {
                Value::str(if *value { "true" } else { "false" })
            }
            (Self::Null { .. }, "value") => Value::str("null"),
            (Self::Elision { value, .. }, "value") => {
                Value::Int(i64::try_from(*value).unwrap_or(i64::MAX))
            }
            (Self::Array(items), "items") => many(items),
            (Self::Object(properties), "properties") => many(properties),
            (Self::Property { key, .. }, "key") => one(key),
            (Self::Property { value, .. }, "value") => one(value),
            (Self::Assign { left, .. } | Self::BinOp { left, .. }, "left") => one(left),
            (Self::Assign { right, .. } | Self::BinOp { right, .. }, "right") => one(right),
            (Self::Assign { op, .. } | Self::BinOp { op, .. } | Self::UnaryOp { op, .. }, "op") => {
                Value::str(op)
            }
            (Self::UnaryOp { value, .. }, "value") => one(value),
            (Self::FunctionCall { identifier, .. }, "identifier") => one(identifier),
            (Self::FunctionCall { args, .. }, "args") => many(args),
            (Self::DotAccessor { node, .. } | Self::BracketAccessor { node, .. }, "node") => {
                one(node)
            }
            (Self::DotAccessor { identifier, .. }, "identifier") => one(identifier),
            (Self::BracketAccessor { expr, .. }, "expr") => one(expr),
            _ => Value::Empty,
        }
    }

    fn children(&self) -> Vec<&Self> {
        match self {
            Self::Program(nodes)
            | Self::VarStatement(nodes)
            | Self::Block(nodes)
            | Self::Array(nodes)
            | Self::Object(nodes) => nodes.iter().collect(),
            Self::VarDecl {
                identifier,
                initializer,
            } => std::iter::once(&**identifier)
                .chain(initializer.as_deref())
                .collect(),
            Self::ExprStatement(expr) => vec![&**expr],
            Self::Return(expr) => expr.as_deref().into_iter().collect(),
            Self::If {
                predicate,
                consequent,
                alternative,
            } => [&**predicate, &**consequent]
                .into_iter()
                .chain(alternative.as_deref())
                .collect(),
            Self::FuncDecl {
                identifier,
                parameters,
                elements,
            } => std::iter::once(&**identifier)
                .chain(parameters)
                .chain(elements)
                .collect(),
            Self::FuncExpr {
                identifier,
                parameters,
                elements,
            } => identifier
                .as_deref()
                .into_iter()
                .chain(parameters)
                .chain(elements)
                .collect(),
            Self::Property { key, value } => vec![&**key, &**value],
            Self::Assign { left, right, .. } | Self::BinOp { left, right, .. } => {
                vec![&**left, &**right]
            }
            Self::UnaryOp { value, .. } => vec![&**value],
            Self::FunctionCall { identifier, args } => {
                std::iter::once(&**identifier).chain(args).collect()
            }
            Self::DotAccessor { node, identifier } => vec![&**node, &**identifier],
            Self::BracketAccessor { node, expr } => vec![&**node, &**expr],
            Self::Identifier { .. }
            | Self::PropIdentifier { .. }
            | Self::Number { .. }
            | Self::String { .. }
            | Self::Boolean { .. }
            | Self::Null { .. }
            | Self::Elision { .. } => Vec::new(),
        }
    }

    fn identifier_name(&self) -> Option<&str> {
        match self {
            Self::Identifier { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    fn is_elision(&self) -> bool {
        matches!(self, Self::Elision { .. })
    }

    fn position(&self) -> Option<Position> {
        match self {
            Self::Identifier { pos, .. }
            | Self::PropIdentifier { pos, .. }
            | Self::Number { pos, .. }
            | Self::String { pos, .. }
            | Self::Boolean { pos, .. }
            | Self::Null { pos }
            | Self::Elision { pos, .. } => *pos,
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/ast.rs"]
mod tests;
