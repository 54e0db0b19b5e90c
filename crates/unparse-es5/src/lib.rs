//! Reference ES5 syntax tree and grammar.
//!
//! [`Node`] implements the walker's node contract and [`definitions`]
//! covers every [`NodeKind`], so any tree built here can be rendered:
//!
//! ```
//! use unparse_es5::{Node, pretty_print};
//!
//! let program = Node::program(vec![Node::var(vec![Node::var_decl(
//!     "a",
//!     Some(Node::number("1")),
//! )])]);
//! assert_eq!(pretty_print(&program).unwrap(), "var a = 1;");
//! ```

pub mod ast;
pub mod grammar;

pub use ast::{Node, NodeKind};
pub use grammar::definitions;

use unparse_walker::layout::minimum_layout_handlers;
use unparse_walker::{Unparser, WalkError};

/// Indented output with the default layout rules.
pub fn pretty_printer() -> Unparser<Node> {
    Unparser::new(definitions())
}

/// Output with the minimum whitespace needed to keep tokens apart.
pub fn minifier() -> Unparser<Node> {
    Unparser::bare(definitions()).rule(minimum_layout_handlers::<Node>)
}

pub fn pretty_print(node: &Node) -> Result<String, WalkError> {
    pretty_printer().render_to_string(node)
}

pub fn minify_print(node: &Node) -> Result<String, WalkError> {
    minifier().render_to_string(node)
}
