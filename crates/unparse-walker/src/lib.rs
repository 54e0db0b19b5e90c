//! Rule-driven tree walking renderer.
//!
//! A tree of typed nodes is rendered back into source text by interpreting a
//! per-node-kind rule table (the [`Grammar`]) instead of hand-written
//! printing code for each kind.
//!
//! # Architecture
//!
//! - [`rules`]: the closed rule vocabulary. `Token` rules produce chunks,
//!   `Layout` rules are inert markers, `Deferred` rules compute the value a
//!   token renders (with declare/resolve side effects).
//! - [`dispatcher`]: definitions by node kind plus the registered token,
//!   layout and deferred handlers.
//! - [`walk`]: the lazy traversal. Layout markers are buffered until the
//!   surrounding content is known, then resolved as a batch.
//! - [`layout`]: stock token/layout handlers and the rule sets built from them.
//! - [`unparser`]: glue that builds a fresh dispatcher per render pass.

pub mod dispatcher;
pub mod error;
pub mod grammar;
pub mod layout;
pub mod node;
pub mod rules;
pub mod unparser;
pub mod walk;

pub use dispatcher::{
    DeclareHandler, Dispatcher, DispatcherBuilder, Handler, HandlerKey, LayoutContext,
    LayoutHandler, PrewalkHook, ResolveHandler, TokenHandler,
};
pub use error::WalkError;
pub use grammar::Grammar;
pub use node::{Node, Value};
pub use rules::{AttrSource, Deferred, DeferredKind, Layout, Rule, Token};
pub use unparser::{RuleFactory, RuleSet, Unparser, UnparserOptions};
pub use walk::{LayoutRuleChunk, Walk, walk, walk_node};

pub use unparse_common::{Chunk, Position, join_text};

#[cfg(test)]
#[path = "../tests/test_node.rs"]
pub(crate) mod test_node;
