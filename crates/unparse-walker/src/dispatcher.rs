//! Definition and handler lookup.
//!
//! A [`Dispatcher`] is assembled once per render pass by a
//! [`DispatcherBuilder`] and is read-only while a walk runs. Any state a
//! handler needs (indentation depth, scope stacks) lives inside the
//! handler's own closure.

use crate::error::WalkError;
use crate::grammar::Grammar;
use crate::layout::token_handler_str_default;
use crate::node::Node;
use crate::rules::{DeferredKind, Layout, Rule, Token};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;
use tracing::trace;
use unparse_common::Chunk;

/// Renders a token's resolved value: `(token, dispatcher, node, value)`.
pub type TokenHandler<N> = Rc<dyn Fn(&Token, &Dispatcher<N>, &N, &str) -> Vec<Chunk>>;

/// Expands one layout marker (or a combination of them) into chunks.
pub type LayoutHandler<N> = Rc<dyn Fn(&Dispatcher<N>, &N, &LayoutContext<'_>) -> Vec<Chunk>>;

/// Receives each identifier node a `Declare` rule fetched.
pub type DeclareHandler<N> = Rc<dyn Fn(&Dispatcher<N>, &N)>;

/// Maps an identifier node to the text to render for it.
pub type ResolveHandler<N> = Rc<dyn Fn(&Dispatcher<N>, &N) -> String>;

/// Runs against the root node before the walk starts.
pub type PrewalkHook<N> = Rc<dyn Fn(&Dispatcher<N>, &N) -> Result<(), WalkError>>;

/// Textual surroundings of a layout marker at resolution time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutContext<'c> {
    /// Text of the chunk emitted right before the buffered run; `None` at
    /// the start of the stream.
    pub before: Option<&'c str>,
    /// Text of the chunk that triggered resolution; `None` at end of stream.
    pub after: Option<&'c str>,
    /// Text of the last chunk produced by a layout handler in this batch.
    pub prev: Option<&'c str>,
}

/// What [`Dispatcher::handler_for`] looks up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerKey<'k> {
    Token,
    /// A single marker or a combination of adjacent markers.
    Layout(&'k [Layout]),
    Deferred(DeferredKind),
}

pub enum Handler<'d, N: Node> {
    Token(&'d TokenHandler<N>),
    Layout(&'d LayoutHandler<N>),
    Declare(&'d DeclareHandler<N>),
    Resolve(&'d ResolveHandler<N>),
    /// Nothing registered; callers fall back to a no-op or pass-through.
    Unimplemented,
}

impl<N: Node> Handler<'_, N> {
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self, Handler::Unimplemented)
    }
}

impl<N: Node> fmt::Debug for Handler<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Handler::Token(_) => "Handler::Token",
            Handler::Layout(_) => "Handler::Layout",
            Handler::Declare(_) => "Handler::Declare",
            Handler::Resolve(_) => "Handler::Resolve",
            Handler::Unimplemented => "Handler::Unimplemented",
        })
    }
}

// =============================================================================
// Layout combination table
// =============================================================================

struct TrieNode<N: Node> {
    children: SmallVec<[(Layout, usize); 4]>,
    handler: Option<LayoutHandler<N>>,
}

impl<N: Node> TrieNode<N> {
    fn empty() -> Self {
        TrieNode {
            children: SmallVec::new(),
            handler: None,
        }
    }

    fn child(&self, layout: Layout) -> Option<usize> {
        self.children
            .iter()
            .find(|(key, _)| *key == layout)
            .map(|(_, idx)| *idx)
    }
}

/// Prefix tree over marker sequences. Index 0 is the root.
struct LayoutTable<N: Node> {
    nodes: Vec<TrieNode<N>>,
}

impl<N: Node> LayoutTable<N> {
    fn new() -> Self {
        LayoutTable {
            nodes: vec![TrieNode::empty()],
        }
    }

    fn insert(&mut self, key: &[Layout], handler: LayoutHandler<N>) {
        let mut current = 0;
        for &layout in key {
            current = match self.nodes[current].child(layout) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::empty());
                    self.nodes[current].children.push((layout, next));
                    next
                }
            };
        }
        // the empty key is never a marker
        if current != 0 {
            self.nodes[current].handler = Some(handler);
        }
    }

    fn get(&self, key: &[Layout]) -> Option<&LayoutHandler<N>> {
        let mut current = 0;
        for &layout in key {
            current = self.nodes[current].child(layout)?;
        }
        self.nodes[current].handler.as_ref()
    }

    /// Longest registered combination (two or more markers) that prefixes
    /// `run`.
    fn longest_combination(&self, run: &[Layout]) -> Option<(usize, &LayoutHandler<N>)> {
        let mut current = 0;
        let mut best = None;
        for (idx, &layout) in run.iter().enumerate() {
            let Some(next) = self.nodes[current].child(layout) else {
                break;
            };
            current = next;
            if idx >= 1
                && let Some(handler) = &self.nodes[current].handler
            {
                best = Some((idx + 1, handler));
            }
        }
        best
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Definitions by node kind plus every registered handler.
pub struct Dispatcher<N: Node> {
    grammar: Rc<Grammar<N::Kind>>,
    token_handler: TokenHandler<N>,
    layouts: LayoutTable<N>,
    declare: Option<DeclareHandler<N>>,
    resolve: Option<ResolveHandler<N>>,
    prewalk_hooks: Vec<PrewalkHook<N>>,
    indent_str: String,
    newline_str: String,
}

impl<N: Node> Dispatcher<N> {
    /// A dispatcher with the default token handler and nothing else.
    pub fn new(grammar: Rc<Grammar<N::Kind>>) -> Self {
        DispatcherBuilder::new(grammar).build()
    }

    pub fn builder(grammar: Rc<Grammar<N::Kind>>) -> DispatcherBuilder<N> {
        DispatcherBuilder::new(grammar)
    }

    /// The definition registered for `node`'s kind.
    pub fn definition_for(&self, node: &N) -> Result<&[Rule], WalkError> {
        let kind = node.kind();
        trace!(?kind, "definition lookup");
        self.grammar
            .get(kind)
            .ok_or_else(|| WalkError::MissingDefinition {
                kind: format!("{kind:?}"),
            })
    }

    pub fn handler_for(&self, key: HandlerKey<'_>) -> Handler<'_, N> {
        match key {
            HandlerKey::Token => Handler::Token(&self.token_handler),
            HandlerKey::Layout(layouts) => self
                .layouts
                .get(layouts)
                .map_or(Handler::Unimplemented, Handler::Layout),
            HandlerKey::Deferred(DeferredKind::Declare) => self
                .declare
                .as_ref()
                .map_or(Handler::Unimplemented, Handler::Declare),
            HandlerKey::Deferred(DeferredKind::Resolve) => self
                .resolve
                .as_ref()
                .map_or(Handler::Unimplemented, Handler::Resolve),
            HandlerKey::Deferred(DeferredKind::Iter) => Handler::Unimplemented,
        }
    }

    pub fn token_handler(&self) -> &TokenHandler<N> {
        &self.token_handler
    }

    pub fn layout_handler(&self, layout: Layout) -> Option<&LayoutHandler<N>> {
        self.layouts.get(&[layout])
    }

    pub(crate) fn layout_combination(
        &self,
        run: &[Layout],
    ) -> Option<(usize, &LayoutHandler<N>)> {
        self.layouts.longest_combination(run)
    }

    pub fn declare_handler(&self) -> Option<&DeclareHandler<N>> {
        self.declare.as_ref()
    }

    pub fn resolve_handler(&self) -> Option<&ResolveHandler<N>> {
        self.resolve.as_ref()
    }

    pub fn prewalk_hooks(&self) -> &[PrewalkHook<N>] {
        &self.prewalk_hooks
    }

    pub fn grammar(&self) -> &Grammar<N::Kind> {
        &self.grammar
    }

    /// Shared handle on the grammar, for building sibling dispatchers.
    pub fn grammar_rc(&self) -> Rc<Grammar<N::Kind>> {
        Rc::clone(&self.grammar)
    }

    pub fn indent_str(&self) -> &str {
        &self.indent_str
    }

    pub fn newline_str(&self) -> &str {
        &self.newline_str
    }
}

impl<N: Node> fmt::Debug for Dispatcher<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("definitions", &self.grammar.len())
            .field("layout_entries", &self.layouts.nodes.len())
            .field("declare", &self.declare.is_some())
            .field("resolve", &self.resolve.is_some())
            .field("prewalk_hooks", &self.prewalk_hooks.len())
            .field("indent_str", &self.indent_str)
            .field("newline_str", &self.newline_str)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct DispatcherBuilder<N: Node> {
    grammar: Rc<Grammar<N::Kind>>,
    token_handler: TokenHandler<N>,
    layouts: LayoutTable<N>,
    declare: Option<DeclareHandler<N>>,
    resolve: Option<ResolveHandler<N>>,
    prewalk_hooks: Vec<PrewalkHook<N>>,
    indent_str: String,
    newline_str: String,
}

impl<N: Node> DispatcherBuilder<N> {
    pub fn new(grammar: Rc<Grammar<N::Kind>>) -> Self {
        DispatcherBuilder {
            grammar,
            token_handler: Rc::new(token_handler_str_default::<N>),
            layouts: LayoutTable::new(),
            declare: None,
            resolve: None,
            prewalk_hooks: Vec::new(),
            indent_str: "  ".to_string(),
            newline_str: "\n".to_string(),
        }
    }

    #[must_use]
    pub fn token_handler(
        self,
        handler: impl Fn(&Token, &Dispatcher<N>, &N, &str) -> Vec<Chunk> + 'static,
    ) -> Self {
        self.token_handler_rc(Rc::new(handler))
    }

    #[must_use]
    pub fn token_handler_rc(mut self, handler: TokenHandler<N>) -> Self {
        self.token_handler = handler;
        self
    }

    /// Register a handler for one marker or a combination of markers.
    /// Later registrations for the same key win.
    #[must_use]
    pub fn layout(
        self,
        key: &[Layout],
        handler: impl Fn(&Dispatcher<N>, &N, &LayoutContext<'_>) -> Vec<Chunk> + 'static,
    ) -> Self {
        self.layout_rc(key, Rc::new(handler))
    }

    #[must_use]
    pub fn layout_rc(mut self, key: &[Layout], handler: LayoutHandler<N>) -> Self {
        self.layouts.insert(key, handler);
        self
    }

    #[must_use]
    pub fn declare(self, handler: impl Fn(&Dispatcher<N>, &N) + 'static) -> Self {
        self.declare_rc(Rc::new(handler))
    }

    #[must_use]
    pub fn declare_rc(mut self, handler: DeclareHandler<N>) -> Self {
        self.declare = Some(handler);
        self
    }

    #[must_use]
    pub fn resolve(self, handler: impl Fn(&Dispatcher<N>, &N) -> String + 'static) -> Self {
        self.resolve_rc(Rc::new(handler))
    }

    #[must_use]
    pub fn resolve_rc(mut self, handler: ResolveHandler<N>) -> Self {
        self.resolve = Some(handler);
        self
    }

    #[must_use]
    pub fn prewalk(
        self,
        hook: impl Fn(&Dispatcher<N>, &N) -> Result<(), WalkError> + 'static,
    ) -> Self {
        self.prewalk_rc(Rc::new(hook))
    }

    #[must_use]
    pub fn prewalk_rc(mut self, hook: PrewalkHook<N>) -> Self {
        self.prewalk_hooks.push(hook);
        self
    }

    #[must_use]
    pub fn indent_str(mut self, indent_str: impl Into<String>) -> Self {
        self.indent_str = indent_str.into();
        self
    }

    #[must_use]
    pub fn newline_str(mut self, newline_str: impl Into<String>) -> Self {
        self.newline_str = newline_str.into();
        self
    }

    pub fn build(self) -> Dispatcher<N> {
        Dispatcher {
            grammar: self.grammar,
            token_handler: self.token_handler,
            layouts: self.layouts,
            declare: self.declare,
            resolve: self.resolve,
            prewalk_hooks: self.prewalk_hooks,
            indent_str: self.indent_str,
            newline_str: self.newline_str,
        }
    }
}

#[cfg(test)]
#[path = "../tests/dispatcher.rs"]
mod tests;
