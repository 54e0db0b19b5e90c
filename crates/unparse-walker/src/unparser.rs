//! Glue between a grammar, the handler rule sets and the walk.

use crate::dispatcher::{
    DeclareHandler, Dispatcher, DispatcherBuilder, LayoutContext, LayoutHandler, PrewalkHook,
    ResolveHandler, TokenHandler,
};
use crate::error::WalkError;
use crate::grammar::Grammar;
use crate::layout::{default_layout_handlers, indentation, token_handler_str_default};
use crate::node::Node;
use crate::rules::{Layout, Token};
use crate::walk::walk_node;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::rc::Rc;
use tracing::debug;
use unparse_common::{Chunk, join_text};

/// Output formatting knobs handed to every dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnparserOptions {
    pub indent_str: String,
    pub newline_str: String,
}

impl Default for UnparserOptions {
    fn default() -> Self {
        UnparserOptions {
            indent_str: "  ".to_string(),
            newline_str: "\n".to_string(),
        }
    }
}

/// A bundle of handlers contributed to a dispatcher.
pub struct RuleSet<N: Node> {
    pub layout_handlers: Vec<(SmallVec<[Layout; 4]>, LayoutHandler<N>)>,
    pub declare: Option<DeclareHandler<N>>,
    pub resolve: Option<ResolveHandler<N>>,
    pub prewalk_hooks: Vec<PrewalkHook<N>>,
}

impl<N: Node> RuleSet<N> {
    pub fn new() -> Self {
        RuleSet {
            layout_handlers: Vec::new(),
            declare: None,
            resolve: None,
            prewalk_hooks: Vec::new(),
        }
    }

    #[must_use]
    pub fn layout(
        mut self,
        key: &[Layout],
        handler: impl Fn(&Dispatcher<N>, &N, &LayoutContext<'_>) -> Vec<Chunk> + 'static,
    ) -> Self {
        self.layout_handlers
            .push((SmallVec::from_slice(key), Rc::new(handler)));
        self
    }

    #[must_use]
    pub fn declare(mut self, handler: impl Fn(&Dispatcher<N>, &N) + 'static) -> Self {
        self.declare = Some(Rc::new(handler));
        self
    }

    #[must_use]
    pub fn resolve(mut self, handler: impl Fn(&Dispatcher<N>, &N) -> String + 'static) -> Self {
        self.resolve = Some(Rc::new(handler));
        self
    }

    #[must_use]
    pub fn prewalk(
        mut self,
        hook: impl Fn(&Dispatcher<N>, &N) -> Result<(), WalkError> + 'static,
    ) -> Self {
        self.prewalk_hooks.push(Rc::new(hook));
        self
    }

    /// Register everything in this set; later sets override earlier ones.
    pub fn apply(&self, mut builder: DispatcherBuilder<N>) -> DispatcherBuilder<N> {
        for (key, handler) in &self.layout_handlers {
            builder = builder.layout_rc(key, Rc::clone(handler));
        }
        if let Some(declare) = &self.declare {
            builder = builder.declare_rc(Rc::clone(declare));
        }
        if let Some(resolve) = &self.resolve {
            builder = builder.resolve_rc(Rc::clone(resolve));
        }
        for hook in &self.prewalk_hooks {
            builder = builder.prewalk_rc(Rc::clone(hook));
        }
        builder
    }
}

impl<N: Node> Default for RuleSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> Clone for RuleSet<N> {
    fn clone(&self) -> Self {
        RuleSet {
            layout_handlers: self.layout_handlers.clone(),
            declare: self.declare.clone(),
            resolve: self.resolve.clone(),
            prewalk_hooks: self.prewalk_hooks.clone(),
        }
    }
}

/// Produces a fresh [`RuleSet`] for every render pass.
pub type RuleFactory<N> = Rc<dyn Fn() -> RuleSet<N>>;

/// Renders trees with one grammar and a fixed set of rule factories.
///
/// Every call to [`Unparser::render`] builds a new dispatcher, calling
/// each factory again, so handler state (indentation depth, scopes) is
/// never shared between passes.
pub struct Unparser<N: Node> {
    grammar: Rc<Grammar<N::Kind>>,
    token_handler: TokenHandler<N>,
    rules: Vec<RuleFactory<N>>,
    /// Handlers applied after all factories.
    extra: RuleSet<N>,
    options: UnparserOptions,
}

impl<N: Node> Unparser<N> {
    /// Default layout handlers plus indentation.
    pub fn new(grammar: Grammar<N::Kind>) -> Self {
        Self::bare(grammar)
            .rule(default_layout_handlers::<N>)
            .rule(indentation::<N>(None))
    }

    /// No rule sets at all: every layout marker renders nothing.
    pub fn bare(grammar: Grammar<N::Kind>) -> Self {
        Self::from_shared(Rc::new(grammar))
    }

    pub fn from_shared(grammar: Rc<Grammar<N::Kind>>) -> Self {
        Unparser {
            grammar,
            token_handler: Rc::new(token_handler_str_default::<N>),
            rules: Vec::new(),
            extra: RuleSet::new(),
            options: UnparserOptions::default(),
        }
    }

    #[must_use]
    pub fn token_handler(
        mut self,
        handler: impl Fn(&Token, &Dispatcher<N>, &N, &str) -> Vec<Chunk> + 'static,
    ) -> Self {
        self.token_handler = Rc::new(handler);
        self
    }

    #[must_use]
    pub fn rule(mut self, factory: impl Fn() -> RuleSet<N> + 'static) -> Self {
        self.rules.push(Rc::new(factory));
        self
    }

    #[must_use]
    pub fn layout(
        mut self,
        key: &[Layout],
        handler: impl Fn(&Dispatcher<N>, &N, &LayoutContext<'_>) -> Vec<Chunk> + 'static,
    ) -> Self {
        self.extra = self.extra.layout(key, handler);
        self
    }

    #[must_use]
    pub fn declare(mut self, handler: impl Fn(&Dispatcher<N>, &N) + 'static) -> Self {
        self.extra = self.extra.declare(handler);
        self
    }

    #[must_use]
    pub fn resolve(mut self, handler: impl Fn(&Dispatcher<N>, &N) -> String + 'static) -> Self {
        self.extra = self.extra.resolve(handler);
        self
    }

    #[must_use]
    pub fn prewalk(
        mut self,
        hook: impl Fn(&Dispatcher<N>, &N) -> Result<(), WalkError> + 'static,
    ) -> Self {
        self.extra = self.extra.prewalk(hook);
        self
    }

    #[must_use]
    pub fn options(mut self, options: UnparserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn grammar(&self) -> &Grammar<N::Kind> {
        &self.grammar
    }

    /// A dispatcher for one render pass.
    pub fn dispatcher(&self) -> Dispatcher<N> {
        let mut builder = DispatcherBuilder::new(Rc::clone(&self.grammar))
            .token_handler_rc(Rc::clone(&self.token_handler))
            .indent_str(self.options.indent_str.clone())
            .newline_str(self.options.newline_str.clone());
        for factory in &self.rules {
            builder = factory().apply(builder);
        }
        self.extra.apply(builder).build()
    }

    /// Render `root` into chunks.
    pub fn render(&self, root: &N) -> Result<Vec<Chunk>, WalkError> {
        let dispatcher = self.dispatcher();
        debug!(kind = ?root.kind(), "render pass started");
        for hook in dispatcher.prewalk_hooks() {
            hook(&dispatcher, root)?;
        }
        let chunks = walk_node(&dispatcher, root)?.collect::<Result<Vec<_>, _>>()?;
        debug!(kind = ?root.kind(), chunks = chunks.len(), "render pass finished");
        Ok(chunks)
    }

    pub fn render_to_string(&self, root: &N) -> Result<String, WalkError> {
        Ok(join_text(&self.render(root)?))
    }
}

#[cfg(test)]
#[path = "../tests/unparser.rs"]
mod tests;
