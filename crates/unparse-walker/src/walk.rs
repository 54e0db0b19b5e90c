//! The walk engine.
//!
//! [`Walk`] is a pull-based iterator over the chunks produced by applying a
//! definition to a node. Instead of recursing, it keeps an explicit stack of
//! frames (a rule sequence being applied to a node, or the pending steps of
//! a join), so a deep tree never grows the native call stack.
//!
//! Layout markers are never executed when reached. They are queued as
//! [`LayoutRuleChunk`]s and resolved as one batch when the next content
//! chunk is emitted (or the stream ends). At that point the text on both
//! sides of the run is known:
//!
//! ```text
//! rules:   Text("var")  Space  Attr(..)  Space  Operator("=")
//! queue:                [Space]         [Space]
//! output:  "var"        " "    "a"       " "    "="
//! ```
//!
//! Within a batch, adjacent markers are greedily combined into the longest
//! run that has a registered combination handler; the rest fall back to
//! their single-marker handler, or to nothing.

use crate::dispatcher::{Dispatcher, LayoutContext, LayoutHandler};
use crate::error::WalkError;
use crate::node::{Node, Value};
use crate::rules::{Layout, Rule, Token};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::slice;
use std::vec;
use tracing::trace;
use unparse_common::Chunk;

/// A layout marker waiting for its surrounding text.
pub struct LayoutRuleChunk<'a, N: Node> {
    pub layout: Layout,
    /// The single-marker handler, if one is registered.
    pub handler: Option<&'a LayoutHandler<N>>,
    /// The node whose definition queued the marker.
    pub node: &'a N,
}

impl<N: Node> fmt::Debug for LayoutRuleChunk<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutRuleChunk")
            .field("layout", &self.layout)
            .field("handler", &self.handler.is_some())
            .field("node", &self.node.kind())
            .finish()
    }
}

enum Step<'a, N> {
    /// Apply a rule sequence to a node.
    Rules(&'a N, &'a [Rule]),
    /// Walk a node with its own definition.
    Node(&'a N),
}

enum Frame<'a, N> {
    Rules {
        node: &'a N,
        rules: slice::Iter<'a, Rule>,
    },
    Steps(vec::IntoIter<Step<'a, N>>),
}

/// Lazy chunk stream for one walk.
///
/// Yields `Err` at most once; the stream is finished after an error.
pub struct Walk<'a, N: Node> {
    dispatcher: &'a Dispatcher<N>,
    stack: Vec<Frame<'a, N>>,
    pending: Vec<LayoutRuleChunk<'a, N>>,
    ready: VecDeque<Chunk>,
    /// Text of the last content chunk, i.e. `before` for the next batch.
    last_text: Option<String>,
    finished: bool,
}

impl<'a, N: Node> Walk<'a, N> {
    pub fn new(dispatcher: &'a Dispatcher<N>, node: &'a N, definition: &'a [Rule]) -> Self {
        Walk {
            dispatcher,
            stack: vec![Frame::Rules {
                node,
                rules: definition.iter(),
            }],
            pending: Vec::new(),
            ready: VecDeque::new(),
            last_text: None,
            finished: false,
        }
    }

    pub fn dispatcher(&self) -> &'a Dispatcher<N> {
        self.dispatcher
    }

    pub(crate) fn push_rules(&mut self, node: &'a N, rules: &'a [Rule]) {
        self.stack.push(Frame::Rules {
            node,
            rules: rules.iter(),
        });
    }

    /// Schedule `items` joined by `separator`.
    ///
    /// With `elision` set, an element following a non-elision gets a comma
    /// (attributed to that element), and the separator is skipped in front
    /// of elisions since they render their own commas.
    pub(crate) fn push_join(
        &mut self,
        node: &'a N,
        items: Vec<&'a N>,
        separator: &'a [Rule],
        elision: bool,
    ) {
        if items.is_empty() {
            return;
        }
        let mut steps = Vec::with_capacity(items.len() * 2);
        let mut previous: Option<&'a N> = None;
        for item in items {
            if let Some(prev) = previous {
                if !elision {
                    steps.push(Step::Rules(node, separator));
                } else {
                    if !prev.is_elision() {
                        steps.push(Step::Rules(item, Token::elision_comma()));
                    }
                    if !item.is_elision() {
                        steps.push(Step::Rules(node, separator));
                    }
                }
            }
            steps.push(Step::Node(item));
            previous = Some(item);
        }
        self.stack.push(Frame::Steps(steps.into_iter()));
    }

    /// Render a value a token produced for `node`.
    ///
    /// Nodes are walked with their own definitions; scalars go through the
    /// token handler.
    pub(crate) fn resolve(
        &mut self,
        token: &Token,
        node: &'a N,
        value: Value<'a, N>,
    ) -> Result<(), WalkError> {
        match value {
            Value::Empty => {}
            Value::Node(child) => self.walk_child(child)?,
            Value::Nodes(children) => self.push_join(node, children, &[], false),
            Value::Str(text) => self.render_token(token, node, &text),
            Value::Int(n) => self.render_token(token, node, &n.to_string()),
        }
        Ok(())
    }

    fn render_token(&mut self, token: &Token, node: &'a N, text: &str) {
        let dispatcher = self.dispatcher;
        let handler = dispatcher.token_handler();
        for chunk in handler(token, dispatcher, node, text) {
            self.emit(chunk);
        }
    }

    fn walk_child(&mut self, child: &'a N) -> Result<(), WalkError> {
        let dispatcher = self.dispatcher;
        let definition = dispatcher.definition_for(child)?;
        self.push_rules(child, definition);
        Ok(())
    }

    fn queue_layout(&mut self, layout: Layout, node: &'a N) {
        self.pending.push(LayoutRuleChunk {
            layout,
            handler: self.dispatcher.layout_handler(layout),
            node,
        });
    }

    fn emit(&mut self, chunk: Chunk) {
        if !self.pending.is_empty() {
            self.resolve_layouts(Some(&chunk.text));
        }
        self.last_text = Some(chunk.text.clone());
        self.ready.push_back(chunk);
    }

    /// Expand every queued marker into chunks, ahead of the chunk that
    /// triggered resolution.
    fn resolve_layouts(&mut self, after: Option<&str>) {
        let pending = std::mem::take(&mut self.pending);
        let run: SmallVec<[Layout; 8]> = pending.iter().map(|lrc| lrc.layout).collect();
        trace!(markers = ?run, "resolving layout batch");

        let dispatcher = self.dispatcher;
        let before = self.last_text.as_deref();
        let mut prev: Option<String> = None;
        let mut idx = 0;
        while idx < pending.len() {
            let node = pending[idx].node;
            let (len, handler) = match dispatcher.layout_combination(&run[idx..]) {
                Some((len, handler)) => (len, Some(handler)),
                None => (1, pending[idx].handler),
            };
            idx += len;
            let Some(handler) = handler else {
                continue;
            };
            let context = LayoutContext {
                before,
                after,
                prev: prev.as_deref(),
            };
            for chunk in handler(dispatcher, node, &context) {
                prev = Some(chunk.text.clone());
                self.ready.push_back(chunk);
            }
        }
    }

    /// Advance by one rule or step. `Ok(false)` once the stack is empty.
    fn step(&mut self) -> Result<bool, WalkError> {
        let Some(frame) = self.stack.last_mut() else {
            return Ok(false);
        };
        match frame {
            Frame::Rules { node, rules } => {
                let node = *node;
                match rules.next() {
                    None => {
                        self.stack.pop();
                    }
                    Some(Rule::Token(token)) => token.invoke(self, node)?,
                    Some(Rule::Layout(layout)) => self.queue_layout(*layout, node),
                }
            }
            Frame::Steps(steps) => match steps.next() {
                None => {
                    self.stack.pop();
                }
                Some(Step::Rules(node, rules)) => self.push_rules(node, rules),
                Some(Step::Node(item)) => self.walk_child(item)?,
            },
        }
        Ok(true)
    }

    fn abort(&mut self) {
        self.finished = true;
        self.stack.clear();
        self.pending.clear();
        self.ready.clear();
    }
}

impl<N: Node> Iterator for Walk<'_, N> {
    type Item = Result<Chunk, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                return Some(Ok(chunk));
            }
            if self.finished {
                return None;
            }
            match self.step() {
                Ok(true) => {}
                Ok(false) => {
                    if !self.pending.is_empty() {
                        self.resolve_layouts(None);
                    }
                    self.finished = true;
                }
                Err(err) => {
                    self.abort();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<N: Node> FusedIterator for Walk<'_, N> {}

/// Walk `node` with an explicit definition.
pub fn walk<'a, N: Node>(
    dispatcher: &'a Dispatcher<N>,
    node: &'a N,
    definition: &'a [Rule],
) -> Walk<'a, N> {
    Walk::new(dispatcher, node, definition)
}

/// Walk `node` with the definition registered for its kind.
pub fn walk_node<'a, N: Node>(
    dispatcher: &'a Dispatcher<N>,
    node: &'a N,
) -> Result<Walk<'a, N>, WalkError> {
    let definition = dispatcher.definition_for(node)?;
    Ok(Walk::new(dispatcher, node, definition))
}

#[cfg(test)]
#[path = "../tests/walk.rs"]
mod tests;
