//! Two-pass identifier shortening.
//!
//! Pass one walks the whole tree with scope and counting handlers only, so
//! every scope knows all of its symbols and their reference counts before a
//! single name is chosen. Pass two is the real render; its resolve handler
//! only looks names up.

use crate::names::{NameGenerator, is_reserved_word};
use crate::scope::{NodeKey, ScopeId, ScopeTree};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::cmp::Reverse;
use std::rc::Rc;
use tracing::{debug, trace, warn};
use unparse_walker::{Dispatcher, DispatcherBuilder, Layout, Node, RuleSet, WalkError, walk_node};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortenerOptions {
    /// Also rename symbols declared in the global scope.
    pub shorten_global: bool,
    /// Names that must never be handed out.
    pub reserved: Vec<String>,
}

/// Scope tracker for one render pass.
#[derive(Debug)]
pub struct Shortener {
    options: ShortenerOptions,
    tree: ScopeTree,
    stack: Vec<ScopeId>,
    scope_nodes: FxHashMap<NodeKey, ScopeId>,
    /// Scope each identifier node was read in.
    identifiers: FxHashMap<NodeKey, ScopeId>,
    error: Option<WalkError>,
}

impl Shortener {
    pub fn new(options: ShortenerOptions) -> Self {
        Shortener {
            options,
            tree: ScopeTree::new(),
            stack: vec![ScopeId::GLOBAL],
            scope_nodes: FxHashMap::default(),
            identifiers: FxHashMap::default(),
            error: None,
        }
    }

    pub fn options(&self) -> &ShortenerOptions {
        &self.options
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::GLOBAL)
    }

    /// The scope opened for `node`, if pass one saw it.
    pub fn scope_for<N>(&self, node: &N) -> Option<ScopeId> {
        self.scope_nodes.get(&NodeKey::of(node)).copied()
    }

    pub fn push_scope<N: Node>(&mut self, node: &N) {
        let key = NodeKey::of(node);
        let parent = self.current();
        let id = self.tree.push(parent, key, format!("{:?}", node.kind()));
        trace!(scope = %id, %parent, kind = ?node.kind(), "push scope");
        self.scope_nodes.insert(key, id);
        self.stack.push(id);
    }

    pub fn pop_scope<N: Node>(&mut self, node: &N) {
        let top = self.current();
        let scope = self.tree.get(top);
        if scope.is_global() || scope.node != Some(NodeKey::of(node)) {
            let expected = scope.label.clone();
            let found = format!("{:?}", node.kind());
            warn!(%expected, %found, "scope popped by a node that did not push it");
            if self.error.is_none() {
                self.error = Some(WalkError::UnbalancedScope { expected, found });
            }
            return;
        }
        trace!(scope = %top, kind = ?node.kind(), "pop scope");
        self.stack.pop();
    }

    /// Record the identifier `node` as declared in the current scope.
    pub fn declare<N: Node>(&mut self, node: &N) {
        if let Some(name) = node.identifier_name() {
            let scope = self.current();
            trace!(%scope, name, "declare");
            self.tree.declare(scope, name);
        }
    }

    /// Count a read of the identifier `node` and return its name unchanged.
    pub fn reference<N: Node>(&mut self, node: &N) -> String {
        let Some(name) = node.identifier_name() else {
            return String::new();
        };
        let scope = self.current();
        self.identifiers.insert(NodeKey::of(node), scope);
        self.tree.reference(scope, name);
        name.to_string()
    }

    /// Close pass one: validate the scope stack and choose replacement
    /// names for every renameable scope.
    pub fn finish(&mut self) -> Result<(), WalkError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.stack.len() > 1 {
            let expected = self.tree.get(self.current()).label.clone();
            warn!(%expected, "scopes left open at end of tree");
            return Err(WalkError::UnbalancedScope {
                expected,
                found: "end of tree".to_string(),
            });
        }

        let totals = self.reference_totals();
        let mut taken: FxHashSet<String> = self.tree.consumed_symbols().iter().cloned().collect();
        for scope in self.tree.iter() {
            taken.extend(scope.referenced_symbols.keys().cloned());
        }
        taken.extend(self.options.reserved.iter().cloned());

        // parents are always allocated before their children
        let ids: Vec<ScopeId> = self.tree.iter().map(|scope| scope.id).collect();
        for id in ids {
            if id == ScopeId::GLOBAL && !self.options.shorten_global {
                continue;
            }
            self.assign_names(id, &totals, &taken);
        }
        Ok(())
    }

    /// References to each declared symbol, summed over every scope that
    /// reads it, keyed by the declaring scope.
    fn reference_totals(&self) -> FxHashMap<(ScopeId, String), usize> {
        let mut totals = FxHashMap::default();
        for scope in self.tree.iter() {
            for (symbol, count) in &scope.referenced_symbols {
                if let Some(owner) = self.tree.declaring_scope(scope.id, symbol) {
                    *totals.entry((owner, symbol.clone())).or_insert(0) += count;
                }
            }
        }
        totals
    }

    fn assign_names(
        &mut self,
        id: ScopeId,
        totals: &FxHashMap<(ScopeId, String), usize>,
        taken: &FxHashSet<String>,
    ) {
        let inherited: FxHashSet<String> = self
            .tree
            .ancestors(id)
            .skip(1)
            .flat_map(|ancestor| self.tree.get(ancestor).remapped.values().cloned())
            .collect();

        let mut symbols: Vec<String> = self.tree.get(id).local_symbols.iter().cloned().collect();
        symbols.sort_by_key(|symbol| {
            Reverse(totals.get(&(id, symbol.clone())).copied().unwrap_or(0))
        });

        let mut generator = NameGenerator::new().filter(|candidate| {
            !taken.contains(candidate)
                && !inherited.contains(candidate)
                && !is_reserved_word(candidate)
        });
        let mut remapped = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let Some(replacement) = generator.next() else {
                break;
            };
            debug!(scope = %id, %symbol, %replacement, "rename");
            remapped.push((symbol, replacement));
        }
        self.tree.get_mut(id).remapped.extend(remapped);
    }

    /// The name to render for the identifier `node` in pass two.
    pub fn rename<N: Node>(&self, node: &N) -> String {
        let Some(name) = node.identifier_name() else {
            return String::new();
        };
        self.identifiers
            .get(&NodeKey::of(node))
            .and_then(|scope| self.tree.declaring_scope(*scope, name))
            .and_then(|owner| self.tree.get(owner).remapped.get(name))
            .map_or_else(|| name.to_string(), Clone::clone)
    }
}

/// Run pass one over `root`, feeding `shortener`.
fn collect<N: Node>(
    dispatcher: &Dispatcher<N>,
    root: &N,
    shortener: &Rc<RefCell<Shortener>>,
) -> Result<(), WalkError> {
    let push = Rc::clone(shortener);
    let pop = Rc::clone(shortener);
    let declare = Rc::clone(shortener);
    let resolve = Rc::clone(shortener);
    let counting = DispatcherBuilder::new(dispatcher.grammar_rc())
        .token_handler_rc(Rc::clone(dispatcher.token_handler()))
        .layout(&[Layout::PushScope], move |_, node, _| {
            push.borrow_mut().push_scope(node);
            Vec::new()
        })
        .layout(&[Layout::PopScope], move |_, node, _| {
            pop.borrow_mut().pop_scope(node);
            Vec::new()
        })
        .declare(move |_, node| declare.borrow_mut().declare(node))
        .resolve(move |_, node| resolve.borrow_mut().reference(node))
        .build();

    for chunk in walk_node(&counting, root)? {
        chunk?;
    }
    shortener.borrow_mut().finish()
}

/// Rule-set factory that renames local identifiers to short names.
///
/// Each dispatcher built from the factory owns its own [`Shortener`]; the
/// prewalk hook resets it and runs pass one against the root.
pub fn obfuscate<N: Node>(options: ShortenerOptions) -> impl Fn() -> RuleSet<N> + 'static {
    move || {
        let shortener = Rc::new(RefCell::new(Shortener::new(options.clone())));
        let prewalk = Rc::clone(&shortener);
        let rename = Rc::clone(&shortener);
        RuleSet::new()
            .prewalk(move |dispatcher, root| {
                let fresh = Shortener::new(prewalk.borrow().options().clone());
                *prewalk.borrow_mut() = fresh;
                collect(dispatcher, root, &prewalk)
            })
            .resolve(move |_, node| rename.borrow().rename(node))
    }
}

#[cfg(test)]
#[path = "../tests/shortener.rs"]
mod tests;
