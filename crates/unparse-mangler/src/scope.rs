//! Lexical scopes.
//!
//! Scopes live in an arena ([`ScopeTree`]) and point at their parent by
//! [`ScopeId`]. Scope 0 is the implicit global scope that encloses the
//! whole tree.

use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// Index of a scope within its [`ScopeTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a node within the tree being rendered.
///
/// The tree is borrowed immutably for the whole render, so a node's
/// address is stable across both passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

impl NodeKey {
    pub fn of<N>(node: &N) -> Self {
        NodeKey(std::ptr::from_ref(node).addr())
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub id: ScopeId,
    /// The scope-introducing node; `None` for the global scope.
    pub node: Option<NodeKey>,
    /// Human-readable description of the node, for diagnostics.
    pub label: String,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Symbol name to the number of times it is referenced in this scope.
    pub referenced_symbols: IndexMap<String, usize>,
    /// Names declared directly in this scope, in declaration order.
    pub local_symbols: IndexSet<String>,
    /// Replacement names chosen for local symbols.
    pub remapped: IndexMap<String, String>,
}

impl Scope {
    fn new(id: ScopeId, node: Option<NodeKey>, label: String, parent: Option<ScopeId>) -> Self {
        Scope {
            id,
            node,
            label,
            parent,
            children: Vec::new(),
            referenced_symbols: IndexMap::new(),
            local_symbols: IndexSet::new(),
            remapped: IndexMap::new(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    pub fn reference_count(&self, symbol: &str) -> usize {
        self.referenced_symbols.get(symbol).copied().unwrap_or(0)
    }
}

/// All scopes of one render pass, plus every symbol declared anywhere.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    consumed_symbols: IndexSet<String>,
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope::new(ScopeId::GLOBAL, None, "global".to_string(), None)],
            consumed_symbols: IndexSet::new(),
        }
    }

    /// Open a child scope of `parent`.
    pub fn push(&mut self, parent: ScopeId, node: NodeKey, label: String) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes
            .push(Scope::new(id, Some(node), label, Some(parent)));
        self.scopes[parent.index()].children.push(id);
        id
    }

    #[inline]
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn global(&self) -> &Scope {
        self.get(ScopeId::GLOBAL)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Every symbol declared in any scope.
    pub fn consumed_symbols(&self) -> &IndexSet<String> {
        &self.consumed_symbols
    }

    pub fn declare(&mut self, id: ScopeId, symbol: &str) {
        self.consumed_symbols.insert(symbol.to_string());
        let scope = self.get_mut(id);
        scope.local_symbols.insert(symbol.to_string());
        scope
            .referenced_symbols
            .entry(symbol.to_string())
            .or_insert(0);
    }

    pub fn reference(&mut self, id: ScopeId, symbol: &str) {
        *self
            .get_mut(id)
            .referenced_symbols
            .entry(symbol.to_string())
            .or_insert(0) += 1;
    }

    /// `id` followed by each enclosing scope up to the global one.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), |current| self.get(*current).parent)
    }

    /// The nearest scope, starting at `id`, that declares `symbol`.
    pub fn declaring_scope(&self, id: ScopeId, symbol: &str) -> Option<ScopeId> {
        self.ancestors(id)
            .find(|scope| self.get(*scope).local_symbols.contains(symbol))
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/scope.rs"]
mod tests;
