use crate::rules::Rule;
use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Definitions keyed by node kind.
#[derive(Clone, Debug)]
pub struct Grammar<K> {
    definitions: FxHashMap<K, Vec<Rule>>,
}

impl<K: Copy + Eq + Hash> Grammar<K> {
    pub fn new() -> Self {
        Grammar {
            definitions: FxHashMap::default(),
        }
    }

    /// Register (or replace) the definition for `kind`.
    pub fn define(&mut self, kind: K, rules: Vec<Rule>) -> &mut Self {
        self.definitions.insert(kind, rules);
        self
    }

    #[must_use]
    pub fn with(mut self, kind: K, rules: Vec<Rule>) -> Self {
        self.define(kind, rules);
        self
    }

    pub fn get(&self, kind: K) -> Option<&[Rule]> {
        self.definitions.get(&kind).map(Vec::as_slice)
    }

    pub fn contains(&self, kind: K) -> bool {
        self.definitions.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<K: Copy + Eq + Hash> Default for Grammar<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> FromIterator<(K, Vec<Rule>)> for Grammar<K> {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Rule>)>>(iter: I) -> Self {
        Grammar {
            definitions: iter.into_iter().collect(),
        }
    }
}
