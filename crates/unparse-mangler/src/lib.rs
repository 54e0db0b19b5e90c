//! Scope tracking and identifier shortening.
//!
//! [`obfuscate`] plugs into an `Unparser` as a rule-set factory. Scoping
//! nodes carry `PushScope`/`PopScope` markers in their definitions and
//! identifier declarations go through `Declare`; with those in place the
//! render renames every local symbol to the shortest free name.

pub mod names;
pub mod scope;
pub mod shortener;

pub use names::{NameGenerator, RESERVED_WORDS, is_reserved_word, name_at};
pub use scope::{NodeKey, Scope, ScopeId, ScopeTree};
pub use shortener::{Shortener, ShortenerOptions, obfuscate};
