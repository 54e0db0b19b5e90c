use thiserror::Error;

/// Fatal errors raised while walking a tree.
///
/// Every variant means the tree does not match what the grammar (or a
/// handler plugged into it) expects; none of them are recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    /// No definition registered for an encountered node kind.
    #[error("no definition registered for node kind {kind}")]
    MissingDefinition { kind: String },

    /// A `Declare` rule fetched something that is not an identifier node.
    #[error("in {node}, the resolved attribute '{path}' is not an Identifier")]
    NotAnIdentifier { node: String, path: String },

    /// A `Resolve` rule was applied to a node that is not an identifier.
    #[error("the Resolve deferred only works with Identifier, got {node}")]
    ResolveOnNonIdentifier { node: String },

    /// An attribute held a value of the wrong shape for the rule reading it.
    #[error("in {node}, attribute '{attr}' is not {expected}")]
    InvalidAttribute {
        node: String,
        attr: String,
        expected: &'static str,
    },

    /// Scope push/pop markers did not pair up during a scope-tracking pass.
    #[error("unbalanced scope: expected to close {expected}, found {found}")]
    UnbalancedScope { expected: String, found: String },
}
