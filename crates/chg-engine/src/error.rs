//! Error types for loading and searching hypergraphs.

use thiserror::Error;

/// Errors produced by the search solver.
///
/// Loading errors reject the document before any search starts. Search
/// errors abort the whole solve; an edge whose relation merely fails to
/// evaluate is skipped instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The document has no usable graph body or collections.
    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },

    /// A node record could not be loaded.
    #[error("malformed node '{label}': {reason}")]
    MalformedNode { label: String, reason: String },

    /// An edge record could not be loaded.
    #[error("malformed edge '{label}': {reason}")]
    MalformedEdge { label: String, reason: String },

    /// An edge's `rel` text names no known relation.
    #[error("unknown relation '{name}' on edge '{edge}'")]
    UnknownRelation { edge: String, name: String },

    /// An edge's `via` or `index_via` text names no known predicate.
    #[error("unknown predicate '{name}' in {field} of edge '{edge}'")]
    UnknownPredicate {
        edge: String,
        field: &'static str,
        name: String,
    },

    /// The requested node does not exist in the hypergraph.
    #[error("node '{label}' is not in the hypergraph")]
    UnknownNode { label: String },

    /// The search applied more edges than the configured limit allows.
    #[error("search step limit ({limit}) exceeded")]
    StepLimitExceeded { limit: usize },

    /// A graph invariant was violated.
    #[error("internal error: {message}")]
    Internal { message: String },
}
