//! Reference search solver for hypergraph simulations.
//!
//! Implements the [`chg_core::Solver`] contract over a small, fixed relation
//! vocabulary so that documents can be simulated without an external engine.
//!
//! # Architecture
//!
//! - [`Hypergraph`] is the loaded graph: a bipartite petgraph where node
//!   vertices feed edge vertices, which feed their target node vertex.
//! - [`Relation`] and [`Predicate`] are the named operations an edge's
//!   `rel`, `via` and `index_via` text may select.
//! - [`SearchSolver`] resolves an output node by backward search, choosing
//!   the cheapest viable derivation and recording it as a traversal tree.
//!
//! # Usage
//!
//! ```ignore
//! let solver = SearchSolver::default();
//! let solution = chg_core::simulate(&solver, &document, "out", "f1", &SolveOptions::default())?;
//! ```

pub mod error;
pub mod graph;
pub mod relation;
pub mod search;

pub use error::EngineError;
pub use graph::{EdgeData, Hypergraph, NodeData};
pub use relation::{Predicate, Relation, RelationError};
pub use search::{EngineConfig, SearchSolver};
