//! The [`Solver`] trait defining the contract with a constraint-solving engine.
//!
//! The engine that actually searches a hypergraph is a collaborator of this
//! crate, not part of it. It is reached through two operations: `load` turns
//! a normalized document into the engine's graph object, and `solve` searches
//! that graph for an output node. Any engine (the bundled search solver, a
//! test fake) implementing this trait can drive [`crate::simulate`].

use serde_json::{Map, Value};

use crate::solution::SolutionRecord;

/// Input bindings handed to the solver, keyed by node label in frame order.
pub type Inputs = Map<String, Value>;

/// The solving contract.
pub trait Solver {
    /// Solver-ready graph object built from a normalized document.
    type Graph;
    /// Failure raised while loading or solving.
    type Error: std::error::Error;

    /// Builds a graph object from a document already passed through
    /// [`crate::normalize`].
    fn load(&self, document: &Value) -> Result<Self::Graph, Self::Error>;

    /// Searches `graph` for a value of `output_node`.
    ///
    /// Returns `Ok(None)` when no solution exists for the given inputs.
    fn solve(
        &self,
        graph: &Self::Graph,
        output_node: &str,
        inputs: &Inputs,
        options: &SolveOptions,
    ) -> Result<Option<SolutionRecord>, Self::Error>;
}

/// Tunables passed through to [`Solver::solve`] unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Print the solution tree once found.
    pub to_print: bool,
    /// Minimum search index a solution for the output must reach.
    pub min_index: usize,
    /// Solver logging verbosity, only present when positive.
    pub logging_level: Option<u8>,
    /// Node labels to report on while searching.
    pub debug_nodes: Vec<String>,
    /// Edge labels to report on while searching.
    pub debug_edges: Vec<String>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            to_print: true,
            min_index: 0,
            logging_level: None,
            debug_nodes: Vec::new(),
            debug_edges: Vec::new(),
        }
    }
}
