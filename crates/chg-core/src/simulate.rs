//! Simulation driver: normalize, load, resolve inputs, solve.

use serde_json::Value;
use tracing::debug;

use crate::frame::resolve_inputs;
use crate::normalize::normalize;
use crate::solution::SolutionRecord;
use crate::solver::{SolveOptions, Solver};

/// Runs one simulation of `document` for `output_node`.
///
/// Inputs come from the frame named `frame_key`; an unknown frame means no
/// inputs. Load and solve failures are returned untouched, as is the
/// solver's `None` when no solution exists.
pub fn simulate<S: Solver>(
    solver: &S,
    document: &Value,
    output_node: &str,
    frame_key: &str,
    options: &SolveOptions,
) -> Result<Option<SolutionRecord>, S::Error> {
    let normalized = normalize(document);
    let graph = solver.load(&normalized)?;
    let inputs = resolve_inputs(document, frame_key);
    debug!(output_node, frame_key, inputs = inputs.len(), "solving");
    solver.solve(&graph, output_node, &inputs, options)
}
