pub mod document;
pub mod error;
pub mod frame;
pub mod normalize;
pub mod report;
pub mod simulate;
pub mod solution;
pub mod solver;

// Re-export commonly used types
pub use document::{graph_body, load_document};
pub use error::CoreError;
pub use frame::resolve_inputs;
pub use normalize::{dedent, normalize};
pub use report::{ErrorReport, Report, NO_SOLUTION_MESSAGE};
pub use simulate::simulate;
pub use solution::{summarize, PathSummary, SolutionRecord, TraversalNode};
pub use solver::{Inputs, SolveOptions, Solver};
