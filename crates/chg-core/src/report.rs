//! Report shapes written by the command-line shell.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::solution::{summarize, SolutionRecord};

/// Error message reported when the solver finds no solution.
pub const NO_SOLUTION_MESSAGE: &str = "No solution found";

/// Successful simulation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub msg: String,
    pub value: Value,
    pub cost: f64,
    pub tree: String,
    pub target_node: String,
    pub path_nodes: BTreeSet<String>,
    pub path_edges: BTreeSet<String>,
    pub num_nodes: usize,
    pub num_edges: usize,
}

impl Report {
    pub fn from_solution(target_node: &str, solution: &SolutionRecord) -> Self {
        let summary = summarize(solution);
        Report {
            msg: solution.to_string(),
            value: solution.value.clone(),
            cost: solution.cost,
            tree: solution.tree(),
            target_node: target_node.to_string(),
            path_nodes: summary.path_nodes,
            path_edges: summary.path_edges,
            num_nodes: summary.num_nodes,
            num_edges: summary.num_edges,
        }
    }
}

/// Failure report: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: impl ToString) -> Self {
        ErrorReport {
            error: error.to_string(),
        }
    }

    pub fn no_solution() -> Self {
        ErrorReport::new(NO_SOLUTION_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::TraversalNode;
    use serde_json::json;

    #[test]
    fn report_shape() {
        let root = TraversalNode {
            node_label: "out".into(),
            gen_edge_label: Some("copy#0".into()),
            value: json!(2),
            cost: 1.0,
            index: 1,
            children: vec![TraversalNode::leaf("a", json!(2))],
        };
        let report = Report::from_solution("out", &SolutionRecord::from_root(root));

        let json = serde_json::to_string_pretty(&report).unwrap();
        insta::assert_snapshot!(json, @r###"
        {
          "msg": "out=2, index=1, cost=1",
          "value": 2,
          "cost": 1.0,
          "tree": "out=2, index=1, cost=1 <copy#0>\n└── a=2, index=0, cost=0\n",
          "target_node": "out",
          "path_nodes": [
            "a",
            "out"
          ],
          "path_edges": [
            "copy"
          ],
          "num_nodes": 2,
          "num_edges": 1
        }
        "###);
    }

    #[test]
    fn no_solution_report() {
        let json = serde_json::to_string(&ErrorReport::no_solution()).unwrap();
        assert_eq!(json, r#"{"error":"No solution found"}"#);
    }
}
