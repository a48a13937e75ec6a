//! Solution records and path summaries.
//!
//! A [`SolutionRecord`] is what a solver returns for a successful search: the
//! final value and cost plus the tree of [`TraversalNode`]s that produced
//! it. Each traversal node names the graph node it resolved and, when it was
//! reached through an edge, a generated edge label `"<edge>#<counter>"`. The
//! counter only disambiguates repeated use of an edge during search.
//!
//! [`summarize`] reduces that tree to the distinct nodes and edges used.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator between an edge label and its search counter.
pub const COUNTER_SEPARATOR: char = '#';

/// One step of the winning traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalNode {
    /// Label of the graph node this step resolved.
    pub node_label: String,
    /// Generated label of the edge used, `None` for inputs and static values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_edge_label: Option<String>,
    pub value: Value,
    pub cost: f64,
    pub index: usize,
    /// Traversal nodes for the edge's sources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TraversalNode>,
}

impl TraversalNode {
    /// A leaf step: a value supplied directly rather than derived.
    pub fn leaf(node_label: impl Into<String>, value: Value) -> Self {
        TraversalNode {
            node_label: node_label.into(),
            gen_edge_label: None,
            value,
            cost: 0.0,
            index: 0,
            children: Vec::new(),
        }
    }

    /// Pre-order walk over this node and everything beneath it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

impl fmt::Display for TraversalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}, index={}, cost={}",
            self.node_label, self.value, self.index, self.cost
        )
    }
}

/// Iterator returned by [`TraversalNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a TraversalNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a TraversalNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A solver's successful result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub value: Value,
    pub cost: f64,
    pub index: usize,
    /// Traversal node for the requested output.
    pub root: TraversalNode,
}

impl SolutionRecord {
    /// Wraps a resolved output traversal node.
    pub fn from_root(root: TraversalNode) -> Self {
        SolutionRecord {
            value: root.value.clone(),
            cost: root.cost,
            index: root.index,
            root,
        }
    }

    /// All traversal nodes reachable from the output, output first.
    pub fn descendants(&self) -> Descendants<'_> {
        self.root.descendants()
    }

    /// Renders the traversal as an indented tree, one node per line.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        render_tree(&self.root, "", None, &mut out);
        out
    }
}

impl fmt::Display for SolutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

fn render_tree(node: &TraversalNode, prefix: &str, is_last: Option<bool>, out: &mut String) {
    let (branch, child_prefix) = match is_last {
        None => ("", prefix.to_string()),
        Some(true) => ("└── ", format!("{prefix}    ")),
        Some(false) => ("├── ", format!("{prefix}│   ")),
    };
    out.push_str(prefix);
    out.push_str(branch);
    out.push_str(&node.to_string());
    if let Some(edge) = &node.gen_edge_label {
        out.push_str(&format!(" <{edge}>"));
    }
    out.push('\n');

    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        render_tree(child, &child_prefix, Some(i + 1 == count), out);
    }
}

/// Distinct nodes and edges used by a solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSummary {
    pub path_nodes: BTreeSet<String>,
    pub path_edges: BTreeSet<String>,
    pub num_nodes: usize,
    pub num_edges: usize,
}

/// Reduces a solution's traversal to its distinct node and edge labels.
///
/// Edge labels have their search counter stripped, so repeated use of the
/// same edge counts once.
pub fn summarize(solution: &SolutionRecord) -> PathSummary {
    let mut path_nodes = BTreeSet::new();
    let mut path_edges = BTreeSet::new();

    for step in solution.descendants() {
        path_nodes.insert(step.node_label.clone());
        if let Some(edge) = step.gen_edge_label.as_deref().and_then(strip_search_counter) {
            path_edges.insert(edge.to_string());
        }
    }

    PathSummary {
        num_nodes: path_nodes.len(),
        num_edges: path_edges.len(),
        path_nodes,
        path_edges,
    }
}

/// Returns the logical edge label of a generated label.
///
/// Splits on the last `#`; a label without one is returned whole. Empty
/// labels yield `None`.
pub fn strip_search_counter(gen_edge_label: &str) -> Option<&str> {
    if gen_edge_label.is_empty() {
        return None;
    }
    match gen_edge_label.rsplit_once(COUNTER_SEPARATOR) {
        Some((label, _counter)) => Some(label),
        None => Some(gen_edge_label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(node: &str, edge: Option<&str>, children: Vec<TraversalNode>) -> TraversalNode {
        TraversalNode {
            node_label: node.into(),
            gen_edge_label: edge.map(String::from),
            value: json!(1),
            cost: 0.0,
            index: 0,
            children,
        }
    }

    #[test]
    fn strips_counter_on_last_separator() {
        assert_eq!(strip_search_counter("e1#3"), Some("e1"));
        assert_eq!(strip_search_counter("a#b#12"), Some("a#b"));
        assert_eq!(strip_search_counter("plain"), Some("plain"));
        assert_eq!(strip_search_counter("#0"), Some(""));
        assert_eq!(strip_search_counter(""), None);
    }

    #[test]
    fn summarize_deduplicates_repeated_edges() {
        let root = step(
            "c",
            Some("e1#3"),
            vec![
                step("b", Some("e1#0"), vec![step("a", None, vec![])]),
                step("a", None, vec![]),
            ],
        );
        let summary = summarize(&SolutionRecord::from_root(root));

        assert_eq!(summary.path_edges, BTreeSet::from(["e1".to_string()]));
        assert_eq!(
            summary.path_nodes,
            BTreeSet::from(["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(summary.num_nodes, summary.path_nodes.len());
        assert_eq!(summary.num_edges, summary.path_edges.len());
    }

    #[test]
    fn summarize_skips_empty_edge_labels() {
        let root = step("b", Some(""), vec![step("a", Some("raw"), vec![])]);
        let summary = summarize(&SolutionRecord::from_root(root));
        assert_eq!(summary.path_edges, BTreeSet::from(["raw".to_string()]));
        assert_eq!(summary.num_edges, 1);
        assert_eq!(summary.num_nodes, 2);
    }

    #[test]
    fn descendants_walk_in_pre_order() {
        let root = step(
            "d",
            Some("e#1"),
            vec![step("b", Some("f#0"), vec![step("a", None, vec![])]), step("c", None, vec![])],
        );
        let labels: Vec<&str> = root.descendants().map(|n| n.node_label.as_str()).collect();
        assert_eq!(labels, ["d", "b", "a", "c"]);
    }

    #[test]
    fn tree_renders_each_step() {
        let root = step("c", Some("e1#1"), vec![step("a", None, vec![]), step("b", None, vec![])]);
        let solution = SolutionRecord::from_root(root);
        assert_eq!(
            solution.tree(),
            "c=1, index=0, cost=0 <e1#1>\n├── a=1, index=0, cost=0\n└── b=1, index=0, cost=0\n"
        );
        assert_eq!(solution.to_string(), "c=1, index=0, cost=0");
    }
}
