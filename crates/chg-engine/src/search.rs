//! Cost-ordered search over a loaded [`Hypergraph`].
//!
//! The solver runs a generalized Dijkstra (Knuth's algorithm for
//! superior functions) forward from everything that is known: input
//! bindings, static values and edges without sources, all with cost 0 and
//! index 0. Candidates are popped cheapest first and the first candidate
//! popped for a node resolves it. Once every source of an edge is resolved
//! the edge is applied: `via` and `index_via` are checked, the relation is
//! evaluated, and the target gets a candidate with cost
//! `sum(source costs) + weight` and index `1 + max(source index)`. Weights
//! are non-negative, so each node is resolved at its cheapest cost and each
//! edge is applied at most once.
//!
//! Every edge application draws the next value of a search counter, so the
//! traversal node it produces is labelled `"<edge>#<counter>"`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::NodeIndex;
use serde_json::Value;
use tracing::{debug, info};

use chg_core::{Inputs, SolutionRecord, SolveOptions, Solver, TraversalNode};

use crate::error::EngineError;
use crate::graph::Hypergraph;

/// Logging level at or below which every search step is reported.
const VERBOSE_LEVEL: u8 = 10;

/// Configuration for the search solver.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of edge applications per solve. Default: 1_000_000.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_steps: 1_000_000,
        }
    }
}

/// The bundled [`Solver`] implementation.
#[derive(Debug, Clone, Default)]
pub struct SearchSolver {
    config: EngineConfig,
}

impl SearchSolver {
    pub fn new(config: EngineConfig) -> Self {
        SearchSolver { config }
    }
}

impl Solver for SearchSolver {
    type Graph = Hypergraph;
    type Error = EngineError;

    fn load(&self, document: &Value) -> Result<Hypergraph, EngineError> {
        Hypergraph::from_document(document)
    }

    fn solve(
        &self,
        graph: &Hypergraph,
        output_node: &str,
        inputs: &Inputs,
        options: &SolveOptions,
    ) -> Result<Option<SolutionRecord>, EngineError> {
        let output = graph
            .node_index(output_node)
            .ok_or_else(|| EngineError::UnknownNode {
                label: output_node.to_string(),
            })?;

        let mut search = Search::new(graph, options, self.config.max_steps);
        search.seed(inputs)?;
        let solution = search.run(output)?.map(SolutionRecord::from_root);

        match &solution {
            Some(found) => {
                debug!(output_node, cost = found.cost, steps = search.counter, "solution found");
                if options.to_print {
                    eprint!("{}", found.tree());
                }
            }
            None => {
                debug!(output_node, steps = search.counter, "no solution");
                search.report_unresolved();
            }
        }
        Ok(solution)
    }
}

/// A pending resolution of `node`, ordered cheapest first.
struct Candidate {
    cost: f64,
    /// Push order, so equal costs pop first-in first-out.
    seq: usize,
    node: NodeIndex,
    step: TraversalNode,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// State of one solve call.
struct Search<'a> {
    graph: &'a Hypergraph,
    options: &'a SolveOptions,
    max_steps: usize,
    /// Next search counter for generated edge labels.
    counter: usize,
    /// Cheapest derivation of every resolved node.
    resolved: HashMap<NodeIndex, TraversalNode>,
    queue: BinaryHeap<Candidate>,
    pushed: usize,
    verbose: bool,
}

impl<'a> Search<'a> {
    fn new(graph: &'a Hypergraph, options: &'a SolveOptions, max_steps: usize) -> Self {
        Search {
            graph,
            options,
            max_steps,
            counter: 0,
            resolved: HashMap::new(),
            queue: BinaryHeap::new(),
            pushed: 0,
            verbose: options.logging_level.is_some_and(|level| level <= VERBOSE_LEVEL),
        }
    }

    /// Queues inputs, static values and sourceless edges.
    ///
    /// Inputs are queued before static values, so an input overrides the
    /// static value of the same node.
    fn seed(&mut self, inputs: &Inputs) -> Result<(), EngineError> {
        let graph = self.graph;
        for (label, value) in inputs {
            match graph.node_index(label) {
                Some(idx) => self.push(idx, TraversalNode::leaf(label.as_str(), value.clone())),
                None => debug!(input = %label, "input names no node, ignoring"),
            }
        }
        for idx in graph.node_indices() {
            let data = graph.node(idx)?;
            if let Some(value) = &data.static_value {
                self.push(idx, TraversalNode::leaf(data.label.as_str(), value.clone()));
            }
        }
        for edge in graph.sourceless_edges() {
            self.apply_edge(edge)?;
        }
        Ok(())
    }

    /// Pops candidates until the output resolves at `min_index` or above.
    fn run(&mut self, output: NodeIndex) -> Result<Option<TraversalNode>, EngineError> {
        let min_index = self.options.min_index;
        while let Some(Candidate { node, step, .. }) = self.queue.pop() {
            if node == output && step.index >= min_index {
                self.report_resolved(&step);
                return Ok(Some(step));
            }
            if self.resolved.contains_key(&node) {
                continue;
            }
            self.report_resolved(&step);
            self.resolved.insert(node, step);
            for edge in self.graph.outgoing_edges(node) {
                self.apply_edge(edge)?;
            }
        }
        Ok(None)
    }

    fn push(&mut self, node: NodeIndex, step: TraversalNode) {
        if self.is_watched_node(&step.node_label) || self.verbose {
            info!(node = %step.node_label, cost = step.cost, index = step.index, "candidate queued");
        }
        self.queue.push(Candidate {
            cost: step.cost,
            seq: self.pushed,
            node,
            step,
        });
        self.pushed += 1;
    }

    /// Applies `edge` if all of its sources are resolved.
    fn apply_edge(&mut self, edge: NodeIndex) -> Result<(), EngineError> {
        let graph = self.graph;
        let data = graph.edge(edge)?;
        let target = graph
            .node_index(&data.target)
            .ok_or_else(|| EngineError::UnknownNode { label: data.target.clone() })?;

        // A resolved target only needs more candidates when it is the
        // output still waiting for a deeper index.
        if self.resolved.contains_key(&target) && self.options.min_index == 0 {
            return Ok(());
        }

        let mut children = Vec::with_capacity(data.sources.len());
        for (_, source) in &data.sources {
            let idx = graph
                .node_index(source)
                .ok_or_else(|| EngineError::UnknownNode { label: source.clone() })?;
            match self.resolved.get(&idx) {
                Some(step) => children.push(step.clone()),
                None => return Ok(()),
            }
        }

        let watched = self.options.debug_edges.iter().any(|e| *e == data.label);
        if watched || self.verbose {
            info!(edge = %data.label, target = %data.target, "trying edge");
        }

        let values: Vec<Value> = children.iter().map(|c| c.value.clone()).collect();
        let indices: Vec<usize> = children.iter().map(|c| c.index).collect();
        if !data.via.holds_for_values(&values) || !data.index_via.holds_for_indices(&indices) {
            if watched || self.verbose {
                info!(edge = %data.label, "edge condition not met");
            }
            return Ok(());
        }

        let value = match data.rel.evaluate(&values) {
            Ok(value) => value,
            Err(err) => {
                debug!(edge = %data.label, error = %err, "relation failed");
                return Ok(());
            }
        };

        if self.counter >= self.max_steps {
            return Err(EngineError::StepLimitExceeded {
                limit: self.max_steps,
            });
        }
        let counter = self.counter;
        self.counter += 1;

        let step = TraversalNode {
            node_label: data.target.clone(),
            gen_edge_label: Some(format!("{}#{}", data.label, counter)),
            value,
            cost: children.iter().map(|c| c.cost).sum::<f64>() + data.weight,
            index: 1 + indices.iter().copied().max().unwrap_or(0),
            children,
        };
        self.push(target, step);
        Ok(())
    }

    fn is_watched_node(&self, label: &str) -> bool {
        self.options.debug_nodes.iter().any(|n| n == label)
    }

    fn report_resolved(&self, step: &TraversalNode) {
        if self.is_watched_node(&step.node_label) || self.verbose {
            info!(node = %step.node_label, value = %step.value, cost = step.cost, "node resolved");
        }
    }

    fn report_unresolved(&self) {
        for label in &self.options.debug_nodes {
            let resolved = self
                .graph
                .node_index(label)
                .is_some_and(|idx| self.resolved.contains_key(&idx));
            if !resolved {
                info!(node = %label, "node unresolved");
            }
        }
    }
}
