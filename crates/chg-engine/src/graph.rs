//! Hypergraph loaded from a normalized document.
//!
//! Stored as a bipartite directed petgraph: each graph node and each
//! hyperedge gets a vertex. A hyperedge vertex has an arc from every source
//! node vertex and one arc to its target node vertex, so the edges able to
//! produce a node are exactly the incoming neighbours of its vertex.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use chg_core::graph_body;

use crate::error::EngineError;
use crate::relation::{Predicate, Relation};

/// Default cost of traversing an edge.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A graph node: a named quantity the solver can resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Unique node label.
    pub label: String,
    /// Value fixed in the document, usable without any inputs.
    pub static_value: Option<Value>,
}

/// A hyperedge: computes its target from all of its sources.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    /// Logical edge label, without any search counter.
    pub label: String,
    /// `(source key, node label)` pairs in document order.
    pub sources: Vec<(String, String)>,
    /// Label of the node this edge produces.
    pub target: String,
    /// Relation computing the target value from the source values.
    pub rel: Relation,
    /// Condition on source values.
    pub via: Predicate,
    /// Condition on source search indices.
    pub index_via: Predicate,
    /// Non-negative cost added when the edge is traversed.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Vertex {
    Node(NodeData),
    Edge(EdgeData),
}

/// A loaded hypergraph, ready to search.
#[derive(Debug, Clone, Default)]
pub struct Hypergraph {
    graph: DiGraph<Vertex, ()>,
    nodes: HashMap<String, NodeIndex>,
    edge_count: usize,
}

impl Hypergraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a hypergraph from a document in normalized shape.
    ///
    /// `nodes` and `edges` may each be a sequence of records or a mapping
    /// from label to record. Nodes referenced only by edges are created on
    /// first use.
    pub fn from_document(document: &Value) -> Result<Self, EngineError> {
        let body = graph_body(document);
        if !body.is_object() {
            return Err(EngineError::InvalidDocument {
                reason: "graph body is not an object".into(),
            });
        }

        let mut hg = Hypergraph::new();

        for (label, record) in labelled_records(body, "nodes", |i| format!("n{i}"))? {
            let static_value = match record {
                Value::Object(fields) => fields.get("static_value").filter(|v| !v.is_null()).cloned(),
                Value::Null => None,
                _ => {
                    return Err(EngineError::MalformedNode {
                        label,
                        reason: "node record is not an object".into(),
                    })
                }
            };
            hg.add_node(NodeData { label, static_value })?;
        }

        for (label, record) in labelled_records(body, "edges", |i| format!("e{i}"))? {
            let edge = parse_edge(label, record)?;
            hg.add_edge(edge);
        }

        debug!(nodes = hg.node_count(), edges = hg.edge_count(), "hypergraph loaded");
        Ok(hg)
    }

    /// Adds a node, or fills in the static value of one created implicitly.
    pub fn add_node(&mut self, data: NodeData) -> Result<NodeIndex, EngineError> {
        if let Some(&idx) = self.nodes.get(&data.label) {
            return match &mut self.graph[idx] {
                Vertex::Node(existing) if existing.static_value.is_none() => {
                    existing.static_value = data.static_value;
                    Ok(idx)
                }
                Vertex::Node(_) => Err(EngineError::MalformedNode {
                    label: data.label,
                    reason: "declared more than once".into(),
                }),
                Vertex::Edge(_) => Err(internal("node label maps to an edge vertex")),
            };
        }
        let label = data.label.clone();
        let idx = self.graph.add_node(Vertex::Node(data));
        self.nodes.insert(label, idx);
        Ok(idx)
    }

    pub fn add_edge(&mut self, data: EdgeData) -> NodeIndex {
        let sources: Vec<NodeIndex> = data
            .sources
            .iter()
            .map(|(_, node)| self.ensure_node(node))
            .collect();
        let target = self.ensure_node(&data.target);

        let idx = self.graph.add_node(Vertex::Edge(data));
        for source in sources {
            self.graph.add_edge(source, idx, ());
        }
        self.graph.add_edge(idx, target, ());
        self.edge_count += 1;
        idx
    }

    fn ensure_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(Vertex::Node(NodeData {
            label: label.to_string(),
            static_value: None,
        }));
        self.nodes.insert(label.to_string(), idx);
        idx
    }

    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.nodes.get(label).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> Result<&NodeData, EngineError> {
        match self.graph.node_weight(idx) {
            Some(Vertex::Node(data)) => Ok(data),
            _ => Err(internal("expected a node vertex")),
        }
    }

    pub fn edge(&self, idx: NodeIndex) -> Result<&EdgeData, EngineError> {
        match self.graph.node_weight(idx) {
            Some(Vertex::Edge(data)) => Ok(data),
            _ => Err(internal("expected an edge vertex")),
        }
    }

    /// All node vertices, in the order they were added.
    pub fn node_indices(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.nodes.values().copied().collect();
        nodes.sort();
        nodes
    }

    /// Edges that `node` is a source of, each listed once, in the order they
    /// were added.
    pub fn outgoing_edges(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        edges.sort();
        edges.dedup();
        edges
    }

    /// Edges with no sources at all.
    pub fn sourceless_edges(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| matches!(&self.graph[idx], Vertex::Edge(data) if data.sources.is_empty()))
            .collect()
    }

    /// Edges targeting `node`, in the order they were added.
    pub fn incoming_edges(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        edges.sort();
        edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

fn internal(message: &str) -> EngineError {
    EngineError::Internal {
        message: message.to_string(),
    }
}

/// Pairs each record of `body[key]` with its label.
///
/// Mapping keys are labels. Sequence records use their `label` field, falling
/// back to `fallback(position)`.
fn labelled_records<'a>(
    body: &'a Value,
    key: &str,
    fallback: impl Fn(usize) -> String,
) -> Result<Vec<(String, &'a Value)>, EngineError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(records)) => Ok(records.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Some(Value::Array(records)) => Ok(records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let label = record
                    .get("label")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| fallback(i));
                (label, record)
            })
            .collect()),
        Some(_) => Err(EngineError::InvalidDocument {
            reason: format!("'{key}' must be a sequence or mapping"),
        }),
    }
}

fn parse_edge(label: String, record: &Value) -> Result<EdgeData, EngineError> {
    let malformed = |reason: &str| EngineError::MalformedEdge {
        label: label.clone(),
        reason: reason.to_string(),
    };

    let Some(fields) = record.as_object() else {
        return Err(malformed("edge record is not an object"));
    };

    let sources = match fields.get("source_nodes") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(mapping)) => mapping
            .iter()
            .map(|(key, node)| {
                node_reference(node)
                    .map(|node| (key.clone(), node))
                    .ok_or_else(|| malformed(&format!("source '{key}' is not a node reference")))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(malformed("source_nodes must be a mapping")),
    };

    let target = fields
        .get("target")
        .and_then(node_reference)
        .ok_or_else(|| malformed("missing target node"))?;

    let rel = match executable_text(fields, "rel", &label)? {
        None => Relation::Identity,
        Some(name) => Relation::parse(name).ok_or_else(|| EngineError::UnknownRelation {
            edge: label.clone(),
            name: name.trim().to_string(),
        })?,
    };
    let via = predicate(fields, "via", &label)?;
    let index_via = predicate(fields, "index_via", &label)?;

    let weight = match fields.get("weight") {
        None | Some(Value::Null) => DEFAULT_WEIGHT,
        Some(w) => w.as_f64().ok_or_else(|| malformed("weight is not a number"))?,
    };
    if weight < 0.0 {
        return Err(malformed("weight must be non-negative"));
    }

    if fields.contains_key("disposable") {
        warn!(edge = %label, "ignoring unsupported 'disposable' field");
    }

    Ok(EdgeData {
        label,
        sources,
        target,
        rel,
        via,
        index_via,
        weight,
    })
}

/// A node reference is either a label or a record carrying one.
fn node_reference(value: &Value) -> Option<String> {
    match value {
        Value::String(label) => Some(label.clone()),
        Value::Object(record) => record.get("label").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn executable_text<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
    edge: &str,
) -> Result<Option<&'a str>, EngineError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(EngineError::MalformedEdge {
            label: edge.to_string(),
            reason: format!("{field} must be text"),
        }),
    }
}

fn predicate(
    fields: &Map<String, Value>,
    field: &'static str,
    edge: &str,
) -> Result<Predicate, EngineError> {
    match executable_text(fields, field, edge)? {
        None => Ok(Predicate::Always),
        Some(name) => Predicate::parse(name).ok_or_else(|| EngineError::UnknownPredicate {
            edge: edge.to_string(),
            field,
            name: name.trim().to_string(),
        }),
    }
}
