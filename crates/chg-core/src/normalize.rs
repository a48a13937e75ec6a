//! Document normalization for the solver loader.
//!
//! Serialized documents differ from what the loader accepts in two ways:
//! executable relation text may carry the indentation it was authored with,
//! and `source_nodes` may arrive as a sequence instead of a labelled mapping.
//! [`normalize`] rewrites a copy of the document to fix both.

use serde_json::{Map, Value};
use tracing::debug;

use crate::document::graph_body_mut;

/// Edge fields holding solver-evaluated text.
pub const EXECUTABLE_FIELDS: [&str; 3] = ["rel", "via", "index_via"];

/// Edge field naming the source nodes of a relation.
pub const SOURCE_NODES: &str = "source_nodes";

/// Returns a normalized copy of `document`.
///
/// The graph body (see [`crate::graph_body`]) is rewritten in place within the
/// copy, so a `hypergraph` wrapper and any sibling keys such as `frames` are
/// preserved. The input is never modified. Normalizing twice yields the same
/// document as normalizing once.
pub fn normalize(document: &Value) -> Value {
    let mut normalized = document.clone();
    match graph_body_mut(&mut normalized).get_mut("edges") {
        Some(Value::Array(edges)) => edges.iter_mut().for_each(normalize_edge),
        Some(Value::Object(edges)) => edges.values_mut().for_each(normalize_edge),
        Some(other) => debug!(kind = json_kind(other), "edges collection is not a sequence or mapping"),
        None => debug!("document has no edges collection"),
    }
    normalized
}

fn normalize_edge(edge: &mut Value) {
    let Some(record) = edge.as_object_mut() else {
        return;
    };

    for field in EXECUTABLE_FIELDS {
        if let Some(Value::String(text)) = record.get_mut(field) {
            *text = dedent(text);
        }
    }

    if let Some(slot) = record.get_mut(SOURCE_NODES) {
        if let Value::Array(sources) = slot {
            let mapping: Map<String, Value> = std::mem::take(sources)
                .into_iter()
                .enumerate()
                .map(|(i, source)| (format!("s{}", i + 1), source))
                .collect();
            *slot = Value::Object(mapping);
        }
    }
}

/// Removes the leading whitespace common to every non-blank line of `text`.
///
/// Lines made only of spaces and tabs are emptied and do not take part in
/// the margin. Relative indentation between the remaining lines is kept.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| if is_blank(line) { "" } else { line })
        .collect();

    let margin = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| leading_whitespace(line))
        .reduce(common_prefix)
        .unwrap_or("");

    lines
        .iter()
        .map(|line| line.strip_prefix(margin).unwrap_or(*line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(line: &str) -> bool {
    line.trim_start_matches([' ', '\t']).is_empty()
}

fn leading_whitespace(line: &str) -> &str {
    let content = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - content.len()]
}

// Margins are ASCII spaces and tabs, so byte comparison stays on char boundaries.
fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn dedent_removes_common_margin() {
        let text = "    def f(x):\n        return x\n";
        assert_eq!(dedent(text), "def f(x):\n    return x\n");
    }

    #[test]
    fn dedent_ignores_blank_lines_for_margin() {
        let text = "  a\n\n \t\n  b";
        assert_eq!(dedent(text), "a\n\n\nb");
    }

    #[test]
    fn dedent_keeps_mixed_tabs_and_spaces_apart() {
        // No shared prefix between a tab and a space.
        assert_eq!(dedent("\tx\n y"), "\tx\n y");
        assert_eq!(dedent("\t  x\n\t y"), " x\ny");
    }

    #[test]
    fn dedent_without_indentation_is_identity() {
        assert_eq!(dedent("a + b"), "a + b");
        assert_eq!(dedent(""), "");
    }

    #[test]
    fn normalizes_wrapped_document() {
        let doc = json!({
            "hypergraph": {
                "edges": [
                    {"source_nodes": ["a", "b"], "target": "c", "rel": "   sum", "via": 3}
                ]
            },
            "frames": {"f1": {"a": [1]}}
        });

        let normalized = normalize(&doc);

        assert_eq!(
            normalized,
            json!({
                "hypergraph": {
                    "edges": [
                        {"source_nodes": {"s1": "a", "s2": "b"}, "target": "c", "rel": "sum", "via": 3}
                    ]
                },
                "frames": {"f1": {"a": [1]}}
            })
        );
    }

    #[test]
    fn normalizes_flattened_document_with_edge_mapping() {
        let doc = json!({
            "edges": {
                "e1": {"source_nodes": {"x": "a"}, "target": "b", "index_via": "  nonzero\n  "}
            }
        });

        let normalized = normalize(&doc);

        assert_eq!(normalized["edges"]["e1"]["source_nodes"], json!({"x": "a"}));
        assert_eq!(normalized["edges"]["e1"]["index_via"], json!("nonzero\n"));
    }

    #[test]
    fn source_node_keys_follow_original_order() {
        let doc = json!({"edges": [{"source_nodes": ["z", "y", "x"]}]});
        let normalized = normalize(&doc);
        let keys: Vec<&String> = normalized["edges"][0]["source_nodes"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["s1", "s2", "s3"]);
        assert_eq!(normalized["edges"][0]["source_nodes"]["s3"], json!("x"));
    }

    #[test]
    fn input_document_is_not_mutated() {
        let doc = json!({"edges": [{"source_nodes": ["a"], "rel": "  identity"}]});
        let before = doc.clone();
        let _ = normalize(&doc);
        assert_eq!(doc, before);
        assert!(doc["edges"][0]["source_nodes"].is_array());
    }

    #[test]
    fn missing_edges_is_a_no_op() {
        let doc = json!({"hypergraph": {"nodes": {"a": {}}}});
        assert_eq!(normalize(&doc), doc);
        assert_eq!(normalize(&json!(42)), json!(42));
    }

    fn edge_strategy() -> impl Strategy<Value = Value> {
        (
            prop::collection::vec("[a-z]{1,4}", 0..6),
            0usize..6,
            prop::collection::vec((0usize..4, "[a-z_()+]{1,8}"), 1..5),
        )
            .prop_map(|(sources, base, lines)| {
                let rel = lines
                    .iter()
                    .map(|(extra, content)| format!("{}{}", " ".repeat(base + extra), content))
                    .collect::<Vec<_>>()
                    .join("\n");
                json!({"source_nodes": sources, "rel": rel})
            })
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(edges in prop::collection::vec(edge_strategy(), 0..5)) {
            let doc = json!({"hypergraph": {"edges": edges}});
            let once = normalize(&doc);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn sequence_sources_become_numbered_mapping(sources in prop::collection::vec("[a-z]{1,4}", 0..8)) {
            let doc = json!({"edges": [{"source_nodes": sources.clone()}]});
            let normalized = normalize(&doc);
            let mapping = normalized["edges"][0]["source_nodes"].as_object().unwrap();
            prop_assert_eq!(mapping.len(), sources.len());
            for (i, ((key, value), source)) in mapping.iter().zip(&sources).enumerate() {
                prop_assert_eq!(key, &format!("s{}", i + 1));
                prop_assert_eq!(value, &json!(source));
            }
        }

        #[test]
        fn dedent_preserves_relative_indentation(
            base in 0usize..8,
            lines in prop::collection::vec((0usize..4, "[a-z]{1,6}"), 1..6),
        ) {
            let min_extra = lines.iter().map(|(extra, _)| *extra).min().unwrap();
            let text = lines
                .iter()
                .map(|(extra, content)| format!("{}{}", " ".repeat(base + extra), content))
                .collect::<Vec<_>>()
                .join("\n");
            let expected = lines
                .iter()
                .map(|(extra, content)| format!("{}{}", " ".repeat(extra - min_extra), content))
                .collect::<Vec<_>>()
                .join("\n");
            prop_assert_eq!(dedent(&text), expected);
        }
    }
}
