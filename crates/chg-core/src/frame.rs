//! Frame input resolution.
//!
//! A frame is a named snapshot of input values stored under
//! `frames[<key>]`. Recorded values are often wrapped in a one-element
//! sequence; those are unwrapped to the scalar they carry.

use serde_json::Value;
use tracing::debug;

use crate::solver::Inputs;

/// Document key holding the recorded frames.
pub const FRAMES_KEY: &str = "frames";

/// Returns the input bindings recorded for `frame_key`.
///
/// A missing `frames` collection, an empty key, or an unknown key all
/// resolve to no inputs. This is never an error: the solver runs on the
/// graph's intrinsic values alone.
pub fn resolve_inputs(document: &Value, frame_key: &str) -> Inputs {
    if frame_key.is_empty() {
        return Inputs::new();
    }

    let Some(frame) = document
        .get(FRAMES_KEY)
        .and_then(|frames| frames.get(frame_key))
        .and_then(Value::as_object)
    else {
        debug!(frame_key, "frame not found, using no inputs");
        return Inputs::new();
    };

    frame
        .iter()
        .map(|(name, value)| (name.clone(), unwrap_singleton(value)))
        .collect()
}

fn unwrap_singleton(value: &Value) -> Value {
    match value {
        Value::Array(items) if items.len() == 1 => items[0].clone(),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "hypergraph": {"nodes": {}},
            "frames": {
                "f1": {"x": [5], "y": [5, 6], "z": 5, "w": [], "n": [[1, 2]]},
                "list": [1, 2]
            }
        })
    }

    #[test]
    fn unwraps_only_singletons() {
        let inputs = resolve_inputs(&doc(), "f1");
        assert_eq!(inputs["x"], json!(5));
        assert_eq!(inputs["y"], json!([5, 6]));
        assert_eq!(inputs["z"], json!(5));
        assert_eq!(inputs["w"], json!([]));
        assert_eq!(inputs["n"], json!([1, 2]));
        assert_eq!(inputs.len(), 5);
    }

    #[test]
    fn missing_frame_resolves_to_no_inputs() {
        assert!(resolve_inputs(&doc(), "nope").is_empty());
        assert!(resolve_inputs(&doc(), "").is_empty());
        assert!(resolve_inputs(&json!({"edges": []}), "f1").is_empty());
        assert!(resolve_inputs(&json!(null), "f1").is_empty());
    }

    #[test]
    fn non_mapping_frame_resolves_to_no_inputs() {
        assert!(resolve_inputs(&doc(), "list").is_empty());
    }
}
