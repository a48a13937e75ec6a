//! Hypergraph document access.
//!
//! A document is plain JSON. The graph itself lives under `hypergraph`, or
//! the document is already the graph body when that key is absent.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::CoreError;

/// Key wrapping the graph body in a full document.
pub const HYPERGRAPH_KEY: &str = "hypergraph";

/// Returns the graph body of `document`.
pub fn graph_body(document: &Value) -> &Value {
    document.get(HYPERGRAPH_KEY).unwrap_or(document)
}

/// Mutable counterpart of [`graph_body`].
pub fn graph_body_mut(document: &mut Value) -> &mut Value {
    if document.get(HYPERGRAPH_KEY).is_some() {
        &mut document[HYPERGRAPH_KEY]
    } else {
        document
    }
}

/// Reads and parses a JSON document from disk.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, CoreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
