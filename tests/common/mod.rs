//! Shared helpers for the integration tests.

use pbquery::{DocumentValue, MessageNode, MessageTree, document_from_json, value_to_json};
use serde_json::Value;

/// Builds a document from a `json!` literal.
pub fn doc(json: Value) -> MessageTree {
    document_from_json(&json).expect("fixture document should build")
}

/// Renders every result as JSON for easy comparison.
pub fn rendered<'a, M: MessageNode<'a>>(values: &[DocumentValue<'a, M>]) -> Vec<Value> {
    values.iter().map(value_to_json).collect()
}
