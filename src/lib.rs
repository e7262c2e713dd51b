//! pbquery: XPath-like queries over structured message documents.
//!
//! The document model lives in [`pbquery_model`], the query compiler and
//! evaluator in [`pbquery_engine`], and the JSON adapter in [`pbquery_json`].
//! This crate ties them together and hosts the `pbquery` binary.

pub mod cli;

pub use pbquery_engine::{
    Axis, BinaryOperator, EvaluationContext, Expression, InvalidQuery, LocationPath, NodeContext,
    NodeTest, PathStart, Query, QueryValue, Step, compile, evaluate, parse_expression,
};
pub use pbquery_json::{
    JsonDocumentError, RenderOptions, document_from_json, message_to_json, value_to_json,
    value_to_json_with,
};
pub use pbquery_model::{
    Cardinality, DocumentError, DocumentValue, FieldDescriptor, FieldEntry, MessageId,
    MessageNode, MessageTree, Scalar, TreeMessage, ValueKind,
};

// Re-export document fixtures for integration testing in downstream crates
pub use pbquery_model::tests;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PbQueryError {
    #[error(transparent)]
    Query(#[from] InvalidQuery),

    #[error(transparent)]
    Document(#[from] JsonDocumentError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compiles `text` and evaluates it against the document rooted at `root`.
///
/// To run the same query against many documents, [`compile`] it once and
/// call [`Query::evaluate`] instead.
pub fn query<'a, M>(root: M, text: &str) -> Result<Vec<DocumentValue<'a, M>>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    compile(text)?.evaluate(root)
}

/// Alias for [`query`].
pub fn xpath<'a, M>(root: M, text: &str) -> Result<Vec<DocumentValue<'a, M>>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    query(root, text)
}
