//! Expression results and the node-set coercion rules between them.

use crate::context::NodeContext;
use crate::error::InvalidQuery;
use pbquery_model::{DocumentValue, MessageNode, Scalar};

/// Represents the possible result types of an expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue<'a, M> {
    NodeSet(Vec<NodeContext<'a, M>>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, M: MessageNode<'a>> QueryValue<'a, M> {
    pub fn from_scalar(scalar: &Scalar) -> Self {
        match scalar {
            Scalar::String(s) => QueryValue::String(s.clone()),
            Scalar::Number(n) => QueryValue::Number(*n),
            Scalar::Boolean(b) => QueryValue::Boolean(*b),
        }
    }

    /// The scalar value of a single node. Message nodes have none.
    pub fn from_node(node: &NodeContext<'a, M>) -> Result<Self, InvalidQuery> {
        match &node.value {
            DocumentValue::Scalar(scalar) => Ok(Self::from_scalar(scalar)),
            DocumentValue::Message(message) => Err(InvalidQuery::MessageCoercion {
                field: node.name().to_string(),
                type_name: message.type_name().to_string(),
            }),
        }
    }

    /// Truthiness: non-empty set, non-empty string, non-zero non-NaN number.
    pub fn to_bool(&self) -> bool {
        match self {
            QueryValue::NodeSet(nodes) => !nodes.is_empty(),
            QueryValue::String(s) => !s.is_empty(),
            QueryValue::Number(n) => *n != 0.0 && !n.is_nan(),
            QueryValue::Boolean(b) => *b,
        }
    }

    /// Node-set coercion. A set of exactly one node collapses to that node's
    /// scalar value; other sets pass through unchanged.
    pub fn coerce(self) -> Result<Self, InvalidQuery> {
        match self {
            QueryValue::NodeSet(nodes) if nodes.len() == 1 => Self::from_node(&nodes[0]),
            other => Ok(other),
        }
    }

    /// Numeric form of a coerced value. Sets are rejected.
    pub fn number(&self) -> Result<f64, InvalidQuery> {
        match self {
            QueryValue::NodeSet(nodes) => Err(InvalidQuery::NotASingleValue(nodes.len())),
            QueryValue::String(s) => Ok(s.trim().parse().unwrap_or(f64::NAN)),
            QueryValue::Number(n) => Ok(*n),
            QueryValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        }
    }

    /// String form of a coerced value. Sets are rejected.
    pub fn string(&self) -> Result<String, InvalidQuery> {
        match self {
            QueryValue::NodeSet(nodes) => Err(InvalidQuery::NotASingleValue(nodes.len())),
            QueryValue::String(s) => Ok(s.clone()),
            QueryValue::Number(n) => Ok(format_number(*n)),
            QueryValue::Boolean(b) => Ok(b.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueryValue::NodeSet(_) => "node-set",
            QueryValue::String(_) => "string",
            QueryValue::Number(_) => "number",
            QueryValue::Boolean(_) => "boolean",
        }
    }

    /// The document values this result contributes to a query's output.
    pub fn into_document_values(self) -> Vec<DocumentValue<'a, M>> {
        match self {
            QueryValue::NodeSet(nodes) => nodes.into_iter().map(|n| n.value).collect(),
            QueryValue::String(s) => vec![DocumentValue::owned(s)],
            QueryValue::Number(n) => vec![DocumentValue::owned(n)],
            QueryValue::Boolean(b) => vec![DocumentValue::owned(b)],
        }
    }
}

/// Formats a number the way query strings show it: integral values carry no
/// fraction, and the non-finite values have names.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
