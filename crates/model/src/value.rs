//! Scalar and document values.

use std::borrow::Cow;
use std::fmt;

/// A leaf value held by a scalar field.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{}", s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

/// A value reachable in (or computed over) a document.
///
/// Scalars are borrowed from the document while they live in it; a query can
/// also produce owned scalars (e.g. a top-level `count(...)`). Messages are
/// represented by the backend's own handle type `M`.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue<'a, M> {
    Scalar(Cow<'a, Scalar>),
    Message(M),
}

impl<'a, M> DocumentValue<'a, M> {
    pub fn borrowed(scalar: &'a Scalar) -> Self {
        DocumentValue::Scalar(Cow::Borrowed(scalar))
    }

    pub fn owned(scalar: impl Into<Scalar>) -> Self {
        DocumentValue::Scalar(Cow::Owned(scalar.into()))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            DocumentValue::Scalar(s) => Some(s),
            DocumentValue::Message(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&M> {
        match self {
            DocumentValue::Message(m) => Some(m),
            DocumentValue::Scalar(_) => None,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, DocumentValue::Message(_))
    }
}
