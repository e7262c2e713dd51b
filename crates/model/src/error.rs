use crate::descriptor::{Cardinality, ValueKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Message #{0} does not exist in this document")]
    UnknownMessage(usize),

    #[error("Field '{field}' holds {expected:?} values, cannot store a {found:?} value")]
    KindMismatch {
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Field '{field}' is {expected:?}, cannot be written as {found:?}")]
    CardinalityMismatch {
        field: String,
        expected: Cardinality,
        found: Cardinality,
    },
}
