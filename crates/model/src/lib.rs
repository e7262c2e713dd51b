//! The document model queried by pbquery: field metadata, values, the
//! [`MessageNode`] capability trait, and an in-memory [`MessageTree`] backend.

pub mod descriptor;
pub mod error;
pub mod node;
pub mod tree;
pub mod value;

pub use descriptor::{Cardinality, FieldDescriptor, ValueKind};
pub use error::DocumentError;
pub use node::{FieldEntry, MessageNode};
pub use tree::{MessageId, MessageTree, TreeMessage};
pub use value::{DocumentValue, Scalar};

// Fixtures - publicly available for the tests of downstream crates
pub mod tests;
