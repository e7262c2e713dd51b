//! The capability contract a document backend implements so it can be queried.

use crate::descriptor::FieldDescriptor;
use crate::value::DocumentValue;

/// One set field of a message: its descriptor and its value(s).
///
/// A single field carries exactly one value. A repeated field carries its
/// elements in repetition order.
#[derive(Debug, Clone)]
pub struct FieldEntry<'a, M> {
    pub descriptor: &'a FieldDescriptor,
    pub values: Vec<DocumentValue<'a, M>>,
}

/// A handle to a message inside a read-only document tree.
///
/// The query engine is written exclusively against this trait, so any
/// document format (the in-memory [`MessageTree`](crate::MessageTree), a
/// JSON-derived tree, a reflective protobuf wrapper) can be queried once it
/// implements these operations.
///
/// `'a` is the lifetime of the underlying document.
pub trait MessageNode<'a>: std::fmt::Debug + Clone + Copy + PartialEq + Eq {
    /// The message type's name, used for diagnostics and rendering only.
    fn type_name(&self) -> &'a str;

    /// The fields that are set on this message, in declaration order.
    /// Unset fields (and empty repeated fields) are not listed.
    fn fields(&self) -> Box<dyn Iterator<Item = FieldEntry<'a, Self>> + 'a>;

    /// The message that contains this one, or `None` at the document root or
    /// when the backend cannot resolve it.
    fn parent(&self) -> Option<Self>;
}
