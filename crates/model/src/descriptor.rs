//! Field metadata: the schema-level description of one field of a message type.

/// Whether a field holds scalar values or nested messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Message,
}

/// Whether a field holds one value or an ordered repetition of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Single,
    Repeated,
}

/// Describes one field of a message type.
///
/// Descriptors belong to the document (or its schema) and are only ever
/// borrowed by the query engine. The engine never writes to them; when it
/// needs metadata for a node that has no owning field (the query root, a
/// resolved parent) it builds a fresh one with [`FieldDescriptor::synthetic_message`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Unique within the owning message type.
    pub name: String,
    pub kind: ValueKind,
    pub cardinality: Cardinality,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: ValueKind, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            kind,
            cardinality,
        }
    }

    /// A nameless, single, message-kind descriptor for nodes that are not the
    /// value of any field.
    pub fn synthetic_message() -> Self {
        Self::new(String::new(), ValueKind::Message, Cardinality::Single)
    }

    pub fn is_message(&self) -> bool {
        self.kind == ValueKind::Message
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }
}
