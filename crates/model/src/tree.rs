//! An arena-backed, in-memory message document.
//!
//! Messages live in a flat vector and refer to each other by index, so a
//! [`TreeMessage`] handle is just an index plus a reference to the tree. This
//! keeps handles `Copy` and gives every message a cheap parent link.

use crate::descriptor::{Cardinality, FieldDescriptor, ValueKind};
use crate::error::DocumentError;
use crate::node::{FieldEntry, MessageNode};
use crate::value::{DocumentValue, Scalar};
use std::fmt;

/// Index of a message inside a [`MessageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(usize);

impl MessageId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Scalar(Scalar),
    Message(MessageId),
}

#[derive(Debug, Clone)]
struct FieldData {
    descriptor: FieldDescriptor,
    slots: Vec<Slot>,
}

#[derive(Debug, Clone)]
struct MessageData {
    type_name: String,
    parent: Option<MessageId>,
    fields: Vec<FieldData>,
}

/// A mutable-while-building, read-only-while-querying message document.
///
/// Field declaration order is the order in which a field was first written.
#[derive(Debug, Clone)]
pub struct MessageTree {
    messages: Vec<MessageData>,
}

impl MessageTree {
    /// Creates a document whose root message has type `root_type`.
    pub fn new(root_type: impl Into<String>) -> Self {
        Self {
            messages: vec![MessageData {
                type_name: root_type.into(),
                parent: None,
                fields: Vec::new(),
            }],
        }
    }

    pub fn root_id(&self) -> MessageId {
        MessageId(0)
    }

    pub fn root(&self) -> TreeMessage<'_> {
        TreeMessage {
            id: self.root_id(),
            tree: self,
        }
    }

    pub fn message(&self, id: MessageId) -> Result<TreeMessage<'_>, DocumentError> {
        self.data(id)?;
        Ok(TreeMessage { id, tree: self })
    }

    /// Number of messages in the arena, the root included.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Every field descriptor stored in the document, in arena order.
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.messages
            .iter()
            .flat_map(|m| m.fields.iter().map(|f| &f.descriptor))
    }

    /// Sets a single scalar field, replacing any previous value.
    pub fn set_scalar(
        &mut self,
        owner: MessageId,
        name: &str,
        value: impl Into<Scalar>,
    ) -> Result<(), DocumentError> {
        self.insert(
            owner,
            name,
            ValueKind::Scalar,
            Cardinality::Single,
            Slot::Scalar(value.into()),
        )
    }

    /// Appends an element to a repeated scalar field.
    pub fn push_scalar(
        &mut self,
        owner: MessageId,
        name: &str,
        value: impl Into<Scalar>,
    ) -> Result<(), DocumentError> {
        self.insert(
            owner,
            name,
            ValueKind::Scalar,
            Cardinality::Repeated,
            Slot::Scalar(value.into()),
        )
    }

    /// Sets a single message field to a new, empty message of type `type_name`
    /// and returns its id. A previously set message becomes unreachable.
    pub fn set_message(
        &mut self,
        owner: MessageId,
        name: &str,
        type_name: impl Into<String>,
    ) -> Result<MessageId, DocumentError> {
        self.add_message(owner, name, Cardinality::Single, type_name.into())
    }

    /// Appends a new, empty message of type `type_name` to a repeated message
    /// field and returns its id.
    pub fn push_message(
        &mut self,
        owner: MessageId,
        name: &str,
        type_name: impl Into<String>,
    ) -> Result<MessageId, DocumentError> {
        self.add_message(owner, name, Cardinality::Repeated, type_name.into())
    }

    fn add_message(
        &mut self,
        owner: MessageId,
        name: &str,
        cardinality: Cardinality,
        type_name: String,
    ) -> Result<MessageId, DocumentError> {
        // Validate before allocating so a rejected write leaves no orphan behind.
        self.check_field(owner, name, ValueKind::Message, cardinality)?;
        let id = MessageId(self.messages.len());
        self.messages.push(MessageData {
            type_name,
            parent: Some(owner),
            fields: Vec::new(),
        });
        self.insert(
            owner,
            name,
            ValueKind::Message,
            cardinality,
            Slot::Message(id),
        )?;
        Ok(id)
    }

    fn data(&self, id: MessageId) -> Result<&MessageData, DocumentError> {
        self.messages
            .get(id.0)
            .ok_or(DocumentError::UnknownMessage(id.0))
    }

    fn check_field(
        &self,
        owner: MessageId,
        name: &str,
        kind: ValueKind,
        cardinality: Cardinality,
    ) -> Result<(), DocumentError> {
        let message = self.data(owner)?;
        match message.fields.iter().find(|f| f.descriptor.name == name) {
            Some(field) => check_compatible(&field.descriptor, kind, cardinality),
            None => Ok(()),
        }
    }

    fn insert(
        &mut self,
        owner: MessageId,
        name: &str,
        kind: ValueKind,
        cardinality: Cardinality,
        slot: Slot,
    ) -> Result<(), DocumentError> {
        let message = self
            .messages
            .get_mut(owner.0)
            .ok_or(DocumentError::UnknownMessage(owner.0))?;

        match message.fields.iter_mut().find(|f| f.descriptor.name == name) {
            Some(field) => {
                check_compatible(&field.descriptor, kind, cardinality)?;
                match cardinality {
                    Cardinality::Single => field.slots = vec![slot],
                    Cardinality::Repeated => field.slots.push(slot),
                }
            }
            None => message.fields.push(FieldData {
                descriptor: FieldDescriptor::new(name, kind, cardinality),
                slots: vec![slot],
            }),
        }
        Ok(())
    }
}

fn check_compatible(
    existing: &FieldDescriptor,
    kind: ValueKind,
    cardinality: Cardinality,
) -> Result<(), DocumentError> {
    if existing.kind != kind {
        return Err(DocumentError::KindMismatch {
            field: existing.name.clone(),
            expected: existing.kind,
            found: kind,
        });
    }
    if existing.cardinality != cardinality {
        return Err(DocumentError::CardinalityMismatch {
            field: existing.name.clone(),
            expected: existing.cardinality,
            found: cardinality,
        });
    }
    Ok(())
}

/// A handle to one message of a [`MessageTree`].
#[derive(Clone, Copy)]
pub struct TreeMessage<'a> {
    id: MessageId,
    tree: &'a MessageTree,
}

impl<'a> TreeMessage<'a> {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn tree(&self) -> &'a MessageTree {
        self.tree
    }

    fn data(&self) -> &'a MessageData {
        // Handles are only created for ids the tree has handed out.
        &self.tree.messages[self.id.0]
    }
}

impl PartialEq for TreeMessage<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.tree, other.tree)
    }
}

impl Eq for TreeMessage<'_> {}

impl fmt::Debug for TreeMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.data().type_name, self.id.0)
    }
}

impl<'a> MessageNode<'a> for TreeMessage<'a> {
    fn type_name(&self) -> &'a str {
        &self.data().type_name
    }

    fn fields(&self) -> Box<dyn Iterator<Item = FieldEntry<'a, Self>> + 'a> {
        let tree = self.tree;
        Box::new(self.data().fields.iter().map(move |field| FieldEntry {
            descriptor: &field.descriptor,
            values: field
                .slots
                .iter()
                .map(|slot| match slot {
                    Slot::Scalar(s) => DocumentValue::borrowed(s),
                    Slot::Message(id) => DocumentValue::Message(TreeMessage { id: *id, tree }),
                })
                .collect(),
        }))
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| TreeMessage {
            id,
            tree: self.tree,
        })
    }
}
