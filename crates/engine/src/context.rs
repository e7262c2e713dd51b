//! The unit of evaluation state, and the node tests applied to it.

use crate::ast::NodeTest;
use pbquery_model::{DocumentValue, FieldDescriptor, MessageNode};
use std::borrow::Cow;

/// One node of a node set: a field's metadata, one of its values, and the
/// node's rank within the set currently being predicate-filtered.
///
/// `descriptor` borrows the document's own metadata. Nodes that are not the
/// value of any field (the query root, a resolved parent) own a synthetic
/// descriptor instead, so shared metadata is never written to.
///
/// `position` and `size` are 1-based and only meaningful while a predicate
/// runs; elsewhere they are 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeContext<'a, M> {
    pub descriptor: Cow<'a, FieldDescriptor>,
    pub value: DocumentValue<'a, M>,
    pub position: usize,
    pub size: usize,
}

impl<'a, M: MessageNode<'a>> NodeContext<'a, M> {
    /// A node for one value of a document field. Elements of a repeated field
    /// each get their own node sharing the field's descriptor.
    pub fn new(descriptor: &'a FieldDescriptor, value: DocumentValue<'a, M>) -> Self {
        Self {
            descriptor: Cow::Borrowed(descriptor),
            value,
            position: 1,
            size: 1,
        }
    }

    /// A message node with freshly built, nameless message metadata.
    pub fn synthetic(message: M) -> Self {
        Self {
            descriptor: Cow::Owned(FieldDescriptor::synthetic_message()),
            value: DocumentValue::Message(message),
            position: 1,
            size: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn is_message(&self) -> bool {
        self.descriptor.is_message()
    }

    pub fn message(&self) -> Option<M> {
        self.value.as_message().copied()
    }
}

impl NodeTest {
    pub fn matches<'a, M: MessageNode<'a>>(&self, context: &NodeContext<'a, M>) -> bool {
        self.matches_descriptor(&context.descriptor)
    }

    pub fn matches_descriptor(&self, descriptor: &FieldDescriptor) -> bool {
        match self {
            NodeTest::Wildcard => true,
            NodeTest::Node => descriptor.is_message(),
            NodeTest::Name(name) => *name == descriptor.name,
        }
    }
}
