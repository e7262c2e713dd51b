//! Contains the node-collection algorithm for each supported axis.

use crate::ast::{Axis, NodeTest};
use crate::context::NodeContext;
use crate::error::InvalidQuery;
use pbquery_model::{MessageNode, ValueKind};

/// Computes the nodes reachable from `context` along `axis` that pass `test`,
/// in axis-evaluation order. No sorting or deduplication is performed.
pub fn evaluate_axis<'a, M>(
    axis: Axis,
    context: &NodeContext<'a, M>,
    test: &NodeTest,
) -> Result<Vec<NodeContext<'a, M>>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    let mut results = Vec::new();
    match axis {
        // A named child step also reaches a scalar field of that name.
        Axis::Child => match test {
            NodeTest::Name(_) => collect_fields(context, None, test, &mut results),
            _ => collect_fields(context, Some(ValueKind::Message), test, &mut results),
        },
        Axis::Attribute => collect_fields(context, Some(ValueKind::Scalar), test, &mut results),
        Axis::Descendant => collect_descendants(context, test, &mut results),
        Axis::DescendantOrSelf => {
            collect_self(context, test, &mut results);
            collect_descendants(context, test, &mut results);
        }
        Axis::SelfAxis => collect_self(context, test, &mut results),
        Axis::Parent => results.extend(parent(context).filter(|p| test.matches(p))),
        Axis::Ancestor
        | Axis::AncestorOrSelf
        | Axis::Following
        | Axis::FollowingSibling
        | Axis::Namespace
        | Axis::Preceding
        | Axis::PrecedingSibling => {
            log::debug!("Rejecting step on unsupported axis '{}'", axis);
            return Err(InvalidQuery::UnsupportedAxis(axis.to_string()));
        }
    }
    Ok(results)
}

/// The message-kind nodes directly below `context`, repeated fields expanded.
pub fn message_children<'a, M>(context: &NodeContext<'a, M>) -> Vec<NodeContext<'a, M>>
where
    M: MessageNode<'a> + 'a,
{
    let mut results = Vec::new();
    collect_fields(context, Some(ValueKind::Message), &NodeTest::Wildcard, &mut results);
    results
}

/// The containing message of `context`, wrapped with synthetic metadata.
/// Only message nodes can resolve a parent.
pub fn parent<'a, M>(context: &NodeContext<'a, M>) -> Option<NodeContext<'a, M>>
where
    M: MessageNode<'a> + 'a,
{
    context
        .message()?
        .parent()
        .map(NodeContext::synthetic)
}

fn collect_self<'a, M>(
    context: &NodeContext<'a, M>,
    test: &NodeTest,
    results: &mut Vec<NodeContext<'a, M>>,
) where
    M: MessageNode<'a> + 'a,
{
    if test.matches(context) {
        results.push(context.clone());
    }
}

fn collect_fields<'a, M>(
    context: &NodeContext<'a, M>,
    kind: Option<ValueKind>,
    test: &NodeTest,
    results: &mut Vec<NodeContext<'a, M>>,
) where
    M: MessageNode<'a> + 'a,
{
    let Some(message) = context.message() else {
        return;
    };
    for field in message.fields() {
        if kind.is_some_and(|k| k != field.descriptor.kind)
            || !test.matches_descriptor(field.descriptor)
        {
            continue;
        }
        let descriptor = field.descriptor;
        results.extend(
            field
                .values
                .into_iter()
                .map(|value| NodeContext::new(descriptor, value)),
        );
    }
}

// Pre-order, depth-first. Matching and recursion are independent: a message
// that fails the test is still descended into.
fn collect_descendants<'a, M>(
    context: &NodeContext<'a, M>,
    test: &NodeTest,
    results: &mut Vec<NodeContext<'a, M>>,
) where
    M: MessageNode<'a> + 'a,
{
    for child in message_children(context) {
        if test.matches(&child) {
            results.push(child.clone());
        }
        collect_descendants(&child, test, results);
    }
}
