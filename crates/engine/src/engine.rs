//! The evaluation engine for executing a compiled query against any `MessageNode` document.

use crate::ast::{Expression, LocationPath, PathStart, Query, Step, StepKind};
use crate::axes;
use crate::context::NodeContext;
use crate::error::InvalidQuery;
use crate::functions::{self, Function};
use crate::operators;
use crate::value::QueryValue;
use pbquery_model::{DocumentValue, MessageNode};

/// The state an expression is evaluated against.
/// `'a` is the lifetime of the underlying document.
/// `'r` is the lifetime of the borrowed context nodes.
pub struct EvaluationContext<'a, 'r, M> {
    /// The node the expression is evaluated for. Inside a predicate its
    /// `position`/`size` are what `position()` and `last()` read.
    pub node: &'r NodeContext<'a, M>,
    /// The synthetic query root, the start of absolute paths.
    pub root: &'r NodeContext<'a, M>,
}

impl<'a, 'r, M: MessageNode<'a>> EvaluationContext<'a, 'r, M> {
    pub fn new(node: &'r NodeContext<'a, M>, root: &'r NodeContext<'a, M>) -> Self {
        Self { node, root }
    }

    /// The same evaluation, focused on another node.
    pub fn with_node<'n>(&self, node: &'n NodeContext<'a, M>) -> EvaluationContext<'a, 'n, M>
    where
        'r: 'n,
    {
        EvaluationContext {
            node,
            root: self.root,
        }
    }
}

/// Evaluates every top-level expression of `query` against the document
/// rooted at `root` and concatenates their results in declaration order.
///
/// Node-set results contribute each node's value; scalar results (e.g. a
/// top-level `count(...)`) contribute one owned scalar.
pub fn evaluate<'a, M>(query: &Query, root: M) -> Result<Vec<DocumentValue<'a, M>>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    // Built fresh for every call; the document's own descriptors stay untouched.
    let root_ctx = NodeContext::synthetic(root);
    let e_ctx = EvaluationContext::new(&root_ctx, &root_ctx);

    let mut results = Vec::new();
    for expr in &query.paths {
        let value = evaluate_expression(expr, &e_ctx)?;
        log::trace!("Top-level expression produced a {}", value.kind());
        results.extend(value.into_document_values());
    }
    log::debug!(
        "Evaluated {} path(s) against {:?}: {} result(s)",
        query.paths.len(),
        root,
        results.len()
    );
    Ok(results)
}

impl Query {
    /// See [`evaluate`].
    pub fn evaluate<'a, M>(&self, root: M) -> Result<Vec<DocumentValue<'a, M>>, InvalidQuery>
    where
        M: MessageNode<'a> + 'a,
    {
        evaluate(self, root)
    }
}

/// Evaluates a compiled expression and returns a concrete `QueryValue`.
pub fn evaluate_expression<'a, M>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, '_, M>,
) -> Result<QueryValue<'a, M>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    match expr {
        Expression::Number(n) => Ok(QueryValue::Number(*n)),
        Expression::Literal(s) => Ok(QueryValue::String(s.clone())),
        Expression::Path(path) => Ok(QueryValue::NodeSet(evaluate_location_path(path, e_ctx)?)),
        Expression::Filter {
            primary,
            predicates,
        } => {
            let nodes = expect_node_set(evaluate_expression(primary, e_ctx)?)?;
            Ok(QueryValue::NodeSet(apply_predicates(nodes, predicates, e_ctx)?))
        }
        Expression::FunctionCall { name, args } => {
            // Resolve first so an unknown name fails before its arguments run.
            let function = Function::resolve(name)?;
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                let value = evaluate_expression(arg, e_ctx)?;
                evaluated.push(if function.takes_raw_args() {
                    value
                } else {
                    value.coerce()?
                });
            }
            functions::evaluate_function(function, evaluated, e_ctx)
        }
        Expression::Or(operands) => {
            for operand in operands {
                if evaluate_expression(operand, e_ctx)?.to_bool() {
                    return Ok(QueryValue::Boolean(true));
                }
            }
            Ok(QueryValue::Boolean(false))
        }
        Expression::And(operands) => {
            for operand in operands {
                if !evaluate_expression(operand, e_ctx)?.to_bool() {
                    return Ok(QueryValue::Boolean(false));
                }
            }
            Ok(QueryValue::Boolean(true))
        }
        Expression::BinaryChain { first, rest } => {
            let mut acc = evaluate_expression(first, e_ctx)?.coerce()?;
            for (op, operand) in rest {
                let right = evaluate_expression(operand, e_ctx)?.coerce()?;
                acc = operators::apply(*op, acc, right)?;
            }
            Ok(acc)
        }
        Expression::Negate(inner) => {
            let value = evaluate_expression(inner, e_ctx)?.coerce()?;
            Ok(QueryValue::Number(-value.number()?))
        }
    }
}

fn expect_node_set<'a, M: MessageNode<'a>>(
    value: QueryValue<'a, M>,
) -> Result<Vec<NodeContext<'a, M>>, InvalidQuery> {
    match value {
        QueryValue::NodeSet(nodes) => Ok(nodes),
        other => Err(InvalidQuery::Type(format!(
            "Expected a node-set, got a {}",
            other.kind()
        ))),
    }
}

/// Narrows `nodes` by each predicate in turn. Before a predicate runs, every
/// node is stamped with its 1-based position and the current set size.
pub fn apply_predicates<'a, M>(
    mut nodes: Vec<NodeContext<'a, M>>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, M>,
) -> Result<Vec<NodeContext<'a, M>>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    for predicate in predicates {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (i, mut node) in nodes.into_iter().enumerate() {
            node.position = i + 1;
            node.size = size;
            let keep = match evaluate_expression(predicate, &e_ctx.with_node(&node))? {
                QueryValue::Boolean(b) => b,
                QueryValue::Number(n) => n == node.position as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        nodes = kept;
    }
    Ok(nodes)
}

/// Evaluates one step from a single context node: axis selection and node
/// test (or the abbreviated `.`/`..`), then its predicates.
pub fn evaluate_step<'a, M>(
    step: &Step,
    context: &NodeContext<'a, M>,
    e_ctx: &EvaluationContext<'a, '_, M>,
) -> Result<Vec<NodeContext<'a, M>>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    let nodes = match &step.kind {
        StepKind::Axis { axis, node_test } => axes::evaluate_axis(*axis, context, node_test)?,
        StepKind::Current => vec![context.clone()],
        StepKind::Parent => axes::parent(context).into_iter().collect(),
    };
    apply_predicates(nodes, &step.predicates, e_ctx)
}

/// Applies `step` to `context` and to every message below it, self first,
/// in pre-order.
fn evaluate_step_anywhere<'a, M>(
    step: &Step,
    context: &NodeContext<'a, M>,
    e_ctx: &EvaluationContext<'a, '_, M>,
    results: &mut Vec<NodeContext<'a, M>>,
) -> Result<(), InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    if !context.is_message() {
        return Ok(());
    }
    results.extend(evaluate_step(step, context, e_ctx)?);
    for child in axes::message_children(context) {
        evaluate_step_anywhere(step, &child, e_ctx, results)?;
    }
    Ok(())
}

/// Evaluates a location path, left to right, one step at a time.
pub fn evaluate_location_path<'a, M>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, '_, M>,
) -> Result<Vec<NodeContext<'a, M>>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    let mut current = match &path.start {
        PathStart::Context => vec![e_ctx.node.clone()],
        PathStart::Root => vec![e_ctx.root.clone()],
        PathStart::Expression(expr) => expect_node_set(evaluate_expression(expr, e_ctx)?)?,
    };

    for path_step in &path.steps {
        let mut next = Vec::new();
        for context in &current {
            if path_step.anywhere {
                evaluate_step_anywhere(&path_step.step, context, e_ctx, &mut next)?;
            } else {
                next.extend(evaluate_step(&path_step.step, context, e_ctx)?);
            }
        }
        current = next;
    }
    Ok(current)
}
