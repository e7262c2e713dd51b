//! Defines the Abstract Syntax Tree (AST) for compiled queries.

use std::fmt;

/// A compiled query: one or more independent expressions whose results are
/// concatenated in declaration order (`a | b`).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub paths: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64),
    Literal(String),
    Path(LocationPath),
    /// A primary expression narrowed by predicates, e.g. `(pet)[1]`.
    Filter {
        primary: Box<Expression>,
        predicates: Vec<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    /// Short-circuiting disjunction over two or more operands.
    Or(Vec<Expression>),
    /// Short-circuiting conjunction over two or more operands.
    And(Vec<Expression>),
    /// A left-associative operator chain of one precedence level:
    /// `first op rest[0].1 op rest[1].1 ...`.
    BinaryChain {
        first: Box<Expression>,
        rest: Vec<(BinaryOperator, Expression)>,
    },
    Negate(Box<Expression>),
}

/// The operators usable inside a [`Expression::BinaryChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Equality
    Equals,
    NotEquals,
    // Relational
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Additive
    Plus,
    Minus,
    // Multiplicative
    Multiply,
    Divide,
    Modulo,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "div",
            BinaryOperator::Modulo => "mod",
        };
        f.write_str(symbol)
    }
}

/// A path like `pet[2]/name`, `//name` or `count(pet)/x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub start: PathStart,
    pub steps: Vec<PathStep>,
}

/// Where a path begins.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStart {
    /// The current context node (relative path).
    Context,
    /// The query root (path starting with `/` or `//`).
    Root,
    /// The node set produced by another expression.
    Expression(Box<Expression>),
}

/// A step together with the separator that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// True when the step was introduced by `//`: it is applied to every
    /// message at or below each context node.
    pub anywhere: bool,
    pub step: Step,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub predicates: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// `axis::test`, `@test` or a bare `test` (child axis).
    Axis { axis: Axis, node_test: NodeTest },
    /// `.`
    Current,
    /// `..`
    Parent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    #[default]
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Ancestor => "ancestor",
            Axis::AncestorOrSelf => "ancestor-or-self",
            Axis::Attribute => "attribute",
            Axis::Child => "child",
            Axis::Descendant => "descendant",
            Axis::DescendantOrSelf => "descendant-or-self",
            Axis::Following => "following",
            Axis::FollowingSibling => "following-sibling",
            Axis::Namespace => "namespace",
            Axis::Parent => "parent",
            Axis::Preceding => "preceding",
            Axis::PrecedingSibling => "preceding-sibling",
            Axis::SelfAxis => "self",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A filter on field name/kind applied after axis traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`
    Wildcard,
    /// `node()`: message-kind nodes only.
    Node,
    /// A literal field name.
    Name(String),
}
