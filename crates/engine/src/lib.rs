pub mod ast;
pub mod axes;
pub mod context;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;
pub mod value;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, PathStart, Query, Step};
pub use context::NodeContext;
pub use engine::{EvaluationContext, evaluate};
pub use error::InvalidQuery;
pub use parser::{compile, parse_expression};
pub use value::QueryValue;
