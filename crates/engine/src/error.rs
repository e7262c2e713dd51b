use thiserror::Error;

/// The single error kind of the query engine: the query itself is at fault.
///
/// Every variant is a cause of an invalid query, detected either while
/// compiling the text or at the point of use during evaluation. Evaluation
/// aborts on the first one; there are no partial results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidQuery {
    #[error("Query syntax error in '{query}': {message}")]
    Syntax { query: String, message: String },

    #[error("Axis '{0}' is not supported")]
    UnsupportedAxis(String),

    #[error("Unknown function '{0}()'")]
    UnknownFunction(String),

    #[error("Function '{0}()' is not implemented")]
    UnimplementedFunction(String),

    #[error("Function '{function}()' error: {message}")]
    Arity { function: String, message: String },

    #[error("Message node '{field}' of type '{type_name}' cannot be used as a scalar value")]
    MessageCoercion { field: String, type_name: String },

    #[error("Expected a single value, got a node set of {0} nodes")]
    NotASingleValue(usize),

    #[error("Type error: {0}")]
    Type(String),
}
