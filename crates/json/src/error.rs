use pbquery_model::DocumentError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonDocumentError {
    #[error("The document root must be a JSON object, found {0}")]
    RootNotObject(&'static str),

    #[error("Field '{0}' holds an array inside an array, which has no message equivalent")]
    NestedArray(String),

    #[error("Field '{0}' mixes objects and scalars in one array")]
    MixedArray(String),

    #[error("Field '{field}' holds a number that cannot be represented: {value}")]
    UnsupportedNumber { field: String, value: String },

    #[error("Document build error: {0}")]
    Document(#[from] DocumentError),
}
