//! JSON adapter for pbquery: builds message documents from `serde_json`
//! values and renders query results back to JSON.

pub mod document;
pub mod error;
pub mod render;

pub use document::{ROOT_TYPE, document_from_json};
pub use error::JsonDocumentError;
pub use render::{RenderOptions, message_to_json, value_to_json, value_to_json_with};
