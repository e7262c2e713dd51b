//! Builds a [`MessageTree`] from a `serde_json::Value`.
//!
//! Objects become messages named after the key that holds them, arrays become
//! repeated fields, and `null` (like an empty array) is an unset field.

use crate::error::JsonDocumentError;
use pbquery_model::{MessageId, MessageTree, Scalar};
use serde_json::{Map, Value};

/// Type name given to the message built from the top-level object.
pub const ROOT_TYPE: &str = "root";

/// Parses a JSON object into a navigable message document.
pub fn document_from_json(json: &Value) -> Result<MessageTree, JsonDocumentError> {
    let Value::Object(object) = json else {
        return Err(JsonDocumentError::RootNotObject(json_kind(json)));
    };
    let mut tree = MessageTree::new(ROOT_TYPE);
    let root = tree.root_id();
    build_message(&mut tree, root, object, "")?;
    log::debug!("Built a document of {} message(s) from JSON", tree.len());
    Ok(tree)
}

fn build_message(
    tree: &mut MessageTree,
    id: MessageId,
    object: &Map<String, Value>,
    path: &str,
) -> Result<(), JsonDocumentError> {
    for (key, value) in object {
        let field_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };
        match value {
            Value::Null => {}
            Value::Object(child) => {
                let child_id = tree.set_message(id, key, key.as_str())?;
                build_message(tree, child_id, child, &field_path)?;
            }
            Value::Array(items) => build_repeated(tree, id, key, items, &field_path)?,
            scalar => {
                if let Some(scalar) = to_scalar(scalar, &field_path)? {
                    tree.set_scalar(id, key, scalar)?;
                }
            }
        }
    }
    Ok(())
}

fn build_repeated(
    tree: &mut MessageTree,
    id: MessageId,
    key: &str,
    items: &[Value],
    path: &str,
) -> Result<(), JsonDocumentError> {
    let mut holds_objects = None;
    for (index, item) in items.iter().enumerate() {
        let is_object = match item {
            Value::Null => continue,
            Value::Array(_) => return Err(JsonDocumentError::NestedArray(path.to_string())),
            Value::Object(_) => true,
            _ => false,
        };
        if *holds_objects.get_or_insert(is_object) != is_object {
            return Err(JsonDocumentError::MixedArray(path.to_string()));
        }

        let item_path = format!("{}[{}]", path, index + 1);
        match item {
            Value::Object(child) => {
                let child_id = tree.push_message(id, key, key)?;
                build_message(tree, child_id, child, &item_path)?;
            }
            scalar => {
                if let Some(scalar) = to_scalar(scalar, &item_path)? {
                    tree.push_scalar(id, key, scalar)?;
                }
            }
        }
    }
    Ok(())
}

/// The scalar held by a JSON string, boolean or number; `None` for containers.
fn to_scalar(value: &Value, path: &str) -> Result<Option<Scalar>, JsonDocumentError> {
    let scalar = match value {
        Value::String(s) => Scalar::from(s.as_str()),
        Value::Bool(b) => Scalar::from(*b),
        Value::Number(n) => n.as_f64().map(Scalar::from).ok_or_else(|| {
            JsonDocumentError::UnsupportedNumber {
                field: path.to_string(),
                value: n.to_string(),
            }
        })?,
        Value::Null | Value::Array(_) | Value::Object(_) => return Ok(None),
    };
    Ok(Some(scalar))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
