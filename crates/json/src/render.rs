//! Renders query results back to JSON.

use pbquery_model::{DocumentValue, MessageNode, Scalar};
use serde_json::{Map, Number, Value};

/// Configuration for turning document values into JSON.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Render numbers without a fractional part as JSON integers (`2` rather
    /// than `2.0`).
    ///
    /// Defaults to `true`.
    pub integral_numbers: bool,
    /// When set, every rendered message carries its type name under this key.
    ///
    /// Defaults to `None`.
    pub type_key: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            integral_numbers: true,
            type_key: None,
        }
    }
}

/// Renders one query result with the default [`RenderOptions`].
pub fn value_to_json<'a, M: MessageNode<'a>>(value: &DocumentValue<'a, M>) -> Value {
    value_to_json_with(value, &RenderOptions::default())
}

pub fn value_to_json_with<'a, M: MessageNode<'a>>(
    value: &DocumentValue<'a, M>,
    options: &RenderOptions,
) -> Value {
    match value {
        DocumentValue::Scalar(scalar) => scalar_to_json(scalar, options),
        DocumentValue::Message(message) => message_to_json(*message, options),
    }
}

/// Renders a whole message: set fields in declaration order, repeated fields
/// as arrays.
pub fn message_to_json<'a, M: MessageNode<'a>>(message: M, options: &RenderOptions) -> Value {
    let mut object = Map::new();
    if let Some(key) = &options.type_key {
        object.insert(key.clone(), Value::String(message.type_name().to_string()));
    }
    for field in message.fields() {
        let rendered = if field.descriptor.is_repeated() {
            Value::Array(
                field
                    .values
                    .iter()
                    .map(|v| value_to_json_with(v, options))
                    .collect(),
            )
        } else {
            field
                .values
                .first()
                .map(|v| value_to_json_with(v, options))
                .unwrap_or(Value::Null)
        };
        object.insert(field.descriptor.name.clone(), rendered);
    }
    Value::Object(object)
}

fn scalar_to_json(scalar: &Scalar, options: &RenderOptions) -> Value {
    match scalar {
        Scalar::String(s) => Value::String(s.clone()),
        Scalar::Boolean(b) => Value::Bool(*b),
        Scalar::Number(n) => number_to_json(*n, options),
    }
}

// Non-finite numbers have no JSON form and render as null.
fn number_to_json(n: f64, options: &RenderOptions) -> Value {
    if options.integral_numbers && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}
