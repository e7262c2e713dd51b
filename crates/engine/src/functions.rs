//! The built-in function library.

use crate::engine::EvaluationContext;
use crate::error::InvalidQuery;
use crate::value::QueryValue;
use pbquery_model::MessageNode;

/// Names that are part of the function namespace but have no implementation.
const UNIMPLEMENTED: &[&str] = &[
    "local-name",
    "name",
    "substring",
    "normalize-space",
    "translate",
    "lang",
];

/// A resolved built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    // Node-set
    Last,
    Position,
    Count,
    // String
    String,
    Concat,
    StartsWith,
    Contains,
    SubstringBefore,
    SubstringAfter,
    StringLength,
    // Boolean
    Boolean,
    Not,
    True,
    False,
    // Number
    Number,
    Sum,
    Floor,
    Ceiling,
    Round,
}

impl Function {
    /// Looks up a built-in by name.
    pub fn resolve(name: &str) -> Result<Self, InvalidQuery> {
        let function = match name {
            "last" => Function::Last,
            "position" => Function::Position,
            "count" => Function::Count,
            "string" => Function::String,
            "concat" => Function::Concat,
            "starts-with" => Function::StartsWith,
            "contains" => Function::Contains,
            "substring-before" => Function::SubstringBefore,
            "substring-after" => Function::SubstringAfter,
            "string-length" => Function::StringLength,
            "boolean" => Function::Boolean,
            "not" => Function::Not,
            "true" => Function::True,
            "false" => Function::False,
            "number" => Function::Number,
            "sum" => Function::Sum,
            "floor" => Function::Floor,
            "ceiling" => Function::Ceiling,
            "round" => Function::Round,
            _ if UNIMPLEMENTED.contains(&name) => {
                return Err(InvalidQuery::UnimplementedFunction(name.to_string()));
            }
            _ => return Err(InvalidQuery::UnknownFunction(name.to_string())),
        };
        Ok(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Last => "last",
            Function::Position => "position",
            Function::Count => "count",
            Function::String => "string",
            Function::Concat => "concat",
            Function::StartsWith => "starts-with",
            Function::Contains => "contains",
            Function::SubstringBefore => "substring-before",
            Function::SubstringAfter => "substring-after",
            Function::StringLength => "string-length",
            Function::Boolean => "boolean",
            Function::Not => "not",
            Function::True => "true",
            Function::False => "false",
            Function::Number => "number",
            Function::Sum => "sum",
            Function::Floor => "floor",
            Function::Ceiling => "ceiling",
            Function::Round => "round",
        }
    }

    /// Whether arguments are passed as evaluated, without node-set coercion.
    pub fn takes_raw_args(self) -> bool {
        matches!(self, Function::Count | Function::Sum)
    }
}

/// Dispatches a function call to its implementation.
pub fn evaluate_function<'a, M>(
    function: Function,
    mut args: Vec<QueryValue<'a, M>>,
    e_ctx: &EvaluationContext<'a, '_, M>,
) -> Result<QueryValue<'a, M>, InvalidQuery>
where
    M: MessageNode<'a> + 'a,
{
    let value = match function {
        Function::Last => {
            expect_arity(function, &args, 0)?;
            QueryValue::Number(e_ctx.node.size as f64)
        }
        Function::Position => {
            expect_arity(function, &args, 0)?;
            QueryValue::Number(e_ctx.node.position as f64)
        }
        Function::Count => match single_arg(function, args)? {
            QueryValue::NodeSet(nodes) => QueryValue::Number(nodes.len() as f64),
            other => return Err(expected_node_set(function, &other)),
        },
        Function::Sum => match single_arg(function, args)? {
            QueryValue::NodeSet(nodes) => {
                let mut total = 0.0;
                for node in &nodes {
                    total += QueryValue::from_node(node)?.number()?;
                }
                QueryValue::Number(total)
            }
            other => return Err(expected_node_set(function, &other)),
        },
        Function::String => QueryValue::String(single_arg(function, args)?.string()?),
        Function::Concat => {
            if args.len() < 2 {
                return Err(arity_error(function, "Expected at least 2 arguments"));
            }
            let mut result = String::new();
            for arg in &args {
                result.push_str(&arg.string()?);
            }
            QueryValue::String(result)
        }
        Function::StartsWith => {
            let (s, prefix) = string_pair(function, &mut args)?;
            QueryValue::Boolean(s.starts_with(&prefix))
        }
        Function::Contains => {
            let (s, sub) = string_pair(function, &mut args)?;
            QueryValue::Boolean(s.contains(&sub))
        }
        Function::SubstringBefore => {
            let (s, sep) = string_pair(function, &mut args)?;
            let before = s.find(&sep).map(|i| &s[..i]).unwrap_or("");
            QueryValue::String(before.to_string())
        }
        Function::SubstringAfter => {
            let (s, sep) = string_pair(function, &mut args)?;
            let after = s.find(&sep).map(|i| &s[i + sep.len()..]).unwrap_or("");
            QueryValue::String(after.to_string())
        }
        Function::StringLength => {
            let s = single_arg(function, args)?.string()?;
            QueryValue::Number(s.chars().count() as f64)
        }
        Function::Boolean => QueryValue::Boolean(single_arg(function, args)?.to_bool()),
        Function::Not => QueryValue::Boolean(!single_arg(function, args)?.to_bool()),
        Function::True => {
            expect_arity(function, &args, 0)?;
            QueryValue::Boolean(true)
        }
        Function::False => {
            expect_arity(function, &args, 0)?;
            QueryValue::Boolean(false)
        }
        Function::Number => QueryValue::Number(single_arg(function, args)?.number()?),
        Function::Floor => QueryValue::Number(single_arg(function, args)?.number()?.floor()),
        Function::Ceiling => QueryValue::Number(single_arg(function, args)?.number()?.ceil()),
        // Halves round away from zero.
        Function::Round => QueryValue::Number(single_arg(function, args)?.number()?.round()),
    };
    Ok(value)
}

fn arity_error(function: Function, message: &str) -> InvalidQuery {
    InvalidQuery::Arity {
        function: function.name().to_string(),
        message: message.to_string(),
    }
}

fn expect_arity<T>(function: Function, args: &[T], expected: usize) -> Result<(), InvalidQuery> {
    if args.len() == expected {
        return Ok(());
    }
    let plural = if expected == 1 { "" } else { "s" };
    Err(arity_error(
        function,
        &format!("Expected {expected} argument{plural}, got {}", args.len()),
    ))
}

fn single_arg<T>(function: Function, mut args: Vec<T>) -> Result<T, InvalidQuery> {
    expect_arity(function, &args, 1)?;
    args.pop().ok_or_else(|| arity_error(function, "Expected 1 argument"))
}

fn string_pair<'a, M: MessageNode<'a>>(
    function: Function,
    args: &mut Vec<QueryValue<'a, M>>,
) -> Result<(String, String), InvalidQuery> {
    expect_arity(function, args, 2)?;
    let second = args.pop().map(|v| v.string()).transpose()?.unwrap_or_default();
    let first = args.pop().map(|v| v.string()).transpose()?.unwrap_or_default();
    Ok((first, second))
}

fn expected_node_set<'a, M: MessageNode<'a>>(
    function: Function,
    found: &QueryValue<'a, M>,
) -> InvalidQuery {
    InvalidQuery::Type(format!(
        "{}() expects a node-set, got a {}",
        function.name(),
        found.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NodeContext;
    use pbquery_model::tests::person_document;
    use pbquery_model::{
        Cardinality, DocumentValue, FieldDescriptor, Scalar, TreeMessage, ValueKind,
    };

    type Value = QueryValue<'static, TreeMessage<'static>>;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, InvalidQuery> {
        let doc: &'static _ = Box::leak(Box::new(person_document()));
        let node = NodeContext::synthetic(doc.root());
        let e_ctx = EvaluationContext::new(&node, &node);
        evaluate_function(Function::resolve(name)?, args, &e_ctx)
    }

    fn s(text: &str) -> Value {
        QueryValue::String(text.to_string())
    }

    fn n(value: f64) -> Value {
        QueryValue::Number(value)
    }

    #[test]
    fn resolve_distinguishes_unknown_from_unimplemented() {
        assert_eq!(Function::resolve("count"), Ok(Function::Count));
        for name in UNIMPLEMENTED {
            assert_eq!(
                Function::resolve(name),
                Err(InvalidQuery::UnimplementedFunction(name.to_string()))
            );
        }
        assert_eq!(
            Function::resolve("frobnicate"),
            Err(InvalidQuery::UnknownFunction("frobnicate".into()))
        );
    }

    #[test]
    fn string_functions() {
        assert_eq!(call("concat", vec![s("a"), n(1.0), s("b")]).unwrap(), s("a1b"));
        assert_eq!(call("starts-with", vec![s("Fido"), s("Fi")]).unwrap(), QueryValue::Boolean(true));
        assert_eq!(call("contains", vec![s("Fido"), s("x")]).unwrap(), QueryValue::Boolean(false));
        assert_eq!(call("substring-before", vec![s("1999/04/01"), s("/")]).unwrap(), s("1999"));
        assert_eq!(call("substring-after", vec![s("1999/04/01"), s("/")]).unwrap(), s("04/01"));
        assert_eq!(call("substring-after", vec![s("abc"), s("z")]).unwrap(), s(""));
        assert_eq!(call("substring-before", vec![s("abc"), s("z")]).unwrap(), s(""));
        assert_eq!(call("string-length", vec![s("héllo")]).unwrap(), n(5.0));
        assert_eq!(call("string", vec![n(3.0)]).unwrap(), s("3"));
    }

    #[test]
    fn number_functions() {
        assert_eq!(call("floor", vec![n(2.7)]).unwrap(), n(2.0));
        assert_eq!(call("ceiling", vec![n(2.1)]).unwrap(), n(3.0));
        assert_eq!(call("round", vec![n(2.5)]).unwrap(), n(3.0));
        assert_eq!(call("round", vec![n(-2.5)]).unwrap(), n(-3.0));
        assert_eq!(call("number", vec![s(" 12 ")]).unwrap(), n(12.0));
    }

    #[test]
    fn boolean_functions() {
        assert_eq!(call("true", vec![]).unwrap(), QueryValue::Boolean(true));
        assert_eq!(call("not", vec![s("")]).unwrap(), QueryValue::Boolean(true));
        assert_eq!(call("boolean", vec![QueryValue::NodeSet(vec![])]).unwrap(), QueryValue::Boolean(false));
    }

    #[test]
    fn count_and_sum_need_node_sets() {
        let descriptor: &'static FieldDescriptor =
            Box::leak(Box::new(FieldDescriptor::new("age", ValueKind::Scalar, Cardinality::Repeated)));
        let values: &'static [Scalar] = Box::leak(Box::new([Scalar::from(3), Scalar::from(5)]));
        let nodes: Vec<_> = values
            .iter()
            .map(|v| NodeContext::new(descriptor, DocumentValue::borrowed(v)))
            .collect();

        assert_eq!(call("count", vec![QueryValue::NodeSet(nodes.clone())]).unwrap(), n(2.0));
        assert_eq!(call("sum", vec![QueryValue::NodeSet(nodes)]).unwrap(), n(8.0));
        assert!(matches!(call("count", vec![n(1.0)]), Err(InvalidQuery::Type(_))));
    }

    #[test]
    fn arity_is_checked() {
        assert!(matches!(call("concat", vec![s("a")]), Err(InvalidQuery::Arity { .. })));
        assert!(matches!(call("true", vec![s("a")]), Err(InvalidQuery::Arity { .. })));
        assert!(matches!(call("contains", vec![s("a")]), Err(InvalidQuery::Arity { .. })));
        assert!(matches!(call("string", vec![]), Err(InvalidQuery::Arity { .. })));
    }

    #[test]
    fn string_functions_reject_multi_node_sets() {
        assert_eq!(
            call("string", vec![QueryValue::NodeSet(vec![])]),
            Err(InvalidQuery::NotASingleValue(0))
        );
    }
}
