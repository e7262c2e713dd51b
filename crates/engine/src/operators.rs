//! Binary operator evaluation over coerced operands.

use crate::ast::BinaryOperator;
use crate::error::InvalidQuery;
use crate::value::QueryValue;
use pbquery_model::MessageNode;
use std::cmp::Ordering;

/// Applies `op` to two operands that have already been through node-set
/// coercion.
pub fn apply<'a, M: MessageNode<'a>>(
    op: BinaryOperator,
    left: QueryValue<'a, M>,
    right: QueryValue<'a, M>,
) -> Result<QueryValue<'a, M>, InvalidQuery> {
    let result = match op {
        BinaryOperator::Equals => QueryValue::Boolean(equals(&left, &right)?),
        BinaryOperator::NotEquals => QueryValue::Boolean(!equals(&left, &right)?),
        BinaryOperator::LessThan => ordered(&left, &right, Ordering::is_lt)?,
        BinaryOperator::LessThanOrEqual => ordered(&left, &right, Ordering::is_le)?,
        BinaryOperator::GreaterThan => ordered(&left, &right, Ordering::is_gt)?,
        BinaryOperator::GreaterThanOrEqual => ordered(&left, &right, Ordering::is_ge)?,
        BinaryOperator::Plus => QueryValue::Number(left.number()? + right.number()?),
        BinaryOperator::Minus => QueryValue::Number(left.number()? - right.number()?),
        BinaryOperator::Multiply => QueryValue::Number(left.number()? * right.number()?),
        BinaryOperator::Divide => QueryValue::Number((left.number()? / right.number()?).floor()),
        BinaryOperator::Modulo => {
            QueryValue::Number(floored_mod(left.number()?, right.number()?))
        }
    };
    Ok(result)
}

/// Relational test between coerced operands: lexical when both are strings,
/// numeric otherwise. A NaN on either side makes it false.
fn ordered<'a, M: MessageNode<'a>>(
    left: &QueryValue<'a, M>,
    right: &QueryValue<'a, M>,
    test: fn(Ordering) -> bool,
) -> Result<QueryValue<'a, M>, InvalidQuery> {
    let ordering = match (left, right) {
        (QueryValue::String(l), QueryValue::String(r)) => Some(l.cmp(r)),
        _ => left.number()?.partial_cmp(&right.number()?),
    };
    Ok(QueryValue::Boolean(ordering.is_some_and(test)))
}

/// Remainder whose sign follows the divisor.
fn floored_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

/// Equality between coerced operands.
///
/// Two sets are equal when they hold pairwise equal values; a set never
/// equals a scalar. Scalars compare as booleans if either side is one, else
/// as numbers if either side is one, else as strings.
pub fn equals<'a, M: MessageNode<'a>>(
    left: &QueryValue<'a, M>,
    right: &QueryValue<'a, M>,
) -> Result<bool, InvalidQuery> {
    Ok(match (left, right) {
        (QueryValue::NodeSet(l), QueryValue::NodeSet(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| a.value == b.value)
        }
        (QueryValue::NodeSet(_), _) | (_, QueryValue::NodeSet(_)) => false,
        (QueryValue::Boolean(_), _) | (_, QueryValue::Boolean(_)) => {
            left.to_bool() == right.to_bool()
        }
        (QueryValue::Number(_), _) | (_, QueryValue::Number(_)) => {
            left.number()? == right.number()?
        }
        _ => left.string()? == right.string()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NodeContext;
    use pbquery_model::tests::person_document;
    use pbquery_model::TreeMessage;

    type Value<'a> = QueryValue<'a, TreeMessage<'a>>;

    fn num(n: f64) -> Value<'static> {
        QueryValue::Number(n)
    }

    fn string(s: &str) -> Value<'static> {
        QueryValue::String(s.to_string())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(apply(BinaryOperator::Plus, num(1.0), num(2.0)).unwrap(), num(3.0));
        assert_eq!(apply(BinaryOperator::Minus, num(1.0), num(2.0)).unwrap(), num(-1.0));
        assert_eq!(apply(BinaryOperator::Multiply, num(3.0), num(2.0)).unwrap(), num(6.0));
        assert_eq!(apply(BinaryOperator::Divide, num(7.0), num(2.0)).unwrap(), num(3.0));
        assert_eq!(apply(BinaryOperator::Divide, num(-7.0), num(2.0)).unwrap(), num(-4.0));
        assert_eq!(apply(BinaryOperator::Modulo, num(7.0), num(3.0)).unwrap(), num(1.0));
        assert_eq!(apply(BinaryOperator::Modulo, num(-7.0), num(3.0)).unwrap(), num(2.0));
        assert_eq!(apply(BinaryOperator::Modulo, num(7.0), num(-3.0)).unwrap(), num(-2.0));
        assert_eq!(apply(BinaryOperator::Modulo, num(-7.5), num(2.0)).unwrap(), num(0.5));
        assert_eq!(apply(BinaryOperator::Plus, string("2"), num(2.0)).unwrap(), num(4.0));
    }

    #[test]
    fn relational_compares_numbers() {
        let t = QueryValue::Boolean(true);
        assert_eq!(apply(BinaryOperator::LessThan, num(1.0), num(2.0)).unwrap(), t);
        assert_eq!(apply(BinaryOperator::GreaterThanOrEqual, string("10"), num(9.0)).unwrap(), t);
        assert_eq!(
            apply(BinaryOperator::GreaterThan, string("x"), num(0.0)).unwrap(),
            QueryValue::Boolean(false)
        );
    }

    #[test]
    fn relational_compares_two_strings_lexically() {
        let t = QueryValue::Boolean(true);
        let f = QueryValue::Boolean(false);
        assert_eq!(apply(BinaryOperator::GreaterThan, string("b"), string("a")).unwrap(), t);
        assert_eq!(apply(BinaryOperator::LessThan, string("Ann"), string("M")).unwrap(), t);
        assert_eq!(apply(BinaryOperator::LessThanOrEqual, string("b"), string("b")).unwrap(), t);
        assert_eq!(apply(BinaryOperator::LessThan, string("10"), string("9")).unwrap(), t);
        assert_eq!(apply(BinaryOperator::GreaterThanOrEqual, string("a"), string("b")).unwrap(), f);
    }

    #[test]
    fn equality_precedence() {
        assert!(equals(&string("1.0"), &num(1.0)).unwrap());
        assert!(!equals(&string("1.0"), &string("1")).unwrap());
        assert!(equals(&QueryValue::Boolean(true), &string("x")).unwrap());
        assert!(equals(&QueryValue::Boolean(false), &num(0.0)).unwrap());
    }

    #[test]
    fn set_equality() {
        let doc = person_document();
        let root = NodeContext::synthetic(doc.root());
        let empty: Value<'_> = QueryValue::NodeSet(vec![]);
        let pair: Value<'_> = QueryValue::NodeSet(vec![root.clone(), root.clone()]);
        assert!(equals(&pair, &pair.clone()).unwrap());
        assert!(!equals(&pair, &empty).unwrap());
        assert!(!equals(&empty, &string("")).unwrap());
        assert_eq!(
            apply(BinaryOperator::NotEquals, empty, num(0.0)).unwrap(),
            QueryValue::Boolean(true)
        );
    }

    #[test]
    fn arithmetic_rejects_sets() {
        let empty: Value<'_> = QueryValue::NodeSet(vec![]);
        assert_eq!(
            apply(BinaryOperator::Plus, empty, num(1.0)),
            Err(InvalidQuery::NotASingleValue(0))
        );
    }
}
