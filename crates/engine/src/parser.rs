//! A `nom`-based parser for the query language.

use crate::ast::*;
use crate::error::InvalidQuery;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, map_res, not, opt, recognize, value, verify},
    error::ErrorKind,
    multi::{many0, many0_count, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};
use std::str::FromStr;

/// Deepest allowed nesting of parentheses, predicates, function arguments
/// and unary minus signs.
pub const MAX_NESTING: usize = 32;

// --- Main Public Parsers ---

/// Compiles query text into a reusable [`Query`].
pub fn compile(text: &str) -> Result<Query, InvalidQuery> {
    let result = finish(text, query(text.trim()));
    match &result {
        Ok(compiled) => log::debug!("Compiled '{}' into {} path(s)", text, compiled.paths.len()),
        Err(e) => log::debug!("{}", e),
    }
    result
}

/// Parses a single expression (no top-level `|` union).
pub fn parse_expression(text: &str) -> Result<Expression, InvalidQuery> {
    finish(text, expression(text.trim(), 0))
}

fn finish<T>(text: &str, result: IResult<&str, T>) -> Result<T, InvalidQuery> {
    match result {
        Ok(("", parsed)) => Ok(parsed),
        Ok((rest, _)) => Err(syntax_error(text, format!("Unexpected input at '{}'", rest))),
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Err(syntax_error(
            text,
            format!("Expression nests deeper than {} levels", MAX_NESTING),
        )),
        Err(e) => Err(syntax_error(text, e.to_string())),
    }
}

impl FromStr for Query {
    type Err = InvalidQuery;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

fn syntax_error(text: &str, message: String) -> InvalidQuery {
    InvalidQuery::Syntax {
        query: text.to_string(),
        message,
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Matches `word` only when it is not the prefix of a longer name.
fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_name_char)))
}

/// One precedence level: `operand (op operand)*`, kept flat.
fn binary_chain<'a>(
    input: &'a str,
    depth: usize,
    operand: fn(&'a str, usize) -> IResult<&'a str, Expression>,
    operator: fn(&'a str) -> IResult<&'a str, BinaryOperator>,
) -> IResult<&'a str, Expression> {
    let (i, first) = operand(input, depth)?;
    let (i, rest) = many0(pair(ws(operator), |i| operand(i, depth))).parse(i)?;
    if rest.is_empty() {
        return Ok((i, first));
    }
    Ok((
        i,
        Expression::BinaryChain {
            first: Box::new(first),
            rest,
        },
    ))
}

fn collapse(mut operands: Vec<Expression>, build: fn(Vec<Expression>) -> Expression) -> Expression {
    if operands.len() == 1 {
        operands.swap_remove(0)
    } else {
        build(operands)
    }
}

/// A hard failure, so that `alt` does not backtrack into other branches.
fn too_deep(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, ErrorKind::TooLarge))
}

// --- Expression Parsers (in order of precedence) ---

fn query(input: &str) -> IResult<&str, Query> {
    map(
        separated_list1(ws(char('|')), |i| expression(i, 0)),
        |paths| Query { paths },
    )
    .parse(input)
}

/// Every parenthesised expression, predicate and function argument enters
/// here one level deeper.
fn expression(input: &str, depth: usize) -> IResult<&str, Expression> {
    if depth > MAX_NESTING {
        return Err(too_deep(input));
    }
    or_expr(input, depth)
}

fn or_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    map(
        separated_list1(ws(keyword("or")), |i| and_expr(i, depth)),
        |operands| collapse(operands, Expression::Or),
    )
    .parse(input)
}

fn and_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    map(
        separated_list1(ws(keyword("and")), |i| equality_expr(i, depth)),
        |operands| collapse(operands, Expression::And),
    )
    .parse(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::NotEquals, tag("!=")),
        value(BinaryOperator::Equals, char('=')),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::LessThanOrEqual, tag("<=")),
        value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
        value(BinaryOperator::LessThan, char('<')),
        value(BinaryOperator::GreaterThan, char('>')),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Plus, char('+')),
        value(BinaryOperator::Minus, char('-')),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Multiply, char('*')),
        value(BinaryOperator::Divide, keyword("div")),
        value(BinaryOperator::Modulo, keyword("mod")),
    ))
    .parse(input)
}

fn equality_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    binary_chain(input, depth, relational_expr, equality_op)
}

fn relational_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    binary_chain(input, depth, additive_expr, relational_op)
}

fn additive_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    binary_chain(input, depth, multiplicative_expr, additive_op)
}

fn multiplicative_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    binary_chain(input, depth, unary_expr, multiplicative_op)
}

/// Leading minus signs are counted rather than recursed into; each one
/// still costs a nesting level.
fn unary_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    let (i, signs) = many0_count(ws(char('-'))).parse(input)?;
    let depth = depth.saturating_add(signs);
    if depth > MAX_NESTING {
        return Err(too_deep(input));
    }
    let (i, expr) = ws(|i| path_expr(i, depth)).parse(i)?;
    let expr = (0..signs).fold(expr, |expr, _| Expression::Negate(Box::new(expr)));
    Ok((i, expr))
}

/// Primary expressions are tried first: `position()` must not be read as a
/// step named `position`.
fn path_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    alt((
        |i| filter_path(i, depth),
        map(|i| location_path(i, depth), Expression::Path),
    ))
    .parse(input)
}

/// A primary expression, its predicates, and an optional path continuing
/// from the node set it produces.
fn filter_path(input: &str, depth: usize) -> IResult<&str, Expression> {
    let (i, primary) = primary_expr(input, depth)?;
    let (i, predicates) = many0(|i| predicate(i, depth)).parse(i)?;
    let (i, steps) = many0(|i| path_step(i, depth)).parse(i)?;

    let expr = if predicates.is_empty() {
        primary
    } else {
        Expression::Filter {
            primary: Box::new(primary),
            predicates,
        }
    };
    if steps.is_empty() {
        return Ok((i, expr));
    }
    Ok((
        i,
        Expression::Path(LocationPath {
            start: PathStart::Expression(Box::new(expr)),
            steps,
        }),
    ))
}

fn primary_expr(input: &str, depth: usize) -> IResult<&str, Expression> {
    alt((
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        |i| function_call(i, depth),
        delimited(char('('), |i| expression(i, depth + 1), char(')')),
    ))
    .parse(input)
}

// --- Literal Parsers ---

fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

// --- Function Call Parser ---

fn function_call(input: &str, depth: usize) -> IResult<&str, Expression> {
    // `node()` is a node test, not a function.
    let (i, name) = verify(name, |n: &str| n != "node").parse(input)?;
    let (i, args) = delimited(
        ws(char('(')),
        separated_list0(char(','), |i| expression(i, depth + 1)),
        char(')'),
    )
    .parse(i)?;
    Ok((
        i,
        Expression::FunctionCall {
            name: name.to_string(),
            args,
        },
    ))
}

// --- Name and NodeTest Parsers ---

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_name_start), take_while(is_name_char))).parse(input)
}

fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        value(NodeTest::Wildcard, char('*')),
        value(
            NodeTest::Node,
            terminated(keyword("node"), pair(ws(char('(')), char(')'))),
        ),
        map(name, |n: &str| NodeTest::Name(n.to_string())),
    ))
    .parse(input)
}

// --- Path Parsers ---

fn axis_specifier(input: &str) -> IResult<&str, Axis> {
    terminated(
        alt((
            value(Axis::AncestorOrSelf, tag("ancestor-or-self")),
            value(Axis::Ancestor, tag("ancestor")),
            value(Axis::Attribute, tag("attribute")),
            value(Axis::Child, tag("child")),
            value(Axis::DescendantOrSelf, tag("descendant-or-self")),
            value(Axis::Descendant, tag("descendant")),
            value(Axis::FollowingSibling, tag("following-sibling")),
            value(Axis::Following, tag("following")),
            value(Axis::Namespace, tag("namespace")),
            value(Axis::Parent, tag("parent")),
            value(Axis::PrecedingSibling, tag("preceding-sibling")),
            value(Axis::Preceding, tag("preceding")),
            value(Axis::SelfAxis, tag("self")),
        )),
        ws(tag("::")),
    )
    .parse(input)
}

fn predicate(input: &str, depth: usize) -> IResult<&str, Expression> {
    delimited(ws(char('[')), |i| expression(i, depth + 1), ws(char(']'))).parse(input)
}

fn step(input: &str, depth: usize) -> IResult<&str, Step> {
    let (i, kind) = alt((
        value(StepKind::Parent, tag("..")),
        value(StepKind::Current, char('.')),
        map(preceded(char('@'), node_test), |node_test| StepKind::Axis {
            axis: Axis::Attribute,
            node_test,
        }),
        map(pair(opt(axis_specifier), node_test), |(axis, node_test)| {
            StepKind::Axis {
                axis: axis.unwrap_or_default(),
                node_test,
            }
        }),
    ))
    .parse(input)?;
    let (i, predicates) = many0(|i| predicate(i, depth)).parse(i)?;
    Ok((i, Step { kind, predicates }))
}

/// `/` or `//`; the flag is true for `//`.
fn separator(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("//")), value(false, char('/')))).parse(input)
}

fn path_step(input: &str, depth: usize) -> IResult<&str, PathStep> {
    map(pair(ws(separator), |i| step(i, depth)), |(anywhere, step)| PathStep {
        anywhere,
        step,
    })
    .parse(input)
}

fn location_path(input: &str, depth: usize) -> IResult<&str, LocationPath> {
    alt((
        |i| absolute_path(i, depth),
        |i| relative_path(i, depth),
    ))
    .parse(input)
}

fn absolute_path(input: &str, depth: usize) -> IResult<&str, LocationPath> {
    let (i, anywhere) = separator(input)?;
    // A lone `/` selects the root; `//` must be followed by a step.
    let (i, first) = if anywhere {
        map(|i| step(i, depth), Some).parse(i)?
    } else {
        opt(|i| step(i, depth)).parse(i)?
    };
    let Some(first) = first else {
        return Ok((
            i,
            LocationPath {
                start: PathStart::Root,
                steps: Vec::new(),
            },
        ));
    };
    let (i, rest) = many0(|i| path_step(i, depth)).parse(i)?;
    let mut steps = vec![PathStep {
        anywhere,
        step: first,
    }];
    steps.extend(rest);
    Ok((
        i,
        LocationPath {
            start: PathStart::Root,
            steps,
        },
    ))
}

fn relative_path(input: &str, depth: usize) -> IResult<&str, LocationPath> {
    let (i, first) = step(input, depth)?;
    let (i, rest) = many0(|i| path_step(i, depth)).parse(i)?;
    let mut steps = vec![PathStep {
        anywhere: false,
        step: first,
    }];
    steps.extend(rest);
    Ok((
        i,
        LocationPath {
            start: PathStart::Context,
            steps,
        },
    ))
}
