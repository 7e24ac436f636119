//! The boolean levels of the expression grammar.
//!
//! From loosest to tightest binding: `or`, `and`, `not`/`defined`, the
//! equality and string-relational operators, and the comparison operators.
//! The comparison level hands over to the numeric cascade.
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{cut, map};
use nom::sequence::preceded;
use nom::Parser;

use crate::ast::{BinaryOp, Expr, ExprKind};
use crate::error::{Error, ErrorKind};
use crate::input::{Input, ParseResult};
use crate::recipes::{keyword, rtrim};
use crate::regex;
use crate::text;

use super::{binary, numeric, of_for, MAX_EXPR_DEPTH};

/// Parse a condition expression, entering the cascade at the `or` level.
pub(crate) fn expression(mut input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();

    if input.expr_depth >= MAX_EXPR_DEPTH {
        return Err(nom::Err::Failure(Error::new(
            start..start,
            ErrorKind::ExprTooDeep,
        )));
    }

    input.expr_depth += 1;
    let (mut input, expr) = disjunction(input)?;
    input.expr_depth -= 1;

    Ok((input, expr))
}

/// Parse the `or` operator.
fn disjunction(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, first) = conjunction(input)?;

    if keyword("or")(input).is_err() {
        return Ok((input, first));
    }

    let mut operands = vec![first];
    while let Ok((i, _)) = rtrim(keyword("or")).parse(input) {
        let (i, operand) = cut(conjunction).parse(i)?;
        operands.push(operand);
        input = i;
    }
    Ok((
        input,
        Expr {
            kind: ExprKind::Or(operands),
            span: input.span_from(start),
        },
    ))
}

/// Parse the `and` operator.
fn conjunction(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, first) = negation(input)?;

    if keyword("and")(input).is_err() {
        return Ok((input, first));
    }

    let mut operands = vec![first];
    while let Ok((i, _)) = rtrim(keyword("and")).parse(input) {
        let (i, operand) = cut(negation).parse(i)?;
        operands.push(operand);
        input = i;
    }
    Ok((
        input,
        Expr {
            kind: ExprKind::And(operands),
            span: input.span_from(start),
        },
    ))
}

/// Parse the `not` and `defined` prefix operators.
fn negation(mut input: Input) -> ParseResult<Expr> {
    // Prefixes are accumulated iteratively to keep deep chains of `not`
    // from growing the stack.
    let mut prefixes = Vec::new();
    loop {
        let start = input.byte_offset();
        match rtrim(alt((keyword("not"), keyword("defined")))).parse(input) {
            Ok((i, word)) => {
                prefixes.push((
                    if word == "not" {
                        ExprKind::Not
                    } else {
                        ExprKind::Defined
                    },
                    start,
                ));
                input = i;
            }
            Err(_) => break,
        }
    }

    let (input, mut expr) = item(input)?;
    while let Some((build, start)) = prefixes.pop() {
        expr = Expr {
            kind: build(Box::new(expr)),
            span: input.span_from(start),
        };
    }

    Ok((input, expr))
}

/// Parse a boolean item.
///
/// The quantified forms recognizable on their first token and the pattern
/// match tests are tried first; everything else starts as an
/// equality-level expression, which may then reveal itself to be the
/// quantifier of an `of` expression.
fn item(input: Input) -> ParseResult<Expr> {
    match alt((of_for::quantified, pattern_expression)).parse(input) {
        Ok(res) => return Ok(res),
        Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
        Err(_) => (),
    }

    let start = input.byte_offset();
    let (input, expr) = equality(input)?;

    // `expr ('%') of ...` uses the expression as its quantifier; if no `of`
    // follows, the expression stands on its own.
    of_for::quantified_after_expr(expr, start, input)
}

/// Operators of the equality level.
enum EqualityOp {
    /// An operator taking two expressions.
    Op(BinaryOp),
    /// `matches`, whose right-hand side is a regex literal.
    Matches,
}

fn equality_op(input: Input) -> ParseResult<EqualityOp> {
    rtrim(alt((
        map(tag("=="), |_| EqualityOp::Op(BinaryOp::Eq)),
        map(tag("!="), |_| EqualityOp::Op(BinaryOp::Ne)),
        map(keyword("contains"), |_| {
            EqualityOp::Op(BinaryOp::Contains {
                case_insensitive: false,
            })
        }),
        map(keyword("icontains"), |_| {
            EqualityOp::Op(BinaryOp::Contains {
                case_insensitive: true,
            })
        }),
        map(keyword("startswith"), |_| {
            EqualityOp::Op(BinaryOp::StartsWith {
                case_insensitive: false,
            })
        }),
        map(keyword("istartswith"), |_| {
            EqualityOp::Op(BinaryOp::StartsWith {
                case_insensitive: true,
            })
        }),
        map(keyword("endswith"), |_| {
            EqualityOp::Op(BinaryOp::EndsWith {
                case_insensitive: false,
            })
        }),
        map(keyword("iendswith"), |_| {
            EqualityOp::Op(BinaryOp::EndsWith {
                case_insensitive: true,
            })
        }),
        map(keyword("iequals"), |_| EqualityOp::Op(BinaryOp::IEquals)),
        map(keyword("matches"), |_| EqualityOp::Matches),
    )))
    .parse(input)
}

/// Parse the `==`, `!=`, string-relational and `matches` operators.
fn equality(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = comparison(input)?;

    while let Ok((i, op)) = equality_op(input) {
        match op {
            EqualityOp::Op(op) => {
                let (i, rhs) = cut(comparison).parse(i)?;
                input = i;
                lhs = binary(op, lhs, rhs, input.span_from(start));
            }
            EqualityOp::Matches => {
                let (i, regex) = cut(regex::regex).parse(i)?;
                input = i;
                lhs = Expr {
                    kind: ExprKind::Matches {
                        expr: Box::new(lhs),
                        regex,
                    },
                    span: input.span_from(start),
                };
            }
        }
    }
    Ok((input, lhs))
}

/// Parse the `<`, `<=`, `>` and `>=` operators.
fn comparison(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = numeric::numeric_expression(input)?;

    while let Ok((i, op)) = rtrim(alt((
        map(tag("<="), |_| BinaryOp::Le),
        map(tag(">="), |_| BinaryOp::Ge),
        map(tag("<"), |_| BinaryOp::Lt),
        map(tag(">"), |_| BinaryOp::Gt),
    )))
    .parse(input)
    {
        let (i, rhs) = cut(numeric::numeric_expression).parse(i)?;
        input = i;
        lhs = binary(op, lhs, rhs, input.span_from(start));
    }
    Ok((input, lhs))
}

/// Parse the expressions led by a pattern identifier:
/// `$a`, `$a at expr` and `$a in range`.
fn pattern_expression(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (input, name) = text::pattern_identifier(input)?;
    let name_span = input.span_from(start);

    if let Ok((i, offset)) =
        preceded(rtrim(keyword("at")), numeric::numeric_expression).parse(input)
    {
        Ok((
            i,
            Expr {
                kind: ExprKind::PatternAt {
                    name,
                    name_span,
                    offset: Box::new(offset),
                },
                span: i.span_from(start),
            },
        ))
    } else if let Ok((i, (from, to))) = preceded(rtrim(keyword("in")), super::range).parse(input) {
        Ok((
            i,
            Expr {
                kind: ExprKind::PatternIn {
                    name,
                    name_span,
                    from,
                    to,
                },
                span: i.span_from(start),
            },
        ))
    } else {
        Ok((
            input,
            Expr {
                kind: ExprKind::Pattern(name),
                span: name_span,
            },
        ))
    }
}
