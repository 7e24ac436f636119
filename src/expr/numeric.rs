//! The numeric levels of the expression grammar.
//!
//! This cascade implements, from loosest to tightest binding: bit-or,
//! bit-xor, bit-and, shifts, additive, multiplicative, unary `-` and `~`,
//! and the primary terms. All binary operators are left-associative, and
//! unary operators bind tighter than any binary operator.
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, opt, peek, value};
use nom::sequence::delimited;
use nom::Parser;

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::{Error, ErrorKind};
use crate::input::{Input, ParseResult};
use crate::literal;
use crate::recipes::{keyword, rtrim};
use crate::regex;
use crate::text;

use super::{binary, boolean, module_access, pattern_ops, read_integer, MAX_EXPR_DEPTH};

/// Parse a numeric expression, entering the cascade at the bit-or level.
///
/// The cascades can recurse into each other without going through the
/// boolean entry point, through function arguments, subscripts and read
/// functions, so this entry point also bumps the depth counter.
pub(super) fn numeric_expression(mut input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();

    if input.expr_depth >= MAX_EXPR_DEPTH {
        return Err(nom::Err::Failure(Error::new(
            start..start,
            ErrorKind::ExprTooDeep,
        )));
    }

    input.expr_depth += 1;
    let (mut input, expr) = bit_or(input)?;
    input.expr_depth -= 1;

    Ok((input, expr))
}

/// Parse the `|` operator.
fn bit_or(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = bit_xor(input)?;

    while let Ok((i, _)) = rtrim(char('|')).parse(input) {
        let (i, rhs) = cut(bit_xor).parse(i)?;
        input = i;
        lhs = binary(BinaryOp::BitOr, lhs, rhs, input.span_from(start));
    }
    Ok((input, lhs))
}

/// Parse the `^` operator.
fn bit_xor(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = bit_and(input)?;

    while let Ok((i, _)) = rtrim(char('^')).parse(input) {
        let (i, rhs) = cut(bit_and).parse(i)?;
        input = i;
        lhs = binary(BinaryOp::BitXor, lhs, rhs, input.span_from(start));
    }
    Ok((input, lhs))
}

/// Parse the `&` operator.
fn bit_and(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = shift(input)?;

    while let Ok((i, _)) = rtrim(char('&')).parse(input) {
        let (i, rhs) = cut(shift).parse(i)?;
        input = i;
        lhs = binary(BinaryOp::BitAnd, lhs, rhs, input.span_from(start));
    }
    Ok((input, lhs))
}

/// Parse the `<<` and `>>` operators.
fn shift(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = additive(input)?;

    while let Ok((i, op)) = rtrim(alt((
        value(BinaryOp::Shl, tag("<<")),
        value(BinaryOp::Shr, tag(">>")),
    )))
    .parse(input)
    {
        let (i, rhs) = cut(additive).parse(i)?;
        input = i;
        lhs = binary(op, lhs, rhs, input.span_from(start));
    }
    Ok((input, lhs))
}

/// Parse the `+` and `-` operators.
fn additive(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = multiplicative(input)?;

    while let Ok((i, op)) = rtrim(alt((
        value(BinaryOp::Add, char('+')),
        value(BinaryOp::Sub, char('-')),
    )))
    .parse(input)
    {
        let (i, rhs) = cut(multiplicative).parse(i)?;
        input = i;
        lhs = binary(op, lhs, rhs, input.span_from(start));
    }
    Ok((input, lhs))
}

/// Parse the `*`, `\` and `%` operators.
fn multiplicative(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (mut input, mut lhs) = unary(input)?;

    while let Ok((i, op)) = rtrim(alt((char('*'), char('\\'), char('%')))).parse(input) {
        if op == '%' {
            // In `50% of them`, the `%` belongs to the quantifier. Committing
            // to the modulo reading here would make the quantifier form
            // unparseable, so this is one of the declared resolution points
            // between the two grammars.
            let (_, of) = opt(peek(keyword("of"))).parse(i)?;
            if of.is_some() {
                return Ok((input, lhs));
            }
        }

        let op = match op {
            '*' => BinaryOp::Mul,
            '\\' => BinaryOp::Div,
            _ => BinaryOp::Mod,
        };
        let (i, rhs) = unary(i)?;
        input = i;
        lhs = binary(op, lhs, rhs, input.span_from(start));
    }
    Ok((input, lhs))
}

/// Parse the unary `-` and `~` operators.
fn unary(mut input: Input) -> ParseResult<Expr> {
    // Prefixes are accumulated iteratively to keep deep chains of unary
    // operators from growing the stack.
    let mut prefixes = Vec::new();
    loop {
        let start = input.byte_offset();
        match rtrim(alt((char('-'), char('~')))).parse(input) {
            Ok((i, op)) => {
                prefixes.push((
                    if op == '-' {
                        UnaryOp::Neg
                    } else {
                        UnaryOp::BitNot
                    },
                    start,
                ));
                input = i;
            }
            Err(_) => break,
        }
    }

    let (input, mut expr) = term(input)?;
    while let Some((op, start)) = prefixes.pop() {
        expr = Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(expr),
            },
            span: input.span_from(start),
        };
    }

    Ok((input, expr))
}

/// Parse a primary term.
fn term(input: Input) -> ParseResult<Expr> {
    alt((
        // '(' expression ')'
        //
        // The full boolean grammar is accepted between parentheses; whether
        // the inner expression fits the surrounding context is a typing
        // concern, handled by the semantic pass.
        delimited(
            rtrim(char('(')),
            cut(boolean::expression),
            cut(rtrim(char(')'))),
        ),
        spanned(rtrim(keyword("true")), |_| ExprKind::Boolean(true)),
        spanned(rtrim(keyword("false")), |_| ExprKind::Boolean(false)),
        spanned(rtrim(keyword("filesize")), |_| ExprKind::Filesize),
        read_integer::read_expression,
        spanned(literal::float, ExprKind::Float),
        spanned(literal::integer, ExprKind::Integer),
        spanned(text::quoted, ExprKind::Bytes),
        spanned(regex::regex, ExprKind::Regex),
        pattern_ops::count_expression,
        pattern_ops::offset_expression,
        pattern_ops::length_expression,
        spanned(module_access::module_access, ExprKind::Identifier),
    ))
    .parse(input)
}

/// Wrap a parser output into an expression node carrying its span.
fn spanned<'a, F, O, C>(mut inner: F, build: C) -> impl FnMut(Input<'a>) -> ParseResult<'a, Expr>
where
    F: Parser<Input<'a>, Output = O, Error = Error>,
    C: Fn(O) -> ExprKind,
{
    move |input| {
        let start = input.byte_offset();
        let (input, output) = inner.parse(input)?;
        Ok((
            input,
            Expr {
                kind: build(output),
                span: input.span_from(start),
            },
        ))
    }
}
