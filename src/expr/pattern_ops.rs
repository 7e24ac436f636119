//! Parsing of the pattern count, offset and length pseudo-functions.
use nom::character::complete::char;
use nom::combinator::{cut, opt};
use nom::sequence::{delimited, preceded};
use nom::Parser;

use crate::ast::{Expr, ExprKind};
use crate::input::{Input, ParseResult};
use crate::recipes::{keyword, rtrim};
use crate::text;

use super::{numeric, range};

/// Parse a count expression, `#name` with an optional `in range` qualifier.
pub(super) fn count_expression(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (input, name) = text::count_reference(input)?;
    let (input, range) = opt(preceded(rtrim(keyword("in")), cut(range))).parse(input)?;

    Ok((
        input,
        Expr {
            kind: ExprKind::Count { name, range },
            span: input.span_from(start),
        },
    ))
}

/// Parse an offset expression, `@name` with an optional `[index]` qualifier.
pub(super) fn offset_expression(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (input, name) = text::offset_reference(input)?;
    let (input, index) = occurrence_index(input)?;

    Ok((
        input,
        Expr {
            kind: ExprKind::Offset { name, index },
            span: input.span_from(start),
        },
    ))
}

/// Parse a length expression, `!name` with an optional `[index]` qualifier.
pub(super) fn length_expression(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (input, name) = text::length_reference(input)?;
    let (input, index) = occurrence_index(input)?;

    Ok((
        input,
        Expr {
            kind: ExprKind::Length { name, index },
            span: input.span_from(start),
        },
    ))
}

fn occurrence_index(input: Input) -> ParseResult<Option<Box<Expr>>> {
    let (input, index) = opt(delimited(
        rtrim(char('[')),
        cut(numeric::numeric_expression),
        cut(rtrim(char(']'))),
    ))
    .parse(input)?;

    Ok((input, index.map(Box::new)))
}
